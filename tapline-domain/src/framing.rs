//! Little-endian binary framing primitives for the agent's wire protocol
//! (spec §4.9). Every multi-byte field is little-endian; strings and memory
//! blocks are length-prefixed rather than sentinel-terminated so a reader
//! never has to scan for a delimiter.

use crate::error::{AgentError, AgentResult};
use crate::value_objects::TickTimestamp;

/// A cursor over an in-memory byte slice, used to decode framed values
/// written by [`write_nullable_string`] and friends.
pub struct FrameReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> AgentResult<&'a [u8]> {
        if self.pos + len > self.bytes.len() {
            return Err(AgentError::ParseError {
                source_path: String::new(),
                line: 0,
                message: "unexpected end of frame".to_string(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn read_u8(&mut self) -> AgentResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> AgentResult<u32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().expect("checked length");
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn read_u64(&mut self) -> AgentResult<u64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("checked length");
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn read_i64(&mut self) -> AgentResult<i64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("checked length");
        Ok(i64::from_le_bytes(bytes))
    }

    /// Bool marker byte (0 = null, 1 = present), then if present a
    /// `u32`-length-prefixed UTF-8 string.
    pub fn read_nullable_string(&mut self) -> AgentResult<Option<String>> {
        if self.read_u8()? == 0 {
            return Ok(None);
        }
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        let s = String::from_utf8(bytes.to_vec()).map_err(|e| AgentError::ParseError {
            source_path: String::new(),
            line: 0,
            message: format!("nullable string is not valid utf-8: {e}"),
        })?;
        Ok(Some(s))
    }

    /// `u64`-length-prefixed raw bytes.
    pub fn read_memory_block(&mut self) -> AgentResult<Vec<u8>> {
        let len = self.read_u64()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    pub fn read_timestamp(&mut self) -> AgentResult<TickTimestamp> {
        Ok(TickTimestamp(self.read_i64()?))
    }

    /// `u32` count followed by `count` elements, each decoded by `read_one`.
    pub fn read_list<T>(&mut self, mut read_one: impl FnMut(&mut Self) -> AgentResult<T>) -> AgentResult<Vec<T>> {
        let count = self.read_u32()? as usize;
        let mut items = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            items.push(read_one(self)?);
        }
        Ok(items)
    }

    /// Timestamp followed by one payload, decoded by `read_payload`.
    pub fn read_envelope<T>(&mut self, read_payload: impl FnOnce(&mut Self) -> AgentResult<T>) -> AgentResult<(TickTimestamp, T)> {
        let ts = self.read_timestamp()?;
        let payload = read_payload(self)?;
        Ok((ts, payload))
    }
}

pub fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn write_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn write_i64(out: &mut Vec<u8>, value: i64) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Bool marker byte (0 = null, 1 = present), then if present a
/// `u32`-length-prefixed UTF-8 string.
pub fn write_nullable_string(out: &mut Vec<u8>, value: Option<&str>) {
    match value {
        None => out.push(0),
        Some(s) => {
            out.push(1);
            write_u32(out, s.len() as u32);
            out.extend_from_slice(s.as_bytes());
        }
    }
}

/// `u64`-length-prefixed raw bytes.
pub fn write_memory_block(out: &mut Vec<u8>, bytes: &[u8]) {
    write_u64(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

pub fn write_timestamp(out: &mut Vec<u8>, ts: TickTimestamp) {
    write_i64(out, ts.0);
}

/// Timestamp followed by one payload written by `write_payload`.
pub fn write_envelope<T>(out: &mut Vec<u8>, ts: TickTimestamp, payload: &T, write_payload: impl FnOnce(&T, &mut Vec<u8>)) {
    write_timestamp(out, ts);
    write_payload(payload, out);
}

/// `u32` count followed by each item written by `write_one`.
pub fn write_list<T>(out: &mut Vec<u8>, items: &[T], mut write_one: impl FnMut(&T, &mut Vec<u8>)) {
    write_u32(out, items.len() as u32);
    for item in items {
        write_one(item, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_string_round_trips_both_variants() {
        let mut buf = Vec::new();
        write_nullable_string(&mut buf, Some("hello"));
        write_nullable_string(&mut buf, None);
        let mut reader = FrameReader::new(&buf);
        assert_eq!(reader.read_nullable_string().unwrap(), Some("hello".to_string()));
        assert_eq!(reader.read_nullable_string().unwrap(), None);
    }

    #[test]
    fn memory_block_round_trips() {
        let mut buf = Vec::new();
        write_memory_block(&mut buf, &[1, 2, 3, 4]);
        let mut reader = FrameReader::new(&buf);
        assert_eq!(reader.read_memory_block().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn envelope_round_trips_timestamp_and_payload() {
        let mut buf = Vec::new();
        let ts = TickTimestamp(123_456_789);
        write_envelope(&mut buf, ts, &"payload".to_string(), |s, out| {
            write_nullable_string(out, Some(s));
        });
        let mut reader = FrameReader::new(&buf);
        let (decoded_ts, decoded_payload) = reader
            .read_envelope(|r| Ok(r.read_nullable_string()?.unwrap()))
            .unwrap();
        assert_eq!(decoded_ts, ts);
        assert_eq!(decoded_payload, "payload");
    }

    #[test]
    fn list_round_trips_length_prefixed_elements() {
        let mut buf = Vec::new();
        write_list(&mut buf, &[1u32, 2, 3], |v, out| write_u32(out, *v));
        let mut reader = FrameReader::new(&buf);
        let decoded = reader.read_list(|r| r.read_u32()).unwrap();
        assert_eq!(decoded, vec![1, 2, 3]);
    }

    #[test]
    fn truncated_frame_is_a_parse_error_not_a_panic() {
        let mut reader = FrameReader::new(&[1, 0, 0]);
        assert!(reader.read_nullable_string().is_err());
    }
}
