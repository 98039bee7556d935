use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A timestamped record flowing from a source to a sink.
///
/// Envelopes are immutable after construction (spec §3) and are cheap to
/// clone: the raw text and payload are wrapped in `Arc` so that fan-out to
/// multiple sinks does not re-copy the underlying bytes.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    timestamp: DateTime<Utc>,
    data: Arc<T>,
    raw_record: Option<Arc<str>>,
    source_path: Option<Arc<str>>,
    byte_position: Option<u64>,
    line_number: Option<u64>,
}

impl<T> Envelope<T> {
    pub fn new(timestamp: DateTime<Utc>, data: T) -> Self {
        Self {
            timestamp,
            data: Arc::new(data),
            raw_record: None,
            source_path: None,
            byte_position: None,
            line_number: None,
        }
    }

    pub fn with_raw_record(mut self, raw: impl Into<Arc<str>>) -> Self {
        self.raw_record = Some(raw.into());
        self
    }

    pub fn with_source_path(mut self, path: impl Into<Arc<str>>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn with_position(mut self, byte_position: u64, line_number: u64) -> Self {
        self.byte_position = Some(byte_position);
        self.line_number = Some(line_number);
        self
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn raw_record(&self) -> Option<&str> {
        self.raw_record.as_deref()
    }

    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    pub fn byte_position(&self) -> Option<u64> {
        self.byte_position
    }

    pub fn line_number(&self) -> Option<u64> {
        self.line_number
    }

    /// Equality under a caller-supplied payload comparer (spec §3: "Equality
    /// is (timestamp, data) under a supplied payload comparer"), rather than
    /// requiring `T: PartialEq`.
    pub fn equals_with<F>(&self, other: &Self, payload_eq: F) -> bool
    where
        F: FnOnce(&T, &T) -> bool,
    {
        self.timestamp == other.timestamp && payload_eq(&self.data, &other.data)
    }
}

impl<T: PartialEq> PartialEq for Envelope<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equals_with(other, |a, b| a == b)
    }
}

impl<T: Eq> Eq for Envelope<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_provenance_fields() {
        let ts = Utc::now();
        let a = Envelope::new(ts, 42).with_source_path("a.log");
        let b = Envelope::new(ts, 42).with_source_path("b.log").with_position(10, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn equality_respects_timestamp() {
        let a = Envelope::new(Utc::now(), 1);
        let b = Envelope::new(Utc::now() + chrono::Duration::seconds(1), 1);
        assert_ne!(a, b);
    }

    #[test]
    fn equals_with_uses_custom_comparer() {
        let ts = Utc::now();
        let a = Envelope::new(ts, "Hello".to_string());
        let b = Envelope::new(ts, "hello".to_string());
        assert!(a.equals_with(&b, |x, y| x.eq_ignore_ascii_case(y)));
    }
}
