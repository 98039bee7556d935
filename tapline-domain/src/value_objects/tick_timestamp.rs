use chrono::{DateTime, TimeZone, Utc};

/// Ticks (100-nanosecond units) from the fixed epoch 0001-01-01T00:00:00Z,
/// the wire representation spec §4.9 calls for ("signed 64-bit tick count").
///
/// Using a fixed epoch rather than the Unix epoch keeps the wire format
/// stable regardless of host platform `SystemTime` semantics.
const TICKS_PER_SECOND: i64 = 10_000_000;
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickTimestamp(pub i64);

impl TickTimestamp {
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let secs = dt.timestamp();
        let nanos = dt.timestamp_subsec_nanos() as i64;
        let ticks = secs * TICKS_PER_SECOND + nanos / 100 + UNIX_EPOCH_TICKS;
        Self(ticks)
    }

    pub fn to_datetime(self) -> DateTime<Utc> {
        let unix_ticks = self.0 - UNIX_EPOCH_TICKS;
        let secs = unix_ticks.div_euclid(TICKS_PER_SECOND);
        let sub_ticks = unix_ticks.rem_euclid(TICKS_PER_SECOND);
        Utc.timestamp_opt(secs, (sub_ticks * 100) as u32)
            .single()
            .expect("tick timestamp out of representable range")
    }

    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }
}

impl From<DateTime<Utc>> for TickTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl From<TickTimestamp> for DateTime<Utc> {
    fn from(ticks: TickTimestamp) -> Self {
        ticks.to_datetime()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_ticks() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 45).unwrap();
        let ticks = TickTimestamp::from_datetime(dt);
        assert_eq!(ticks.to_datetime(), dt);
    }

    #[test]
    fn unix_epoch_has_known_tick_value() {
        let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(TickTimestamp::from_datetime(epoch).0, UNIX_EPOCH_TICKS);
    }
}
