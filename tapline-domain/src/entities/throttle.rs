use chrono::{DateTime, Utc};

/// Per-sink error bookkeeping (spec §3, §4.3). Plain data — the regional
/// failover sink owns the timer and sticky-flag logic that reacts to it.
#[derive(Debug, Clone, Default)]
pub struct Throttle {
    consecutive_error_count: u32,
    last_error_at: Option<DateTime<Utc>>,
}

impl Throttle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consecutive_error_count(&self) -> u32 {
        self.consecutive_error_count
    }

    pub fn last_error_at(&self) -> Option<DateTime<Utc>> {
        self.last_error_at
    }

    pub fn set_error(&mut self, at: DateTime<Utc>) {
        self.consecutive_error_count += 1;
        self.last_error_at = Some(at);
    }

    /// `ConsecutiveErrorCount == 0` after `SetSuccess()` (spec §3 invariant).
    pub fn set_success(&mut self) {
        self.consecutive_error_count = 0;
    }
}
