use chrono::{DateTime, Duration, Utc};

use crate::entities::Throttle;

/// What a sink should do next after a send attempt (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailoverDecision {
    /// Keep sending to the primary/current region.
    UseCurrent,
    /// Switch to (or stay on) the failover region.
    UseFailover,
    /// A success arrived while failed over — switch back to the primary.
    Failback,
}

/// Dual-trigger regional failover policy (spec §4.3): failover kicks in
/// when either a consecutive-error threshold or an elapsed-time threshold
/// is crossed, whichever comes first. Once failed over the decision is
/// sticky — every subsequent failure keeps returning `UseFailover` — until
/// a success arrives, which fails back and resets all counters.
pub struct RegionalFailoverStrategy {
    throttle: Throttle,
    max_consecutive_errors: u32,
    max_error_age: Duration,
    first_error_at: Option<DateTime<Utc>>,
    failed_over: bool,
}

impl RegionalFailoverStrategy {
    pub fn new(max_consecutive_errors: u32, max_error_age: Duration) -> Self {
        Self {
            throttle: Throttle::new(),
            max_consecutive_errors,
            max_error_age,
            first_error_at: None,
            failed_over: false,
        }
    }

    pub fn record_failure(&mut self, at: DateTime<Utc>) -> FailoverDecision {
        if self.throttle.consecutive_error_count() == 0 {
            self.first_error_at = Some(at);
        }
        self.throttle.set_error(at);

        if self.failed_over {
            return FailoverDecision::UseFailover;
        }

        let error_count_tripped = self.throttle.consecutive_error_count() >= self.max_consecutive_errors;
        let error_age_tripped = self
            .first_error_at
            .is_some_and(|first| at - first >= self.max_error_age);

        if error_count_tripped || error_age_tripped {
            self.failed_over = true;
            FailoverDecision::UseFailover
        } else {
            FailoverDecision::UseCurrent
        }
    }

    pub fn record_success(&mut self, _at: DateTime<Utc>) -> FailoverDecision {
        self.throttle.set_success();
        self.first_error_at = None;
        if self.failed_over {
            self.failed_over = false;
            FailoverDecision::Failback
        } else {
            FailoverDecision::UseCurrent
        }
    }

    pub fn is_failed_over(&self) -> bool {
        self.failed_over
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failover_trips_on_consecutive_error_count() {
        let mut strategy = RegionalFailoverStrategy::new(3, Duration::hours(1));
        let now = Utc::now();
        assert_eq!(strategy.record_failure(now), FailoverDecision::UseCurrent);
        assert_eq!(strategy.record_failure(now), FailoverDecision::UseCurrent);
        assert_eq!(strategy.record_failure(now), FailoverDecision::UseFailover);
        assert!(strategy.is_failed_over());
    }

    #[test]
    fn failover_trips_on_elapsed_time_even_with_few_errors() {
        let mut strategy = RegionalFailoverStrategy::new(100, Duration::seconds(30));
        let t0 = Utc::now();
        assert_eq!(strategy.record_failure(t0), FailoverDecision::UseCurrent);
        let t1 = t0 + Duration::seconds(31);
        assert_eq!(strategy.record_failure(t1), FailoverDecision::UseFailover);
    }

    #[test]
    fn staying_failed_over_is_sticky_until_a_success() {
        let mut strategy = RegionalFailoverStrategy::new(1, Duration::hours(1));
        let now = Utc::now();
        assert_eq!(strategy.record_failure(now), FailoverDecision::UseFailover);
        assert_eq!(strategy.record_failure(now), FailoverDecision::UseFailover);
        assert_eq!(strategy.record_success(now), FailoverDecision::Failback);
        assert!(!strategy.is_failed_over());
    }
}
