//! Countdown against an absolute deadline.
//!
//! Remaining time is recomputed from the deadline on every tick, so a
//! late or skipped tick never drifts the clock.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Normal,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    deadline: DateTime<Utc>,
}

impl Countdown {
    pub fn new(started_at: DateTime<Utc>, limit_secs: i64) -> Self {
        Self {
            deadline: started_at + Duration::seconds(limit_secs.max(0)),
        }
    }

    /// Whole seconds left, rounded up, never negative
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        let millis = (self.deadline - now).num_milliseconds();
        if millis <= 0 {
            0
        } else {
            (millis + 999) / 1000
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }

    pub fn urgency(&self, now: DateTime<Utc>, warning_threshold_secs: i64) -> Urgency {
        if self.remaining_secs(now) < warning_threshold_secs {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_remaining_from_deadline() {
        let countdown = Countdown::new(t0(), 600);
        assert_eq!(countdown.remaining_secs(t0()), 600);
        assert_eq!(countdown.remaining_secs(t0() + Duration::milliseconds(1500)), 599);
        assert_eq!(countdown.remaining_secs(t0() + Duration::seconds(601)), 0);
    }

    #[test]
    fn test_expiry() {
        let countdown = Countdown::new(t0(), 60);
        assert!(!countdown.is_expired(t0() + Duration::seconds(59)));
        assert!(countdown.is_expired(t0() + Duration::seconds(60)));
    }

    #[test]
    fn test_zero_limit_expires_immediately() {
        let countdown = Countdown::new(t0(), 0);
        assert!(countdown.is_expired(t0()));
        assert_eq!(countdown.remaining_secs(t0()), 0);
    }

    #[test]
    fn test_warning_threshold() {
        let countdown = Countdown::new(t0(), 600);
        assert_eq!(countdown.urgency(t0(), 300), Urgency::Normal);
        assert_eq!(
            countdown.urgency(t0() + Duration::seconds(301), 300),
            Urgency::Warning
        );
    }
}
