//! Day arithmetic against an injected reference time.
//!
//! RULE: Nothing in the engine reads the wall clock.
//! Every function here takes `now` explicitly so a fixed snapshot
//! always produces the same answer.

use crate::types::Timestamp;
use chrono::Duration;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Fractional days from `earlier` to `later`. Negative when `earlier` is after `later`.
pub fn days_between(earlier: Timestamp, later: Timestamp) -> f64 {
    (later - earlier).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Fractional age of `t` at `now`, floored at zero.
pub fn age_days(t: Timestamp, now: Timestamp) -> f64 {
    days_between(t, now).max(0.0)
}

/// Whole days elapsed since `t`: `floor((now - t) / 24h)`, never negative.
pub fn whole_days_since(t: Timestamp, now: Timestamp) -> i64 {
    age_days(t, now).floor() as i64
}

/// True when `t` falls inside the trailing window of `days` ending at `now`.
pub fn within_days(t: Timestamp, now: Timestamp, days: f64) -> bool {
    age_days(t, now) <= days
}

/// True when `t` happened no more than `hours` after `start` (and not before it).
pub fn within_hours_after(start: Timestamp, t: Timestamp, hours: i64) -> bool {
    t >= start && t - start <= Duration::hours(hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(day: u32, hour: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn whole_days_floor_partial_days() {
        assert_eq!(whole_days_since(at(1, 0), at(3, 12)), 2);
        assert_eq!(whole_days_since(at(1, 0), at(1, 23)), 0);
    }

    #[test]
    fn future_timestamps_have_zero_age() {
        assert_eq!(whole_days_since(at(10, 0), at(3, 0)), 0);
        assert_eq!(age_days(at(10, 0), at(3, 0)), 0.0);
    }

    #[test]
    fn window_membership_is_inclusive() {
        assert!(within_days(at(1, 0), at(8, 0), 7.0));
        assert!(!within_days(at(1, 0), at(8, 1), 7.0));
    }

    #[test]
    fn hours_window_rejects_earlier_timestamps() {
        assert!(within_hours_after(at(1, 0), at(3, 0), 48));
        assert!(!within_hours_after(at(1, 0), at(3, 1), 48));
        assert!(!within_hours_after(at(2, 0), at(1, 0), 48));
    }
}
