//! Time source for the aggregator, ingestion and session paths.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// Supplies the current instant.
pub trait Clock: Send + Sync {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock(RwLock<DateTime<Utc>>);

impl FixedClock {
    /// Frozen at `at`
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(RwLock::new(at))
    }

    /// Jump to `at`
    pub fn set(&self, at: DateTime<Utc>) {
        *self.0.write() = at;
    }

    /// Move forward by `by`
    pub fn advance(&self, by: Duration) {
        *self.0.write() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.read()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_fixed_clock_moves_on_demand() {
        let start = Utc.with_ymd_and_hms(2026, 5, 2, 8, 30, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::hours(1));
        assert_eq!(clock.now(), start + Duration::hours(1));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
