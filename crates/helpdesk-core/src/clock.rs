//! Timestamp source for entity creation and audit entries.
//!
//! The stores never call `Utc::now()` directly; they hold a shared
//! [`Clock`] handle. Production code injects [`SystemClock`]; tests inject
//! [`ManualClock`] and advance it explicitly so "created today" and
//! "recently touched" computations are deterministic.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Shared clock handle as held by every store.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Source of wall-clock timestamps.
pub trait Clock: fmt::Debug {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests.
///
/// Holds milliseconds since the Unix epoch in an atomic so one handle can be
/// shared across stores without interior-mutability gymnastics.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Start the clock at the given instant.
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Move the clock forward.
    pub fn advance_millis(&self, delta: i64) {
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }

    /// Jump the clock to an absolute instant (may move backwards).
    pub fn set(&self, instant: DateTime<Utc>) {
        self.millis.store(instant.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let ms = self.millis.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn manual_clock_advances_in_steps() {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).single().expect("ts");
        let clock = ManualClock::starting_at(start);
        assert_eq!(clock.now(), start);

        clock.advance_millis(1_500);
        assert_eq!(clock.now(), start + chrono::Duration::milliseconds(1_500));
    }

    #[test]
    fn manual_clock_can_jump() {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).single().expect("ts");
        let later = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).single().expect("ts");
        let clock = ManualClock::starting_at(start);
        clock.set(later);
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn system_clock_is_roughly_now() {
        let before = Utc::now();
        let observed = SystemClock.now();
        let after = Utc::now();
        assert!(observed >= before && observed <= after);
    }
}
