use chrono::NaiveDateTime;
use std::thread;
use std::time::Duration;

/// Wall-clock abstraction for schedule resolution and countdown timing.
///
/// - now(): the station's local wall-clock time
/// - sleep(): sleeps for the provided duration (implementations may simulate)
/// - seconds_since(): helper to compute signed elapsed seconds from a mark
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
    fn sleep(&self, d: Duration);

    /// Whole seconds elapsed since `mark`; negative when `mark` lies in the
    /// future.
    fn seconds_since(&self, mark: NaiveDateTime) -> i64 {
        (self.now() - mark).num_seconds()
    }
}

/// Default clock backed by the local system time. The station clock is
/// authoritative; no time zone handling happens above this seam.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}
