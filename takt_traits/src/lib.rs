pub mod clock;

pub use clock::{Clock, SystemClock};

/// Settings collaborator: pacing parameters and per-shift schedule lines.
///
/// The engine reads at startup and at shift rollover, and writes on every
/// confirmed operator edit. All values cross this seam in serialized form:
/// schedule lines are strings of 4 comma-joined 24-hour `HHMM` values and
/// dates are ISO `YYYY-MM-DD`.
pub trait SettingsStore {
    /// Current pacing values: (target seconds per part, parts per cycle).
    fn pacing(&self) -> Result<(u32, u32), Box<dyn std::error::Error + Send + Sync>>;

    /// Persist confirmed pacing values.
    fn save_pacing(
        &self,
        target_seconds_per_part: u32,
        parts_per_cycle: u32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Schedule lines (starts, ends) for a shift on a calendar date.
    /// A pending one-time override for the same shift and date takes
    /// precedence over the stored baseline.
    fn schedule_lines(
        &self,
        shift: &str,
        date: &str,
    ) -> Result<(String, String), Box<dyn std::error::Error + Send + Sync>>;

    /// Write adjusted schedule lines. With `default` the shift's baseline is
    /// overwritten; otherwise the write is a one-time override for the given
    /// date and the baseline stays untouched.
    fn persist_schedule(
        &self,
        shift: &str,
        date: &str,
        start: &str,
        end: &str,
        default: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for std::sync::Arc<T> {
    fn pacing(&self) -> Result<(u32, u32), Box<dyn std::error::Error + Send + Sync>> {
        (**self).pacing()
    }

    fn save_pacing(
        &self,
        target_seconds_per_part: u32,
        parts_per_cycle: u32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).save_pacing(target_seconds_per_part, parts_per_cycle)
    }

    fn schedule_lines(
        &self,
        shift: &str,
        date: &str,
    ) -> Result<(String, String), Box<dyn std::error::Error + Send + Sync>> {
        (**self).schedule_lines(shift, date)
    }

    fn persist_schedule(
        &self,
        shift: &str,
        date: &str,
        start: &str,
        end: &str,
        default: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).persist_schedule(shift, date, start, end, default)
    }
}
