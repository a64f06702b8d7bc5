//! Shift selection, calendar anchoring, and the live block schedule.
//!
//! A shift is four contiguous working blocks separated by breaks. Boundaries
//! are persisted as bare times of day; this module resolves them onto
//! concrete calendar days so that the overnight (Grave) shift produces a
//! coherent, monotonically increasing sequence whether it is loaded before
//! or after midnight.

use chrono::{Days, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use eyre::WrapErr;
use takt_traits::SettingsStore;

use crate::error::ScheduleError;

/// The three named 8-hour windows covering the full day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftName {
    Grave,
    Day,
    Swing,
}

impl ShiftName {
    /// Settings key and event payload name.
    pub fn key(self) -> &'static str {
        match self {
            Self::Grave => "grave",
            Self::Day => "day",
            Self::Swing => "swing",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s {
            "grave" => Some(Self::Grave),
            "day" => Some(Self::Day),
            "swing" => Some(Self::Swing),
            _ => None,
        }
    }

    /// Nominal outer bounds as clock hours (open, close). Grave closes on
    /// the wrapped-around day.
    pub fn nominal_hours(self) -> (u32, u32) {
        match self {
            Self::Grave => (23, 7),
            Self::Day => (7, 15),
            Self::Swing => (15, 23),
        }
    }
}

impl core::fmt::Display for ShiftName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Grave => "Grave",
            Self::Day => "Day",
            Self::Swing => "Swing",
        };
        f.write_str(label)
    }
}

/// Which boundary of a block a nudge targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryEdge {
    Start,
    End,
}

/// Direction of a boundary nudge: later or earlier by one fixed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDir {
    Later,
    Earlier,
}

/// Partition the 24-hour clock: `[07:00,15:00)` Day, `[15:00,23:00)` Swing,
/// everything else Grave.
pub fn select_shift(now: NaiveDateTime) -> ShiftName {
    match now.hour() {
        7..=14 => ShiftName::Day,
        15..=22 => ShiftName::Swing,
        _ => ShiftName::Grave,
    }
}

/// Resolve which calendar day a bare time-of-day belongs to, relative to
/// `now`. Only Grave straddles midnight: a late-evening `now` pulls morning
/// times onto tomorrow, an early-morning `now` pushes evening times onto
/// yesterday.
pub fn anchor_to_calendar_day(now: NaiveDateTime, tod: NaiveTime) -> NaiveDateTime {
    let date = if now.hour() >= 23 && tod.hour() <= 7 {
        now.date() + Days::new(1)
    } else if now.hour() < 7 && tod.hour() >= 23 {
        now.date() - Days::new(1)
    } else {
        now.date()
    };
    date.and_time(tod)
}

/// Anchor a set of times of day around `now`, keeping Grave coherent: a
/// morning-side boundary that lands before the shift's anchored 23:00 open
/// belongs to the next day. This covers schedules loaded shortly before
/// 23:00 (the preceding Swing shift can end early after nudging), where the
/// hour rule alone would anchor everything to today.
fn anchor_block_times(shift: ShiftName, now: NaiveDateTime, tods: &[NaiveTime]) -> Vec<NaiveDateTime> {
    let mut out: Vec<NaiveDateTime> = tods.iter().map(|&t| anchor_to_calendar_day(now, t)).collect();
    if shift == ShiftName::Grave {
        let open_tod = NaiveTime::from_hms_opt(23, 0, 0).unwrap_or(NaiveTime::MIN);
        let evening = anchor_to_calendar_day(now, open_tod);
        for (v, t) in out.iter_mut().zip(tods) {
            if t.hour() <= 7 && *v < evening {
                *v = *v + Days::new(1);
            }
        }
    }
    out
}

fn parse_line(line: &str) -> Result<Vec<NaiveTime>, ScheduleError> {
    let mut out = Vec::with_capacity(4);
    for raw in line.split(',') {
        let raw = raw.trim();
        let t = NaiveTime::parse_from_str(raw, "%H%M")
            .map_err(|e| ScheduleError::Line(format!("bad HHMM value {raw:?}: {e}")))?;
        out.push(t);
    }
    if out.len() != 4 {
        return Err(ScheduleError::Line(format!(
            "expected 4 values, got {}",
            out.len()
        )));
    }
    Ok(out)
}

/// Four ordered block intervals anchored to concrete calendar days, plus the
/// shift's anchored nominal outer bounds. Created once per shift rollover
/// and replaced wholesale when the wall clock passes the last boundary.
#[derive(Debug, Clone)]
pub struct ShiftSchedule {
    shift: ShiftName,
    start: [NaiveDateTime; 4],
    end: [NaiveDateTime; 4],
    open: NaiveDateTime,
    close: NaiveDateTime,
}

impl ShiftSchedule {
    /// Parse two `HHMM, HHMM, HHMM, HHMM` lines and anchor them around `now`.
    /// Both boundary arrays are sorted ascending afterwards; a schedule that
    /// still inverts or overlaps is rejected.
    pub fn from_lines(
        shift: ShiftName,
        now: NaiveDateTime,
        start_line: &str,
        end_line: &str,
    ) -> Result<Self, ScheduleError> {
        let start_tods = parse_line(start_line)?;
        let end_tods = parse_line(end_line)?;

        let mut start = anchor_block_times(shift, now, &start_tods);
        let mut end = anchor_block_times(shift, now, &end_tods);
        start.sort_unstable();
        end.sort_unstable();

        let (open_hour, close_hour) = shift.nominal_hours();
        let open_tod = NaiveTime::from_hms_opt(open_hour, 0, 0).unwrap_or(NaiveTime::MIN);
        let close_tod = NaiveTime::from_hms_opt(close_hour, 0, 0).unwrap_or(NaiveTime::MIN);
        let bounds = anchor_block_times(shift, now, &[open_tod, close_tod]);
        let (Some(&open), Some(&close)) = (bounds.first(), bounds.get(1)) else {
            return Err(ScheduleError::Line("missing outer bounds".to_string()));
        };

        let start: [NaiveDateTime; 4] = start
            .try_into()
            .map_err(|_| ScheduleError::Line("expected 4 start values".to_string()))?;
        let end: [NaiveDateTime; 4] = end
            .try_into()
            .map_err(|_| ScheduleError::Line("expected 4 end values".to_string()))?;

        for i in 0..4 {
            if start[i] > end[i] {
                return Err(ScheduleError::Inverted {
                    block: i + 1,
                    start: start[i].to_string(),
                    end: end[i].to_string(),
                });
            }
            if i < 3 && end[i] > start[i + 1] {
                return Err(ScheduleError::Overlap(i + 1, i + 2));
            }
        }

        Ok(Self {
            shift,
            start,
            end,
            open,
            close,
        })
    }

    pub fn shift(&self) -> ShiftName {
        self.shift
    }

    /// Block boundaries; `block` is 1-based and clamped to `1..=4`.
    pub fn block_start(&self, block: usize) -> NaiveDateTime {
        self.start[block.clamp(1, 4) - 1]
    }

    pub fn block_end(&self, block: usize) -> NaiveDateTime {
        self.end[block.clamp(1, 4) - 1]
    }

    /// Count of starts at or before `now`, clamped to `1..=4`. Pre-shift
    /// callers detect that case separately by comparing against
    /// `block_start(1)`.
    pub fn current_block_index(&self, now: NaiveDateTime) -> usize {
        self.start.iter().filter(|s| **s <= now).count().clamp(1, 4)
    }

    pub fn block_available_seconds(&self, block: usize) -> i64 {
        let i = block.clamp(1, 4) - 1;
        (self.end[i] - self.start[i]).num_seconds()
    }

    /// Working seconds across all four blocks.
    pub fn total_available_seconds(&self) -> i64 {
        (0..4).map(|i| (self.end[i] - self.start[i]).num_seconds()).sum()
    }

    /// The boundary whose passing triggers shift rollover.
    pub fn last_boundary(&self) -> NaiveDateTime {
        self.end[3]
    }

    /// Anchored nominal opening of the shift window.
    pub fn open(&self) -> NaiveDateTime {
        self.open
    }

    /// Anchored nominal close of the shift window (the wrapped-around day
    /// for Grave).
    pub fn close(&self) -> NaiveDateTime {
        self.close
    }

    /// The calendar date KPI rows key on: the date of the first block start
    /// (the evening date for Grave).
    pub fn kpi_date(&self) -> chrono::NaiveDate {
        self.start[0].date()
    }

    /// Serialized boundary lines in the persisted `HHMM` layout.
    pub fn start_line(&self) -> String {
        join_hhmm(&self.start)
    }

    pub fn end_line(&self) -> String {
        join_hhmm(&self.end)
    }
}

fn join_hhmm(times: &[NaiveDateTime; 4]) -> String {
    times
        .iter()
        .map(|t| t.format("%H%M").to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and anchor the active shift's schedule from the settings store.
pub fn resolve_schedule(
    settings: &dyn SettingsStore,
    now: NaiveDateTime,
) -> crate::error::Result<ShiftSchedule> {
    let shift = select_shift(now);
    // The shift's calendar date is the date its open boundary lands on.
    let (open_hour, _) = shift.nominal_hours();
    let open_tod = NaiveTime::from_hms_opt(open_hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let date = anchor_to_calendar_day(now, open_tod).date();

    let (start_line, end_line) = settings
        .schedule_lines(shift.key(), &date.to_string())
        .map_err(|e| eyre::eyre!("{e}"))
        .wrap_err_with(|| format!("loading schedule for {shift}"))?;
    let schedule = ShiftSchedule::from_lines(shift, now, &start_line, &end_line)
        .map_err(eyre::Report::new)
        .wrap_err_with(|| format!("anchoring schedule for {shift}"))?;
    Ok(schedule)
}

/// Mutable in-memory copy of the current shift's block boundaries. Supports
/// bounded nudging and derived time queries; owns the live `ShiftSchedule`
/// exclusively.
#[derive(Debug)]
pub struct ScheduleStore {
    schedule: ShiftSchedule,
    nudge: TimeDelta,
    dirty: bool,
}

impl ScheduleStore {
    pub fn new(schedule: ShiftSchedule, nudge_minutes: u32) -> Self {
        Self {
            schedule,
            nudge: TimeDelta::minutes(i64::from(nudge_minutes.max(1))),
            dirty: false,
        }
    }

    pub fn schedule(&self) -> &ShiftSchedule {
        &self.schedule
    }

    /// Swap in the next shift's schedule; adjustment state starts clean.
    pub fn replace(&mut self, schedule: ShiftSchedule) {
        self.schedule = schedule;
        self.dirty = false;
    }

    pub fn current_block_index(&self, now: NaiveDateTime) -> usize {
        self.schedule.current_block_index(now)
    }

    /// Seconds into the current block; negative before it opens.
    pub fn block_elapsed_seconds(&self, now: NaiveDateTime) -> i64 {
        let block = self.schedule.current_block_index(now);
        (now - self.schedule.block_start(block)).num_seconds()
    }

    /// Seconds until the current block closes; negative once it has.
    pub fn block_remaining_seconds(&self, now: NaiveDateTime) -> i64 {
        let block = self.schedule.current_block_index(now);
        (self.schedule.block_end(block) - now).num_seconds()
    }

    pub fn total_available_seconds(&self) -> i64 {
        self.schedule.total_available_seconds()
    }

    /// Unsaved boundary adjustments pending persistence.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Shift one boundary by the fixed step. Violations are not errors: a
    /// start clamps to its own end and may not cross the previous block's
    /// end or the shift's open bound; an end clamps to its own start and may
    /// not cross the next block's start or the shift's close bound.
    pub fn nudge_boundary(&mut self, block: usize, edge: BoundaryEdge, dir: NudgeDir) {
        let i = block.clamp(1, 4) - 1;
        let delta = match dir {
            NudgeDir::Later => self.nudge,
            NudgeDir::Earlier => -self.nudge,
        };
        let s = &mut self.schedule;
        match edge {
            BoundaryEdge::Start => {
                s.start[i] = s.start[i] + delta;
                if s.start[i] > s.end[i] {
                    s.start[i] = s.end[i];
                }
                if i > 0 && s.start[i] < s.end[i - 1] {
                    s.start[i] = s.start[i] + self.nudge;
                }
                if s.start[i] < s.open {
                    s.start[i] = s.start[i] + self.nudge;
                }
            }
            BoundaryEdge::End => {
                s.end[i] = s.end[i] + delta;
                if s.end[i] < s.start[i] {
                    s.end[i] = s.start[i];
                }
                if i < 3 && s.end[i] > s.start[i + 1] {
                    s.end[i] = s.end[i] - self.nudge;
                }
                if s.end[i] > s.close {
                    s.end[i] = s.end[i] - self.nudge;
                }
            }
        }
        self.dirty = true;
        tracing::debug!(block, ?edge, ?dir, "schedule boundary nudged");
    }
}
