//! The countdown/classification state machine.
//!
//! One `CycleTimer` tracks the time-of-last-cycle mark, the active pacing
//! mode, per-block classification tallies, the rolling short history, the
//! drift metric, and the shift-cumulative count. All mutation happens through
//! the discrete event handlers below; the recurring tick only recomputes the
//! countdown.

use std::collections::VecDeque;

use chrono::{NaiveDateTime, TimeDelta};

use crate::pace::CyclePace;
use crate::util::{format_duration, HISTORY_LEN};

/// Outcome class of one recorded cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleClass {
    Early,
    OnTarget,
    Late,
}

impl CycleClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Early => "early",
            Self::OnTarget => "on_target",
            Self::Late => "late",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s {
            "early" => Some(Self::Early),
            "on_target" | "ontarget" => Some(Self::OnTarget),
            "late" => Some(Self::Late),
            _ => None,
        }
    }
}

impl core::fmt::Display for CycleClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-block classification counters; reset on block change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BlockTally {
    pub early: u32,
    pub on_target: u32,
    pub late: u32,
}

impl BlockTally {
    pub fn total(&self) -> u32 {
        self.early + self.on_target + self.late
    }

    pub fn bump(&mut self, class: CycleClass) {
        match class {
            CycleClass::Early => self.early += 1,
            CycleClass::OnTarget => self.on_target += 1,
            CycleClass::Late => self.late += 1,
        }
    }
}

/// Pacing mode: CatchUp swaps a faster target in until the deficit clears.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaceMode {
    #[default]
    Normal,
    CatchUp,
}

#[derive(Debug)]
pub struct CycleTimer {
    mark: NaiveDateTime,
    mode: PaceMode,
    catch_up_target_seconds: i64,
    tally: BlockTally,
    shift_cycles: u32,
    expected_block_cycles: i64,
    remaining_seconds: i64,
    history: VecDeque<String>,
    last_drift_seconds: i64,
    debounce_seconds: i64,
    tolerance_window: i64,
}

impl CycleTimer {
    pub fn new(now: NaiveDateTime, debounce_seconds: i64, tolerance_window: i64) -> Self {
        Self {
            mark: now,
            mode: PaceMode::Normal,
            catch_up_target_seconds: 0,
            tally: BlockTally::default(),
            shift_cycles: 0,
            expected_block_cycles: 0,
            remaining_seconds: 0,
            history: VecDeque::with_capacity(HISTORY_LEN),
            last_drift_seconds: 0,
            debounce_seconds: debounce_seconds.max(0),
            tolerance_window: tolerance_window.max(0),
        }
    }

    pub fn mark(&self) -> NaiveDateTime {
        self.mark
    }

    pub fn tally(&self) -> &BlockTally {
        &self.tally
    }

    pub fn shift_cycles(&self) -> u32 {
        self.shift_cycles
    }

    pub fn expected_block_cycles(&self) -> i64 {
        self.expected_block_cycles
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.remaining_seconds
    }

    pub fn history(&self) -> &VecDeque<String> {
        &self.history
    }

    /// Signed difference between when the last cycle was expected by schedule
    /// arithmetic and when it actually occurred (positive = early).
    pub fn last_drift_seconds(&self) -> i64 {
        self.last_drift_seconds
    }

    pub fn in_catch_up(&self) -> bool {
        self.mode == PaceMode::CatchUp
    }

    pub fn enter_catch_up(&mut self, target_seconds: i64) {
        self.mode = PaceMode::CatchUp;
        self.catch_up_target_seconds = target_seconds.max(0);
    }

    pub fn exit_catch_up(&mut self) {
        self.mode = PaceMode::Normal;
    }

    /// The countdown target currently in force.
    fn active_target_seconds(&self, pace: &CyclePace) -> i64 {
        match self.mode {
            PaceMode::Normal => pace.target_cycle_seconds(),
            PaceMode::CatchUp => self.catch_up_target_seconds,
        }
    }

    /// Seconds of tolerance around zero for on-target classification.
    pub fn window_seconds(&self, pace: &CyclePace) -> i64 {
        self.tolerance_window * i64::from(pace.parts_per_cycle())
    }

    /// Recompute the countdown. Unbounded below: a negative value is
    /// cumulative overdue time, not a clamped display artifact.
    pub fn tick(&mut self, now: NaiveDateTime, pace: &CyclePace) -> i64 {
        self.remaining_seconds = self.active_target_seconds(pace) - (now - self.mark).num_seconds();
        self.remaining_seconds
    }

    /// Classify a pedal press. Returns the class and elapsed seconds, or
    /// `None` when the press lands inside the debounce interval (an
    /// accidental double signal).
    pub fn record_cycle(
        &mut self,
        now: NaiveDateTime,
        pace: &CyclePace,
        block_start: NaiveDateTime,
    ) -> Option<(CycleClass, i64)> {
        let elapsed = (now - self.mark).num_seconds();
        if elapsed < self.debounce_seconds {
            return None;
        }
        let remaining = self.active_target_seconds(pace) - elapsed;
        let window = self.window_seconds(pace);
        let class = if remaining < 0 {
            CycleClass::Late
        } else if remaining > window {
            CycleClass::Early
        } else {
            CycleClass::OnTarget
        };

        self.tally.bump(class);
        self.shift_cycles += 1;
        self.history.push_back(format_duration(elapsed, false));
        while self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
        // Where schedule arithmetic expected this cycle to land.
        let expected = block_start
            + TimeDelta::seconds(i64::from(self.tally.total()) * pace.target_cycle_seconds());
        self.last_drift_seconds = (expected - now).num_seconds();
        self.mark = now;
        Some((class, elapsed))
    }

    /// Manual correction for a miscount; no time-based validation applies.
    pub fn adjust_tally(&mut self, class: CycleClass) {
        self.tally.bump(class);
        self.shift_cycles += 1;
    }

    /// Block rollover: clear the tallies and restart the countdown from now.
    pub fn on_block_changed(&mut self, now: NaiveDateTime, available_seconds: i64, pace: &CyclePace) {
        self.tally = BlockTally::default();
        self.expected_block_cycles = available_seconds / pace.target_cycle_seconds().max(1);
        self.mark = now;
    }

    /// Re-derive the expected cycle count after a pace change or boundary
    /// nudge within the block.
    pub fn recompute_expected(&mut self, available_seconds: i64, pace: &CyclePace) {
        self.expected_block_cycles = available_seconds / pace.target_cycle_seconds().max(1);
    }

    /// Shift rollover: zero the cumulative count. The caller captures the
    /// outgoing summary before this runs.
    pub fn on_shift_rollover(&mut self) {
        self.shift_cycles = 0;
    }

    /// "cycles/expected" one-liner for the current block.
    pub fn block_summary(&self) -> String {
        format!("{}/{}", self.tally.total(), self.expected_block_cycles)
    }

    /// Cycles ahead (+) or behind (-) of the block-elapsed expectation.
    pub fn ahead_by(&self, block_elapsed_seconds: i64, pace: &CyclePace) -> i64 {
        let target = pace.target_cycle_seconds().max(1);
        i64::from(self.tally.total()) - block_elapsed_seconds.max(0) / target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn countdown_goes_negative_without_bound() {
        let pace = CyclePace::new(30, 1);
        let mut timer = CycleTimer::new(at(8, 0, 0), 2, 3);
        assert_eq!(timer.tick(at(8, 0, 10), &pace), 20);
        assert_eq!(timer.tick(at(8, 1, 30), &pace), -60);
    }

    #[test]
    fn debounce_swallows_double_press() {
        let pace = CyclePace::new(30, 1);
        let mut timer = CycleTimer::new(at(8, 0, 0), 2, 3);
        assert!(timer.record_cycle(at(8, 0, 30), &pace, at(8, 0, 0)).is_some());
        assert!(timer.record_cycle(at(8, 0, 31), &pace, at(8, 0, 0)).is_none());
        assert_eq!(timer.tally().total(), 1);
        // Exactly at the debounce threshold counts.
        assert!(timer.record_cycle(at(8, 0, 33), &pace, at(8, 0, 0)).is_some());
    }

    #[test]
    fn drift_measures_distance_from_expected_mark() {
        let pace = CyclePace::new(30, 1);
        let block_start = at(8, 0, 0);
        let mut timer = CycleTimer::new(block_start, 2, 3);
        // First cycle lands 10 s late: expected at 08:00:30, actual 08:00:40.
        timer.record_cycle(at(8, 0, 40), &pace, block_start);
        assert_eq!(timer.last_drift_seconds(), -10);
        // Second cycle on the plan again: expected 08:01:00.
        timer.record_cycle(at(8, 1, 0), &pace, block_start);
        assert_eq!(timer.last_drift_seconds(), 0);
    }

    #[test]
    fn history_keeps_the_last_ten() {
        let pace = CyclePace::new(30, 1);
        let mut timer = CycleTimer::new(at(8, 0, 0), 2, 3);
        let mut now = at(8, 0, 0);
        for _ in 0..12 {
            now += TimeDelta::seconds(30);
            timer.record_cycle(now, &pace, at(8, 0, 0));
        }
        assert_eq!(timer.history().len(), 10);
        assert!(timer.history().iter().all(|h| h == ":30"));
    }

    #[test]
    fn catch_up_mode_swaps_the_target() {
        let pace = CyclePace::new(30, 1);
        let mut timer = CycleTimer::new(at(8, 0, 0), 2, 3);
        timer.enter_catch_up(20);
        assert_eq!(timer.tick(at(8, 0, 10), &pace), 10);
        timer.exit_catch_up();
        assert_eq!(timer.tick(at(8, 0, 10), &pace), 20);
    }

    #[test]
    fn ahead_by_compares_done_against_elapsed() {
        let pace = CyclePace::new(30, 1);
        let mut timer = CycleTimer::new(at(8, 0, 0), 2, 3);
        timer.adjust_tally(CycleClass::OnTarget);
        timer.adjust_tally(CycleClass::OnTarget);
        // 150 s elapsed expects 5 cycles; 2 done = 3 behind.
        assert_eq!(timer.ahead_by(150, &pace), -3);
        // Negative elapsed (pre-block) counts as zero.
        assert_eq!(timer.ahead_by(-30, &pace), 2);
    }
}
