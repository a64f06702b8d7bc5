//! Read-only view projection pushed to the display every tick.

use crate::timer::BlockTally;

/// Background color driven by the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenState {
    /// Between blocks or before the shift; nothing is due.
    Idle,
    /// Counting down with slack beyond the tolerance window.
    Neutral,
    /// Inside the tolerance window around zero.
    OnTarget,
    /// Countdown below the window; the cycle is overdue.
    Overdue,
}

/// Where the current tick falls within the shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayPhase {
    /// The shift's first block has not opened yet.
    PreShift,
    /// Inside a working block.
    Running,
    /// Between blocks (or after the last block, before rollover).
    Break,
}

/// One row of the schedule table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScheduleRow {
    pub block: usize,
    pub start: String,
    pub end: String,
    pub seconds: i64,
}

/// Immutable snapshot of everything the display renders. Built fresh every
/// tick; holds no references into engine state.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Snapshot {
    pub shift: String,
    pub block: usize,
    pub phase: DisplayPhase,
    /// Countdown string while running; summary text pre-shift and on break.
    pub countdown: String,
    pub screen: ScreenState,
    pub ahead_label: String,
    pub tally: BlockTally,
    pub andon_label: String,
    pub history: Vec<String>,
    pub clock_label: String,
    pub target_seconds_per_part: u32,
    pub parts_per_cycle: u32,
    pub target_entry: String,
    pub partsper_entry: String,
    pub catch_up_mode: bool,
    /// Behind schedule and not yet catching up: prompt may be shown.
    pub catch_up_available: bool,
    pub catch_up_pace: u32,
    pub catch_up_estimate: String,
    pub last_drift_seconds: i64,
    pub block_cycles_label: String,
    pub shift_cycles_label: String,
    pub schedule_rows: Vec<ScheduleRow>,
    pub total_available_seconds: i64,
    pub schedule_dirty: bool,
    /// One-line summary of the outgoing shift, kept visible through the gap
    /// before the next shift's first block opens.
    pub shift_summary: Option<String>,
}
