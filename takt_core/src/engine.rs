//! The pacing engine: one instance owns all mutable state and is driven by a
//! single recurring tick plus synchronous operator commands.
//!
//! Construction wires in the seams (clock, settings store, event dispatcher)
//! so the engine is independently testable with the mocks in `mocks`.

use std::sync::Arc;

use chrono::NaiveDateTime;

use takt_traits::{Clock, SettingsStore};

use crate::andon::{AndonCategory, AndonTally};
use crate::dispatch::{EventDispatcher, EventRecord};
use crate::entry::BoundedNumericEntry;
use crate::error::{EntryError, Result};
use crate::pace::{cycles_to_catch_up, CyclePace};
use crate::schedule::{resolve_schedule, BoundaryEdge, NudgeDir, ScheduleStore, ShiftSchedule};
use crate::shift_log::ShiftLogRow;
use crate::snapshot::{DisplayPhase, ScheduleRow, ScreenState, Snapshot};
use crate::timer::{CycleClass, CycleTimer};
use crate::util::format_duration;

/// Digits accepted by the target-seconds keypad field.
const TARGET_ENTRY_WIDTH: usize = 4;
/// Digits accepted by the parts-per-cycle keypad field.
const PARTSPER_ENTRY_WIDTH: usize = 2;
/// Upper bound for a confirmed target-seconds entry.
const TARGET_SECONDS_MAX: u32 = 9999;

/// Engine tuning knobs (see the `[engine]` config table).
#[derive(Debug, Clone)]
pub struct EngineCfg {
    pub tick_ms: u64,
    /// On-target tolerance in seconds per part (scaled by parts per cycle).
    pub tolerance_window: i64,
    /// Minimum seconds between two classified cycles.
    pub debounce_seconds: i64,
    /// Step size of one schedule boundary adjustment (minutes).
    pub nudge_minutes: u32,
    pub parts_per_cycle_max: u32,
}

impl Default for EngineCfg {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            tolerance_window: 3,
            debounce_seconds: 2,
            nudge_minutes: 5,
            parts_per_cycle_max: 99,
        }
    }
}

/// Operator-editable numeric fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    TargetSeconds,
    PartsPerCycle,
}

/// Discrete operator commands delivered synchronously between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Pedal press: classify the elapsed cycle.
    Cycle,
    /// Correct a miscount by bumping one tally directly.
    AdjustTally(CycleClass),
    Andon(AndonCategory),
    AcknowledgeAndon,
    Digit(EntryField, u8),
    Backspace(EntryField),
    Confirm(EntryField),
    CatchUp(bool),
    CatchUpPace(u32),
    Nudge {
        block: usize,
        edge: BoundaryEdge,
        dir: NudgeDir,
    },
    PersistScheduleDefault,
    PersistScheduleOnce,
}

pub struct PacingEngine {
    cfg: EngineCfg,
    clock: Arc<dyn Clock + Send + Sync>,
    settings: Box<dyn SettingsStore + Send>,
    events: Option<EventDispatcher>,
    store: ScheduleStore,
    timer: CycleTimer,
    pace: CyclePace,
    andon: AndonTally,
    target_entry: BoundedNumericEntry,
    partsper_entry: BoundedNumericEntry,
    catch_up_pace: u32,
    /// Active block index; 0 until the first tick lands in a block.
    block: usize,
    block_history: Vec<(usize, String)>,
    shift_summary: Option<String>,
    completed_shift: Option<ShiftLogRow>,
}

impl PacingEngine {
    /// Read pacing, resolve the active shift's schedule, and start the
    /// countdown from now.
    pub fn new(
        cfg: EngineCfg,
        clock: Arc<dyn Clock + Send + Sync>,
        settings: Box<dyn SettingsStore + Send>,
        events: Option<EventDispatcher>,
    ) -> Result<Self> {
        let now = clock.now();
        let (target, parts) = settings
            .pacing()
            .map_err(|e| eyre::eyre!("reading pacing values: {e}"))?;
        let pace = CyclePace::new(target, parts.min(cfg.parts_per_cycle_max));
        let schedule = resolve_schedule(settings.as_ref(), now)?;
        tracing::info!(shift = %schedule.shift(), blocks = %schedule.start_line(), "schedule resolved");

        let timer = CycleTimer::new(now, cfg.debounce_seconds, cfg.tolerance_window);
        let catch_up_pace = pace.target_seconds_per_part();
        let store = ScheduleStore::new(schedule, cfg.nudge_minutes);

        let engine = Self {
            cfg,
            clock,
            settings,
            events,
            store,
            timer,
            pace,
            andon: AndonTally::new(),
            target_entry: BoundedNumericEntry::sliding(TARGET_ENTRY_WIDTH),
            partsper_entry: BoundedNumericEntry::sliding(PARTSPER_ENTRY_WIDTH),
            catch_up_pace,
            block: 0,
            block_history: Vec::new(),
            shift_summary: None,
            completed_shift: None,
        };
        if let Some(events) = &engine.events {
            events.dispatch(EventRecord::ShiftStarted {
                shift: engine.store.schedule().shift().key(),
                date: engine.store.schedule().kpi_date(),
            });
        }
        Ok(engine)
    }

    /// One evaluation pass: rollover detection, block tracking, countdown,
    /// snapshot.
    pub fn tick(&mut self) -> Snapshot {
        let now = self.clock.now();

        if now > self.store.schedule().last_boundary() {
            self.rollover(now);
        }

        let index = self.store.current_block_index(now);
        if index != self.block {
            if self.block != 0 {
                self.block_history.push((self.block, self.timer.block_summary()));
            }
            let available = self.store.schedule().block_available_seconds(index);
            self.timer.on_block_changed(now, available, &self.pace);
            tracing::info!(block = index, available, "block changed");
            self.block = index;
        }

        let remaining = self.timer.tick(now, &self.pace);

        // Deficit cleared: the faster pace has done its job.
        if self.timer.in_catch_up() && self.ahead_by(now) >= 0 {
            self.timer.exit_catch_up();
            tracing::info!("catch-up complete");
        }

        self.snapshot(now, remaining)
    }

    /// Apply one operator command. Commands never fail the engine; invalid
    /// input is recovered locally and logged.
    pub fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Cycle => self.record_cycle(),
            Command::AdjustTally(class) => {
                self.timer.adjust_tally(class);
                tracing::debug!(%class, "tally adjusted manually");
            }
            Command::Andon(category) => {
                self.andon.signal(category);
                tracing::info!(%category, "andon signaled");
                if let Some(events) = &self.events {
                    events.dispatch(EventRecord::Andon {
                        at: self.clock.now(),
                        category,
                    });
                }
            }
            Command::AcknowledgeAndon => {
                self.andon.acknowledge();
                tracing::info!("andon acknowledged");
                if let Some(events) = &self.events {
                    events.dispatch(EventRecord::AndonAck {
                        at: self.clock.now(),
                    });
                }
            }
            Command::Digit(field, digit) => self.entry_mut(field).push_digit(digit),
            Command::Backspace(field) => self.entry_mut(field).backspace(),
            Command::Confirm(field) => {
                let _ = self.confirm_entry(field);
            }
            Command::CatchUp(true) => {
                let target =
                    i64::from(self.catch_up_pace) * i64::from(self.pace.parts_per_cycle());
                self.timer.enter_catch_up(target);
                tracing::info!(pace = self.catch_up_pace, "catch-up engaged");
            }
            Command::CatchUp(false) => self.timer.exit_catch_up(),
            Command::CatchUpPace(value) => {
                self.catch_up_pace = self.pace.clamp_catch_up_pace(value);
                if self.timer.in_catch_up() {
                    let target =
                        i64::from(self.catch_up_pace) * i64::from(self.pace.parts_per_cycle());
                    self.timer.enter_catch_up(target);
                }
            }
            Command::Nudge { block, edge, dir } => {
                self.store.nudge_boundary(block, edge, dir);
                let index = self.block.max(1);
                self.timer.recompute_expected(
                    self.store.schedule().block_available_seconds(index),
                    &self.pace,
                );
            }
            Command::PersistScheduleDefault => self.persist_schedule(true),
            Command::PersistScheduleOnce => self.persist_schedule(false),
        }
    }

    /// Commit a pending numeric entry into its parameter and persist it.
    /// Rejections clear the buffer and leave the parameter untouched.
    pub fn confirm_entry(&mut self, field: EntryField) -> std::result::Result<u32, EntryError> {
        let confirmed = match field {
            EntryField::TargetSeconds => self.target_entry.confirm(1, TARGET_SECONDS_MAX),
            EntryField::PartsPerCycle => self.partsper_entry.confirm(1, self.cfg.parts_per_cycle_max),
        };
        match confirmed {
            Ok(value) => {
                match field {
                    EntryField::TargetSeconds => self.pace.set_target_seconds_per_part(value),
                    EntryField::PartsPerCycle => self.pace.set_parts_per_cycle(value),
                }
                self.catch_up_pace = self.pace.clamp_catch_up_pace(self.catch_up_pace);
                let index = self.block.max(1);
                self.timer.recompute_expected(
                    self.store.schedule().block_available_seconds(index),
                    &self.pace,
                );
                if let Err(e) = self
                    .settings
                    .save_pacing(self.pace.target_seconds_per_part(), self.pace.parts_per_cycle())
                {
                    tracing::warn!(error = %e, "pacing not persisted");
                }
                tracing::info!(?field, value, "pacing updated");
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(?field, error = %e, "entry rejected");
                Err(e)
            }
        }
    }

    /// Cycles ahead (+) / behind (-) of the block-elapsed expectation.
    pub fn ahead_by(&self, now: NaiveDateTime) -> i64 {
        self.timer.ahead_by(self.store.block_elapsed_seconds(now), &self.pace)
    }

    /// Seconds of schedule ahead (+) / behind (-); feeds the catch-up
    /// planner.
    fn ahead_seconds(&self, now: NaiveDateTime) -> i64 {
        i64::from(self.timer.tally().total()) * self.pace.target_cycle_seconds()
            - self.store.block_elapsed_seconds(now)
    }

    /// The completed-shift row captured at the last rollover, if any.
    pub fn take_completed_shift(&mut self) -> Option<ShiftLogRow> {
        self.completed_shift.take()
    }

    pub fn schedule(&self) -> &ShiftSchedule {
        self.store.schedule()
    }

    pub fn pace(&self) -> &CyclePace {
        &self.pace
    }

    pub fn andon(&self) -> &AndonTally {
        &self.andon
    }

    pub fn timer(&self) -> &CycleTimer {
        &self.timer
    }

    pub fn block(&self) -> usize {
        self.block
    }

    pub fn block_history(&self) -> &[(usize, String)] {
        &self.block_history
    }

    pub fn catch_up_pace(&self) -> u32 {
        self.catch_up_pace
    }

    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.cfg.tick_ms.max(1))
    }

    pub fn clock(&self) -> Arc<dyn Clock + Send + Sync> {
        Arc::clone(&self.clock)
    }

    fn entry_mut(&mut self, field: EntryField) -> &mut BoundedNumericEntry {
        match field {
            EntryField::TargetSeconds => &mut self.target_entry,
            EntryField::PartsPerCycle => &mut self.partsper_entry,
        }
    }

    fn record_cycle(&mut self) {
        let now = self.clock.now();
        let block_start = self.store.schedule().block_start(self.block.max(1));
        if let Some((class, elapsed)) = self.timer.record_cycle(now, &self.pace, block_start) {
            tracing::debug!(%class, elapsed, "cycle recorded");
            if let Some(events) = &self.events {
                events.dispatch(EventRecord::Cycle {
                    at: now,
                    duration_seconds: elapsed,
                    classification: class,
                    parts_per_cycle: self.pace.parts_per_cycle(),
                });
            }
        }
    }

    /// The wall clock passed the last boundary: capture the outgoing
    /// summary, then load the next shift's schedule wholesale.
    fn rollover(&mut self, now: NaiveDateTime) {
        let outgoing = self.store.schedule().shift();
        let expected_shift_cycles =
            self.store.total_available_seconds() / self.pace.target_cycle_seconds().max(1);
        let summary = format!(
            "shift {}/{}, block {}",
            self.timer.shift_cycles(),
            expected_shift_cycles,
            self.timer.block_summary(),
        );
        tracing::info!(shift = %outgoing, %summary, "shift complete");
        self.completed_shift = Some(ShiftLogRow {
            date: self.store.schedule().kpi_date().to_string(),
            shift: outgoing.key().to_string(),
            cycles: self.timer.shift_cycles(),
            expected_cycles: expected_shift_cycles,
            andons: self.andon.total_issued(),
        });
        self.shift_summary = Some(summary);

        match resolve_schedule(self.settings.as_ref(), now) {
            Ok(schedule) => {
                let shift = schedule.shift();
                let date = schedule.kpi_date();
                self.store.replace(schedule);
                self.timer.on_shift_rollover();
                self.andon.reset();
                self.block = 0;
                self.block_history.clear();
                if let Some(events) = &self.events {
                    events.dispatch(EventRecord::ShiftStarted {
                        shift: shift.key(),
                        date,
                    });
                }
                tracing::info!(shift = %shift, "shift rollover");
            }
            Err(e) => {
                // Keep pacing against the stale schedule rather than halt
                // the tick loop; the settings file is fixed out of band.
                tracing::error!(error = %e, "schedule reload failed");
            }
        }
    }

    fn snapshot(&self, now: NaiveDateTime, remaining: i64) -> Snapshot {
        let schedule = self.store.schedule();
        let index = self.block.max(1);
        let window = self.timer.window_seconds(&self.pace);
        let pre_shift = now < schedule.block_start(1);
        let in_block = !pre_shift && now < schedule.block_end(index);

        let (phase, countdown, screen, ahead_label) = if pre_shift {
            let label = format!(
                "Shift: {}  Available: {}s  Pace: {} x {}",
                schedule.shift(),
                schedule.total_available_seconds(),
                self.pace.target_seconds_per_part(),
                self.pace.parts_per_cycle(),
            );
            (DisplayPhase::PreShift, label, ScreenState::Idle, "Ahead: N/A".to_string())
        } else if in_block {
            let ahead = self.ahead_by(now);
            let done = self.timer.tally().total();
            let expected_so_far =
                self.store.block_elapsed_seconds(now).max(0) / self.pace.target_cycle_seconds().max(1);
            let label = if ahead >= 0 {
                format!("Ahead: {ahead} ({done}/{expected_so_far})")
            } else {
                format!("Behind: {} ({done}/{expected_so_far})", -ahead)
            };
            let screen = if remaining > window {
                ScreenState::Neutral
            } else if remaining >= -window {
                ScreenState::OnTarget
            } else {
                ScreenState::Overdue
            };
            (DisplayPhase::Running, format_duration(remaining, false), screen, label)
        } else {
            (
                DisplayPhase::Break,
                self.timer.block_summary(),
                ScreenState::Idle,
                "BREAK".to_string(),
            )
        };

        let catch_up_estimate = cycles_to_catch_up(
            self.ahead_seconds(now),
            self.pace.target_cycle_seconds(),
            self.catch_up_pace,
            self.pace.parts_per_cycle(),
        )
        .to_string();
        let expected_shift_cycles =
            schedule.total_available_seconds() / self.pace.target_cycle_seconds().max(1);

        Snapshot {
            shift: schedule.shift().to_string(),
            block: index,
            phase,
            countdown,
            screen,
            ahead_label,
            tally: *self.timer.tally(),
            andon_label: self.andon.display_label(),
            history: self.timer.history().iter().cloned().collect(),
            clock_label: now.format("%I:%M:%S %p").to_string(),
            target_seconds_per_part: self.pace.target_seconds_per_part(),
            parts_per_cycle: self.pace.parts_per_cycle(),
            target_entry: self.target_entry.buffer().to_string(),
            partsper_entry: self.partsper_entry.buffer().to_string(),
            catch_up_mode: self.timer.in_catch_up(),
            catch_up_available: in_block && !self.timer.in_catch_up() && self.ahead_by(now) < 0,
            catch_up_pace: self.catch_up_pace,
            catch_up_estimate,
            last_drift_seconds: self.timer.last_drift_seconds(),
            block_cycles_label: format!(
                "Block Cycles: {}/{}",
                self.timer.tally().total(),
                self.timer.expected_block_cycles()
            ),
            shift_cycles_label: format!(
                "Shift Cycles: {}/{}",
                self.timer.shift_cycles(),
                expected_shift_cycles
            ),
            schedule_rows: (1..=4)
                .map(|block| ScheduleRow {
                    block,
                    start: schedule.block_start(block).format("%I:%M %p").to_string(),
                    end: schedule.block_end(block).format("%I:%M %p").to_string(),
                    seconds: schedule.block_available_seconds(block),
                })
                .collect(),
            total_available_seconds: schedule.total_available_seconds(),
            schedule_dirty: self.store.is_dirty(),
            shift_summary: self.shift_summary.clone(),
        }
    }

    /// Hand the serialized boundary list to the settings collaborator, as
    /// the shift's new baseline or as a one-time override.
    fn persist_schedule(&mut self, default: bool) {
        let schedule = self.store.schedule();
        let date = schedule.kpi_date().to_string();
        match self.settings.persist_schedule(
            schedule.shift().key(),
            &date,
            &schedule.start_line(),
            &schedule.end_line(),
            default,
        ) {
            Ok(()) => {
                self.store.clear_dirty();
                tracing::info!(default, "schedule persisted");
            }
            Err(e) => tracing::warn!(error = %e, "schedule not persisted"),
        }
    }
}
