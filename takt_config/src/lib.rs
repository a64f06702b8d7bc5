#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and the file-backed settings store for the pacing timer.
//!
//! - `Settings` and sub-structs are deserialized from TOML and validated.
//! - Schedule lines are strings of 4 comma-joined 24-hour `HHMM` values,
//!   one `start` and one `end` line per shift.
//! - `TomlSettings` implements the `SettingsStore` seam: confirmed operator
//!   edits are written back with an atomic file rewrite.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use takt_traits::SettingsStore;

/// Operator-set pacing values, persisted so the station survives restarts.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct Pacing {
    /// Planned seconds for cycling one part through flow
    pub target_seconds_per_part: u32,
    /// Parts this sequence produces per cycle
    pub parts_per_cycle: u32,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            target_seconds_per_part: 30,
            parts_per_cycle: 1,
        }
    }
}

/// Engine tuning knobs.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineCfg {
    /// Tick interval of the evaluation loop (ms)
    pub tick_ms: u64,
    /// On-target tolerance in seconds per part (scaled by parts per cycle)
    pub tolerance_window: u32,
    /// Minimum seconds between two classified cycles
    pub debounce_seconds: u32,
    /// Step size of one schedule boundary adjustment (minutes)
    pub nudge_minutes: u32,
    /// Upper bound accepted for the parts-per-cycle entry
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

/// One shift's block boundaries: 4 starts and 4 ends as `HHMM` lists.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShiftLines {
    pub start: String,
    pub end: String,
}

impl ShiftLines {
    fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

/// Baseline schedules for the three shifts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleCfg {
    pub grave: ShiftLines,
    pub day: ShiftLines,
    pub swing: ShiftLines,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            grave: ShiftLines::new("2300, 0100, 0300, 0500", "0045, 0245, 0445, 0700"),
            day: ShiftLines::new("0700, 0900, 1100, 1300", "0845, 1045, 1245, 1500"),
            swing: ShiftLines::new("1500, 1700, 1900, 2100", "1645, 1845, 2045, 2300"),
        }
    }
}

impl ScheduleCfg {
    pub fn for_shift(&self, shift: &str) -> Option<&ShiftLines> {
        match shift {
            "grave" => Some(&self.grave),
            "day" => Some(&self.day),
            "swing" => Some(&self.swing),
            _ => None,
        }
    }

    fn for_shift_mut(&mut self, shift: &str) -> Option<&mut ShiftLines> {
        match shift {
            "grave" => Some(&mut self.grave),
            "day" => Some(&mut self.day),
            "swing" => Some(&mut self.swing),
            _ => None,
        }
    }
}

/// One-time schedule adjustment: applies only to the named shift on the
/// named calendar date and never touches the stored baseline.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleOverride {
    pub shift: String,
    /// ISO `YYYY-MM-DD`
    pub date: String,
    pub start: String,
    pub end: String,
}

/// Persistence collaborator settings: where discrete events are sent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Data {
    /// Remote KPI server host; empty disables remote sync
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<String>,
    pub sequence_num: u32,
    /// Local best-effort event log (JSON lines)
    pub local_log: String,
    /// End-of-shift summary CSV
    pub shift_log: String,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            server: None,
            area: None,
            sequence: None,
            sequence_num: 1,
            local_log: "cycles.jsonl".to_string(),
            shift_log: "shifts.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Logging {
    /// Path to .log (JSON lines)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// "info","debug"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub pacing: Pacing,
    pub engine: EngineCfg,
    pub schedule: ScheduleCfg,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_override: Option<ScheduleOverride>,
    pub data: Data,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str::<Settings>(s)
}

/// Parse one `HHMM, HHMM, HHMM, HHMM` line into times of day.
pub fn parse_hhmm_line(line: &str) -> eyre::Result<Vec<NaiveTime>> {
    let mut out = Vec::with_capacity(4);
    for raw in line.split(',') {
        let raw = raw.trim();
        let t = NaiveTime::parse_from_str(raw, "%H%M")
            .map_err(|e| eyre::eyre!("invalid HHMM value {raw:?}: {e}"))?;
        out.push(t);
    }
    if out.len() != 4 {
        eyre::bail!("expected 4 comma-joined HHMM values, got {}", out.len());
    }
    Ok(out)
}

/// Join times of day back into the persisted `HHMM` line layout.
pub fn format_hhmm_line(times: &[NaiveTime]) -> String {
    times
        .iter()
        .map(|t| t.format("%H%M").to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Settings {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pacing
        if self.pacing.target_seconds_per_part == 0 {
            eyre::bail!("pacing.target_seconds_per_part must be > 0");
        }
        if self.pacing.parts_per_cycle == 0 {
            eyre::bail!("pacing.parts_per_cycle must be > 0");
        }
        if self.pacing.parts_per_cycle > self.engine.parts_per_cycle_max {
            eyre::bail!(
                "pacing.parts_per_cycle exceeds engine.parts_per_cycle_max ({})",
                self.engine.parts_per_cycle_max
            );
        }

        // Engine
        if self.engine.tick_ms == 0 {
            eyre::bail!("engine.tick_ms must be >= 1");
        }
        if self.engine.tick_ms > 1000 {
            eyre::bail!("engine.tick_ms is unreasonably large (>1s)");
        }
        if self.engine.nudge_minutes == 0 {
            eyre::bail!("engine.nudge_minutes must be >= 1");
        }
        if self.engine.parts_per_cycle_max == 0 {
            eyre::bail!("engine.parts_per_cycle_max must be >= 1");
        }

        // Schedule lines must parse for every shift
        for shift in ["grave", "day", "swing"] {
            let lines = self
                .schedule
                .for_shift(shift)
                .ok_or_else(|| eyre::eyre!("missing schedule for shift {shift}"))?;
            parse_hhmm_line(&lines.start)
                .map_err(|e| eyre::eyre!("schedule.{shift}.start: {e}"))?;
            parse_hhmm_line(&lines.end).map_err(|e| eyre::eyre!("schedule.{shift}.end: {e}"))?;
        }
        if let Some(o) = &self.schedule_override {
            if self.schedule.for_shift(&o.shift).is_none() {
                eyre::bail!("schedule_override.shift {:?} is not a shift name", o.shift);
            }
            parse_hhmm_line(&o.start).map_err(|e| eyre::eyre!("schedule_override.start: {e}"))?;
            parse_hhmm_line(&o.end).map_err(|e| eyre::eyre!("schedule_override.end: {e}"))?;
        }

        // Data
        if self.data.sequence_num == 0 {
            eyre::bail!("data.sequence_num must be >= 1");
        }

        Ok(())
    }
}

/// Replace `path` contents without leaving a torn file behind.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    let tmp = path.with_extension("new");
    {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(tmp, path)
}

/// File-backed settings store (the `takt.toml` collaborator).
///
/// Reads re-parse the file so external edits are picked up at the next shift
/// rollover; writes validate and rewrite atomically.
#[derive(Debug, Clone)]
pub struct TomlSettings {
    path: PathBuf,
}

impl TomlSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> eyre::Result<Settings> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| eyre::eyre!("read {:?}: {e}", self.path))?;
        let settings = load_toml(&text).map_err(|e| eyre::eyre!("parse {:?}: {e}", self.path))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write a fresh settings file (used to seed a new station).
    pub fn write_default(&self) -> eyre::Result<()> {
        let text = toml::to_string_pretty(&Settings::default())?;
        write_atomic(&self.path, text.as_bytes())?;
        Ok(())
    }

    fn rewrite(&self, apply: impl FnOnce(&mut Settings) -> eyre::Result<()>) -> eyre::Result<()> {
        let mut settings = self.load()?;
        apply(&mut settings)?;
        settings.validate()?;
        let text = toml::to_string_pretty(&settings)?;
        write_atomic(&self.path, text.as_bytes())?;
        Ok(())
    }
}

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

impl SettingsStore for TomlSettings {
    fn pacing(&self) -> Result<(u32, u32), BoxedError> {
        let s = self.load()?;
        Ok((s.pacing.target_seconds_per_part, s.pacing.parts_per_cycle))
    }

    fn save_pacing(&self, target_seconds_per_part: u32, parts_per_cycle: u32) -> Result<(), BoxedError> {
        self.rewrite(|s| {
            s.pacing.target_seconds_per_part = target_seconds_per_part;
            s.pacing.parts_per_cycle = parts_per_cycle;
            Ok(())
        })?;
        Ok(())
    }

    fn schedule_lines(&self, shift: &str, date: &str) -> Result<(String, String), BoxedError> {
        let s = self.load()?;
        if let Some(o) = &s.schedule_override
            && o.shift == shift
            && o.date == date
        {
            return Ok((o.start.clone(), o.end.clone()));
        }
        let lines = s
            .schedule
            .for_shift(shift)
            .ok_or_else(|| eyre::eyre!("unknown shift {shift:?}"))?;
        Ok((lines.start.clone(), lines.end.clone()))
    }

    fn persist_schedule(
        &self,
        shift: &str,
        date: &str,
        start: &str,
        end: &str,
        default: bool,
    ) -> Result<(), BoxedError> {
        self.rewrite(|s| {
            if default {
                let lines = s
                    .schedule
                    .for_shift_mut(shift)
                    .ok_or_else(|| eyre::eyre!("unknown shift {shift:?}"))?;
                lines.start = start.to_string();
                lines.end = end.to_string();
                // A new baseline supersedes any pending override for the shift.
                if s.schedule_override.as_ref().is_some_and(|o| o.shift == shift) {
                    s.schedule_override = None;
                }
            } else {
                s.schedule_override = Some(ScheduleOverride {
                    shift: shift.to_string(),
                    date: date.to_string(),
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
            Ok(())
        })?;
        Ok(())
    }
}
