//! Test and helper mocks for takt_core.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use takt_traits::{Clock, SettingsStore};

use crate::error::SinkError;
use crate::sink::{AndonAckEvent, AndonEvent, CycleEvent, EventSink, KpiRef};

/// Deterministic wall clock advanced manually; `sleep` advances time instead
/// of blocking.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn starting_at(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, delta: TimeDelta) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += delta;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.lock().map(|guard| *guard).unwrap_or_default()
    }

    fn sleep(&self, d: Duration) {
        self.advance(TimeDelta::from_std(d).unwrap_or(TimeDelta::zero()));
    }
}

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Default)]
struct MemorySettingsState {
    pacing: (u32, u32),
    lines: BTreeMap<String, (String, String)>,
    override_lines: Option<(String, String, String, String)>,
    saved_pacing: Vec<(u32, u32)>,
    persisted_schedules: Vec<(String, String, String, String, bool)>,
}

/// In-memory settings store seeded with the standard three-shift schedule.
#[derive(Debug, Default)]
pub struct MemorySettings {
    state: Mutex<MemorySettingsState>,
}

impl MemorySettings {
    pub fn new(target_seconds_per_part: u32, parts_per_cycle: u32) -> Self {
        let mut lines = BTreeMap::new();
        lines.insert(
            "grave".to_string(),
            (
                "2300, 0100, 0300, 0500".to_string(),
                "0045, 0245, 0445, 0700".to_string(),
            ),
        );
        lines.insert(
            "day".to_string(),
            (
                "0700, 0900, 1100, 1300".to_string(),
                "0845, 1045, 1245, 1500".to_string(),
            ),
        );
        lines.insert(
            "swing".to_string(),
            (
                "1500, 1700, 1900, 2100".to_string(),
                "1645, 1845, 2045, 2300".to_string(),
            ),
        );
        Self {
            state: Mutex::new(MemorySettingsState {
                pacing: (target_seconds_per_part, parts_per_cycle),
                lines,
                ..MemorySettingsState::default()
            }),
        }
    }

    pub fn set_lines(&self, shift: &str, start: &str, end: &str) {
        if let Ok(mut state) = self.state.lock() {
            state
                .lines
                .insert(shift.to_string(), (start.to_string(), end.to_string()));
        }
    }

    /// Every pacing pair the engine asked to persist, in order.
    pub fn saved_pacing(&self) -> Vec<(u32, u32)> {
        self.state.lock().map(|s| s.saved_pacing.clone()).unwrap_or_default()
    }

    /// Every schedule write, as (shift, date, start, end, default).
    pub fn persisted_schedules(&self) -> Vec<(String, String, String, String, bool)> {
        self.state
            .lock()
            .map(|s| s.persisted_schedules.clone())
            .unwrap_or_default()
    }
}

impl SettingsStore for MemorySettings {
    fn pacing(&self) -> Result<(u32, u32), BoxedError> {
        Ok(self.state.lock().map(|s| s.pacing).unwrap_or((30, 1)))
    }

    fn save_pacing(&self, target_seconds_per_part: u32, parts_per_cycle: u32) -> Result<(), BoxedError> {
        if let Ok(mut state) = self.state.lock() {
            state.pacing = (target_seconds_per_part, parts_per_cycle);
            state.saved_pacing.push((target_seconds_per_part, parts_per_cycle));
        }
        Ok(())
    }

    fn schedule_lines(&self, shift: &str, date: &str) -> Result<(String, String), BoxedError> {
        let state = self
            .state
            .lock()
            .map_err(|_| std::io::Error::other("settings state poisoned"))?;
        if let Some((o_shift, o_date, start, end)) = &state.override_lines
            && o_shift == shift
            && o_date == date
        {
            return Ok((start.clone(), end.clone()));
        }
        state
            .lines
            .get(shift)
            .cloned()
            .ok_or_else(|| std::io::Error::other(format!("unknown shift {shift:?}")).into())
    }

    fn persist_schedule(
        &self,
        shift: &str,
        date: &str,
        start: &str,
        end: &str,
        default: bool,
    ) -> Result<(), BoxedError> {
        if let Ok(mut state) = self.state.lock() {
            if default {
                state
                    .lines
                    .insert(shift.to_string(), (start.to_string(), end.to_string()));
                if state.override_lines.as_ref().is_some_and(|(s, ..)| s == shift) {
                    state.override_lines = None;
                }
            } else {
                state.override_lines = Some((
                    shift.to_string(),
                    date.to_string(),
                    start.to_string(),
                    end.to_string(),
                ));
            }
            state.persisted_schedules.push((
                shift.to_string(),
                date.to_string(),
                start.to_string(),
                end.to_string(),
                default,
            ));
        }
        Ok(())
    }
}

/// Sink that records events in memory; optionally fails every call.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub cycles: Mutex<Vec<CycleEvent>>,
    pub andons: Mutex<Vec<AndonEvent>>,
    pub acks: Mutex<Vec<AndonAckEvent>>,
    pub kpi_lookups: Mutex<Vec<(String, String, NaiveDate)>>,
    kpi: Option<KpiRef>,
    fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kpi(id: i64) -> Self {
        Self {
            kpi: Some(KpiRef { id }),
            ..Self::default()
        }
    }

    /// Every call reports `PersistenceUnavailable`.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn outcome(&self) -> Result<(), SinkError> {
        if self.fail {
            Err(SinkError::Unavailable("sink offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl EventSink for MemorySink {
    fn record_cycle(&self, event: &CycleEvent) -> Result<(), SinkError> {
        self.outcome()?;
        if let Ok(mut cycles) = self.cycles.lock() {
            cycles.push(event.clone());
        }
        Ok(())
    }

    fn record_andon(&self, event: &AndonEvent) -> Result<(), SinkError> {
        self.outcome()?;
        if let Ok(mut andons) = self.andons.lock() {
            andons.push(event.clone());
        }
        Ok(())
    }

    fn record_andon_ack(&self, event: &AndonAckEvent) -> Result<(), SinkError> {
        self.outcome()?;
        if let Ok(mut acks) = self.acks.lock() {
            acks.push(event.clone());
        }
        Ok(())
    }

    fn fetch_current_kpi(
        &self,
        area: &str,
        shift: &str,
        date: NaiveDate,
    ) -> Result<Option<KpiRef>, SinkError> {
        self.outcome()?;
        if let Ok(mut lookups) = self.kpi_lookups.lock() {
            lookups.push((area.to_string(), shift.to_string(), date));
        }
        Ok(self.kpi)
    }
}
