//! Best-effort local event sink: one JSON line per record.
//!
//! No retries and no durability guarantee; a failed append surfaces as
//! `PersistenceUnavailable` and the dispatcher logs it. A remote KPI server
//! would be a second `EventSink` implementation behind the same seam.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use chrono::NaiveDate;
use takt_core::error::SinkError;
use takt_core::sink::{AndonAckEvent, AndonEvent, CycleEvent, EventSink, KpiRef};

pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append<T: Serialize>(&self, kind: &str, event: &T) -> Result<(), SinkError> {
        #[derive(Serialize)]
        struct Line<'a, T> {
            kind: &'a str,
            #[serde(flatten)]
            event: &'a T,
        }
        let line = serde_json::to_string(&Line { kind, event })
            .map_err(|e| SinkError::Io(e.to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;
        writeln!(file, "{line}").map_err(|e| SinkError::Unavailable(e.to_string()))
    }
}

impl EventSink for JsonlSink {
    fn record_cycle(&self, event: &CycleEvent) -> Result<(), SinkError> {
        self.append("cycle", event)
    }

    fn record_andon(&self, event: &AndonEvent) -> Result<(), SinkError> {
        self.append("andon", event)
    }

    fn record_andon_ack(&self, event: &AndonAckEvent) -> Result<(), SinkError> {
        self.append("andon_ack", event)
    }

    fn fetch_current_kpi(
        &self,
        _area: &str,
        _shift: &str,
        _date: NaiveDate,
    ) -> Result<Option<KpiRef>, SinkError> {
        // The local log keeps no KPI table.
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use takt_core::sink::SequenceMeta;
    use takt_core::timer::CycleClass;

    fn event(at: NaiveDateTime) -> CycleEvent {
        CycleEvent {
            at,
            duration_seconds: 30,
            classification: CycleClass::OnTarget,
            parts_per_cycle: 1,
            meta: SequenceMeta::default(),
            kpi: None,
        }
    }

    #[test]
    fn appends_tagged_json_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cycles.jsonl");
        let sink = JsonlSink::new(&path);
        let at = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 30)
            .unwrap();
        sink.record_cycle(&event(at)).expect("append");
        sink.record_cycle(&event(at)).expect("append");

        let text = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).expect("valid json");
        assert_eq!(parsed["kind"], "cycle");
        assert_eq!(parsed["duration_seconds"], 30);
        assert_eq!(parsed["classification"], "on_target");
    }
}
