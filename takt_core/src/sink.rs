//! Event-persistence seam: discrete records pushed to an external sink.
//!
//! The sink is a best-effort collaborator: calls carry fully-formed immutable
//! snapshots of the data, outcomes are logged by the dispatcher and never fed
//! back into engine state. At-most-once delivery is the explicit contract.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::andon::AndonCategory;
use crate::error::SinkError;
use crate::timer::CycleClass;

/// Station identity attached to every outbound record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SequenceMeta {
    pub area: String,
    pub sequence: String,
    pub sequence_num: u32,
}

/// Reference to the KPI row current events attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KpiRef {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleEvent {
    pub at: NaiveDateTime,
    pub duration_seconds: i64,
    pub classification: CycleClass,
    pub parts_per_cycle: u32,
    pub meta: SequenceMeta,
    pub kpi: Option<KpiRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AndonEvent {
    pub at: NaiveDateTime,
    pub category: AndonCategory,
    pub meta: SequenceMeta,
    pub kpi: Option<KpiRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AndonAckEvent {
    pub at: NaiveDateTime,
    pub meta: SequenceMeta,
    pub kpi: Option<KpiRef>,
}

/// Persistence collaborator. Implementations own their timeouts; the engine
/// never awaits completion and never retries.
pub trait EventSink {
    fn record_cycle(&self, event: &CycleEvent) -> Result<(), SinkError>;
    fn record_andon(&self, event: &AndonEvent) -> Result<(), SinkError>;
    fn record_andon_ack(&self, event: &AndonAckEvent) -> Result<(), SinkError>;

    /// Look up the KPI row for an area/shift/date, if the backing store has
    /// one. `None` is a normal answer for stations without a remote server.
    fn fetch_current_kpi(
        &self,
        area: &str,
        shift: &str,
        date: NaiveDate,
    ) -> Result<Option<KpiRef>, SinkError>;
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn record_cycle(&self, event: &CycleEvent) -> Result<(), SinkError> {
        (**self).record_cycle(event)
    }

    fn record_andon(&self, event: &AndonEvent) -> Result<(), SinkError> {
        (**self).record_andon(event)
    }

    fn record_andon_ack(&self, event: &AndonAckEvent) -> Result<(), SinkError> {
        (**self).record_andon_ack(event)
    }

    fn fetch_current_kpi(
        &self,
        area: &str,
        shift: &str,
        date: NaiveDate,
    ) -> Result<Option<KpiRef>, SinkError> {
        (**self).fetch_current_kpi(area, shift, date)
    }
}
