//! Fire-and-forget background dispatch of persistence events.
//!
//! One worker thread owns the sink; the engine hands it fully-formed
//! immutable records over a bounded channel. A full channel drops the event
//! (at-most-once, best-effort) and sink failures are logged, never retried.
//! No ordering is guaranteed relative to anything but the channel itself.
//!
//! Safety: each `EventDispatcher` spawns exactly one thread that is shut
//! down when the dispatcher is dropped; in-flight sink calls finish or are
//! abandoned with the process.

use crossbeam_channel as xch;

use chrono::{NaiveDate, NaiveDateTime};

use crate::andon::AndonCategory;
use crate::sink::{AndonAckEvent, AndonEvent, CycleEvent, EventSink, KpiRef, SequenceMeta};
use crate::timer::CycleClass;

/// Queue depth before events are dropped.
const QUEUE_DEPTH: usize = 64;

/// Engine-side record of one discrete event, before sequence/KPI metadata is
/// attached by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRecord {
    Cycle {
        at: NaiveDateTime,
        duration_seconds: i64,
        classification: CycleClass,
        parts_per_cycle: u32,
    },
    Andon {
        at: NaiveDateTime,
        category: AndonCategory,
    },
    AndonAck {
        at: NaiveDateTime,
    },
    /// Rollover marker: prompts a KPI lookup for the new shift.
    ShiftStarted {
        shift: &'static str,
        date: NaiveDate,
    },
}

pub struct EventDispatcher {
    tx: Option<xch::Sender<EventRecord>>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl EventDispatcher {
    pub fn spawn(sink: Box<dyn EventSink + Send>, meta: SequenceMeta) -> Self {
        let (tx, rx) = xch::bounded(QUEUE_DEPTH);

        let join_handle = std::thread::spawn(move || {
            let mut kpi: Option<KpiRef> = None;
            for record in rx.iter() {
                match record {
                    EventRecord::ShiftStarted { shift, date } => {
                        match sink.fetch_current_kpi(&meta.area, shift, date) {
                            Ok(found) => {
                                kpi = found;
                                tracing::debug!(shift, %date, ?kpi, "kpi lookup");
                            }
                            Err(e) => {
                                kpi = None;
                                tracing::warn!(error = %e, "kpi lookup failed");
                            }
                        }
                    }
                    EventRecord::Cycle {
                        at,
                        duration_seconds,
                        classification,
                        parts_per_cycle,
                    } => {
                        let event = CycleEvent {
                            at,
                            duration_seconds,
                            classification,
                            parts_per_cycle,
                            meta: meta.clone(),
                            kpi,
                        };
                        if let Err(e) = sink.record_cycle(&event) {
                            tracing::warn!(error = %e, "cycle event not persisted");
                        }
                    }
                    EventRecord::Andon { at, category } => {
                        let event = AndonEvent {
                            at,
                            category,
                            meta: meta.clone(),
                            kpi,
                        };
                        if let Err(e) = sink.record_andon(&event) {
                            tracing::warn!(error = %e, "andon event not persisted");
                        }
                    }
                    EventRecord::AndonAck { at } => {
                        let event = AndonAckEvent {
                            at,
                            meta: meta.clone(),
                            kpi,
                        };
                        if let Err(e) = sink.record_andon_ack(&event) {
                            tracing::warn!(error = %e, "andon ack not persisted");
                        }
                    }
                }
            }
            tracing::trace!("event dispatcher thread exiting");
        });

        Self {
            tx: Some(tx),
            join_handle: Some(join_handle),
        }
    }

    /// Enqueue without blocking the tick loop; a full or closed queue drops
    /// the event.
    pub fn dispatch(&self, record: EventRecord) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.try_send(record) {
            tracing::warn!(error = %e, "event dropped");
        }
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain accepted records and
        // exit; whatever is mid-flight at process end is abandoned.
        drop(self.tx.take());
        if let Some(handle) = self.join_handle.take() {
            if let Err(e) = handle.join() {
                tracing::warn!(?e, "event dispatcher thread panicked during shutdown");
            }
        }
    }
}
