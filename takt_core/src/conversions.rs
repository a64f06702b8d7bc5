//! From impls mapping `takt_config` schema types into core types.

use crate::engine::EngineCfg;
use crate::sink::SequenceMeta;

impl From<&takt_config::EngineCfg> for EngineCfg {
    fn from(cfg: &takt_config::EngineCfg) -> Self {
        Self {
            tick_ms: cfg.tick_ms,
            tolerance_window: i64::from(cfg.tolerance_window),
            debounce_seconds: i64::from(cfg.debounce_seconds),
            nudge_minutes: cfg.nudge_minutes,
            parts_per_cycle_max: cfg.parts_per_cycle_max,
        }
    }
}

impl From<&takt_config::Data> for SequenceMeta {
    fn from(data: &takt_config::Data) -> Self {
        Self {
            area: data.area.clone().unwrap_or_default(),
            sequence: data.sequence.clone().unwrap_or_default(),
            sequence_num: data.sequence_num,
        }
    }
}
