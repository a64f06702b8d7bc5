#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core pacing logic (IO-agnostic).
//!
//! This crate provides the production cycle timing and schedule engine. All
//! IO goes through seams: `takt_traits::Clock`, `takt_traits::SettingsStore`,
//! and the `sink::EventSink` persistence collaborator.
//!
//! ## Architecture
//!
//! - **Schedule**: shift selection, calendar anchoring, block boundaries and
//!   nudging (`schedule` module)
//! - **Timer**: countdown/classification state machine (`timer` module)
//! - **Pace**: cycle pace parameters and catch-up arithmetic (`pace` module)
//! - **Andon**: per-category abnormality tallies (`andon` module)
//! - **Entry**: bounded digit-buffer entry with confirm (`entry` module)
//! - **Engine**: one owning instance wiring the above, driven by a single
//!   recurring tick plus synchronous operator commands (`engine`, `runner`)
//! - **Dispatch**: fire-and-forget background persistence (`dispatch`)
//!
//! All engine arithmetic is integer seconds against the station wall clock;
//! countdown values go negative without bound to accumulate overdue time.

pub mod andon;
pub mod conversions;
pub mod dispatch;
pub mod engine;
pub mod entry;
pub mod error;
pub mod mocks;
pub mod pace;
pub mod runner;
pub mod schedule;
pub mod shift_log;
pub mod sink;
pub mod snapshot;
pub mod timer;
pub mod util;

pub use engine::{Command, EngineCfg, EntryField, PacingEngine};
pub use schedule::{select_shift, BoundaryEdge, NudgeDir, ShiftName, ShiftSchedule};
pub use snapshot::{DisplayPhase, ScreenState, Snapshot};
pub use timer::{BlockTally, CycleClass};
