use thiserror::Error;

/// Numeric entry confirmation failures. Recovered locally: the buffer is
/// cleared, the operator re-prompted; never propagated out of the engine.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EntryError {
    #[error("value outside allowed range {min}..={max}")]
    OutOfRange { min: u32, max: u32 },
    #[error("empty entry buffer")]
    Empty,
}

/// Malformed persisted schedules. Surfaces when a schedule is resolved at
/// startup or shift rollover; owned by the configuration path, never raised
/// from inside the tick loop.
#[derive(Debug, Error, Clone)]
pub enum ScheduleError {
    #[error("schedule line: {0}")]
    Line(String),
    #[error("block {block}: start {start} is after end {end}")]
    Inverted {
        block: usize,
        start: String,
        end: String,
    },
    #[error("blocks {0} and {1} overlap")]
    Overlap(usize, usize),
    #[error("unknown shift name: {0}")]
    UnknownShift(String),
}

/// Persistence collaborator failures. Logged by the dispatcher and absorbed;
/// they never alter timer state or block further ticks.
#[derive(Debug, Error, Clone)]
pub enum SinkError {
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
    #[error("io error: {0}")]
    Io(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
