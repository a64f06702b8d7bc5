//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "takt", version, about = "Shop-floor pacing timer")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/takt.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pacing display loop
    Run {
        /// Emit one JSON snapshot line per tick instead of a status line
        #[arg(long, action = ArgAction::SetTrue)]
        snapshots: bool,

        /// Stop after this many ticks (0 = run until interrupted)
        #[arg(long, value_name = "N", default_value_t = 0)]
        ticks: u64,
    },
    /// Validate the config and print today's resolved schedule
    SelfCheck,
    /// Print the last recorded end-of-shift summaries
    History {
        /// How many shifts to show
        #[arg(long, default_value_t = 3)]
        shifts: usize,
    },
    /// Write a fresh default config file at --config
    Init,
}
