//! takt: operator pacing display, terminal edition.
//!
//! Loads the station config, wires the engine to the local event sink, and
//! drives the tick loop. Operator commands arrive as stdin lines; the view
//! is a status line per state change (or JSON lines for piping).

mod cli;
mod commands;
mod sink_jsonl;
mod view;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use eyre::WrapErr;

use cli::{Cli, Commands, FILE_GUARD};
use takt_config::{Settings, TomlSettings};
use takt_core::dispatch::EventDispatcher;
use takt_core::engine::{EngineCfg, PacingEngine};
use takt_core::runner;
use takt_core::sink::SequenceMeta;
use takt_traits::{Clock, SystemClock};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if matches!(cli.cmd, Commands::Init) {
        init_tracing(&cli, &takt_config::Logging::default())?;
        let store = TomlSettings::new(&cli.config);
        store
            .write_default()
            .wrap_err_with(|| format!("writing {}", cli.config.display()))?;
        println!("wrote {}", store.path().display());
        return Ok(());
    }

    let store = TomlSettings::new(&cli.config);
    let settings = store
        .load()
        .wrap_err_with(|| format!("loading config {}", cli.config.display()))?;
    init_tracing(&cli, &settings.logging)?;

    match cli.cmd {
        Commands::SelfCheck => self_check(&store, &settings),
        Commands::History { shifts } => history(&settings, shifts),
        Commands::Run { snapshots, ticks } => run(settings, store, snapshots, ticks),
        Commands::Init => Ok(()),
    }
}

fn init_tracing(cli: &Cli, logging: &takt_config::Logging) -> eyre::Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter, Layer};

    let level = logging.level.as_deref().unwrap_or(&cli.log_level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console = if cli.json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    let file_layer = logging.file.as_ref().map(|file| {
        let path = std::path::Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let name = path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| "takt.log".into());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer().json().with_ansi(false).with_writer(writer)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| eyre::eyre!("installing tracing subscriber: {e}"))?;
    Ok(())
}

/// Validate the config and print today's resolved schedule.
fn self_check(store: &TomlSettings, settings: &Settings) -> eyre::Result<()> {
    let now = SystemClock::new().now();
    let schedule = takt_core::schedule::resolve_schedule(store, now)?;
    println!("config ok: {}", store.path().display());
    println!(
        "pace: {}s/part x {} part(s)",
        settings.pacing.target_seconds_per_part, settings.pacing.parts_per_cycle
    );
    println!(
        "shift: {} ({} available seconds)",
        schedule.shift(),
        schedule.total_available_seconds()
    );
    for block in 1..=4 {
        println!(
            "  block {}: {} -> {} ({}s)",
            block,
            schedule.block_start(block).format("%I:%M %p"),
            schedule.block_end(block).format("%I:%M %p"),
            schedule.block_available_seconds(block)
        );
    }
    Ok(())
}

fn history(settings: &Settings, shifts: usize) -> eyre::Result<()> {
    let path = std::path::Path::new(&settings.data.shift_log);
    let rows = takt_core::shift_log::last_rows(path, shifts)?;
    if rows.is_empty() {
        println!("no shift history recorded yet");
        return Ok(());
    }
    for row in rows {
        println!(
            "{} {:>5}: {} cycles / {} expected, {} andon(s)",
            row.date, row.shift, row.cycles, row.expected_cycles, row.andons
        );
    }
    Ok(())
}

fn run(settings: Settings, store: TomlSettings, snapshots: bool, ticks: u64) -> eyre::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || shutdown.store(true, Ordering::Relaxed))
            .wrap_err("installing Ctrl-C handler")?;
    }

    let meta = SequenceMeta::from(&settings.data);
    let sink = sink_jsonl::JsonlSink::new(&settings.data.local_log);
    let dispatcher = EventDispatcher::spawn(Box::new(sink), meta);

    let cfg = EngineCfg::from(&settings.engine);
    let mut engine = PacingEngine::new(
        cfg,
        Arc::new(SystemClock::new()),
        Box::new(store),
        Some(dispatcher),
    )?;

    let (tx, rx) = crossbeam_channel::bounded(32);
    commands::spawn_stdin_reader(tx, Arc::clone(&shutdown));

    let shift_log_path = std::path::PathBuf::from(&settings.data.shift_log);
    let mut view = view::View::new(snapshots);
    let mut remaining = ticks;
    let stop = Arc::clone(&shutdown);
    runner::run(&mut engine, &rx, shutdown.as_ref(), |snapshot, engine| {
        view.render(snapshot);
        if let Some(row) = engine.take_completed_shift() {
            if let Err(e) = takt_core::shift_log::append_row(&shift_log_path, &row) {
                tracing::warn!(error = %e, "shift log append failed");
            }
        }
        if ticks > 0 {
            remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                stop.store(true, Ordering::Relaxed);
            }
        }
    });
    tracing::info!("shutdown complete");
    Ok(())
}
