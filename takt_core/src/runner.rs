//! Tick-loop orchestration: drain operator commands, tick the engine, hand
//! each snapshot to the view.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel as xch;

use crate::engine::{Command, PacingEngine};
use crate::snapshot::Snapshot;

/// Run until `shutdown` is raised. Commands execute synchronously between
/// ticks on this thread; the callback sees every snapshot and may poll the
/// engine (e.g. for the completed-shift row) between ticks.
pub fn run<F>(
    engine: &mut PacingEngine,
    commands: &xch::Receiver<Command>,
    shutdown: &AtomicBool,
    mut on_tick: F,
) where
    F: FnMut(&Snapshot, &mut PacingEngine),
{
    let period = engine.tick_period();
    let clock = engine.clock();
    tracing::info!(period_ms = period.as_millis() as u64, "tick loop start");
    while !shutdown.load(Ordering::Relaxed) {
        for cmd in commands.try_iter() {
            engine.handle(cmd);
        }
        let snapshot = engine.tick();
        on_tick(&snapshot, engine);
        clock.sleep(period);
    }
    tracing::info!("tick loop stopped");
}
