//! Render snapshots as terminal status lines or JSON lines.

use takt_core::snapshot::{DisplayPhase, ScreenState, Snapshot};

pub struct View {
    json: bool,
    last_line: String,
}

impl View {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            last_line: String::new(),
        }
    }

    /// Print only when the rendered line changes, to keep the terminal
    /// readable at 20 ticks per second. JSON mode prints every distinct
    /// snapshot for piping.
    pub fn render(&mut self, snapshot: &Snapshot) {
        let line = if self.json {
            serde_json::to_string(snapshot).unwrap_or_default()
        } else {
            status_line(snapshot)
        };
        if line != self.last_line {
            println!("{line}");
            self.last_line = line;
        }
    }
}

fn screen_tag(screen: ScreenState) -> &'static str {
    match screen {
        ScreenState::Idle => "idle",
        ScreenState::Neutral => "  ok",
        ScreenState::OnTarget => "  on",
        ScreenState::Overdue => "LATE",
    }
}

fn status_line(snapshot: &Snapshot) -> String {
    match snapshot.phase {
        DisplayPhase::PreShift => format!(
            "[{}] {} | andons {}",
            snapshot.clock_label, snapshot.countdown, snapshot.andon_label
        ),
        DisplayPhase::Running => {
            let catch_up = if snapshot.catch_up_mode {
                format!(" | catch-up {}s/part -> {}", snapshot.catch_up_pace, snapshot.catch_up_estimate)
            } else {
                String::new()
            };
            format!(
                "[{}] {:>7} {} | {} | early {} on {} late {} | andons {}{}",
                snapshot.clock_label,
                snapshot.countdown,
                screen_tag(snapshot.screen),
                snapshot.ahead_label,
                snapshot.tally.early,
                snapshot.tally.on_target,
                snapshot.tally.late,
                snapshot.andon_label,
                catch_up,
            )
        }
        DisplayPhase::Break => format!(
            "[{}] BREAK {} ({} shift) | andons {}",
            snapshot.clock_label, snapshot.countdown, snapshot.shift, snapshot.andon_label
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use takt_core::timer::BlockTally;

    fn snapshot(phase: DisplayPhase, screen: ScreenState) -> Snapshot {
        Snapshot {
            shift: "Day".to_string(),
            block: 1,
            phase,
            countdown: ":25".to_string(),
            screen,
            ahead_label: "Ahead: 1 (3/2)".to_string(),
            tally: BlockTally {
                early: 1,
                on_target: 2,
                late: 0,
            },
            andon_label: "0".to_string(),
            history: vec![],
            clock_label: "08:10:25 AM".to_string(),
            target_seconds_per_part: 30,
            parts_per_cycle: 1,
            target_entry: String::new(),
            partsper_entry: String::new(),
            catch_up_mode: false,
            catch_up_available: false,
            catch_up_pace: 30,
            catch_up_estimate: "infinite".to_string(),
            last_drift_seconds: 0,
            block_cycles_label: "Block Cycles: 3/210".to_string(),
            shift_cycles_label: "Shift Cycles: 3/870".to_string(),
            schedule_rows: vec![],
            total_available_seconds: 26100,
            schedule_dirty: false,
            shift_summary: None,
        }
    }

    #[test]
    fn running_line_carries_tallies_and_pace_state() {
        let line = status_line(&snapshot(DisplayPhase::Running, ScreenState::Neutral));
        assert!(line.contains("Ahead: 1 (3/2)"));
        assert!(line.contains("early 1 on 2 late 0"));
    }

    #[test]
    fn deduplicates_identical_lines() {
        let mut view = View::new(false);
        let snap = snapshot(DisplayPhase::Running, ScreenState::Neutral);
        view.render(&snap);
        let first = view.last_line.clone();
        view.render(&snap);
        assert_eq!(view.last_line, first);
    }
}
