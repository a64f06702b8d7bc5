//! Operator command lines read from stdin, one command per line.
//!
//! The vocabulary mirrors the buttons on the shop-floor display:
//!
//! ```text
//! c | cycle                  pedal press
//! adjust <early|on_target|late>
//! andon <quality|material|equipment|safety|other>
//! ack                        acknowledge all outstanding andons
//! pct <digits>               set target seconds per part
//! parts <digits>             set parts per cycle
//! catchup on|off             toggle catch-up mode
//! catchup pace <seconds>     set the catch-up pace
//! nudge <1-4> <start|end> <up|down>
//! save [once]                persist the adjusted schedule
//! quit | exit
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

use takt_core::andon::AndonCategory;
use takt_core::engine::{Command, EntryField};
use takt_core::schedule::{BoundaryEdge, NudgeDir};
use takt_core::timer::CycleClass;

/// Parse one input line into engine commands. Numeric entries expand into
/// the digit-by-digit keypad sequence plus a confirm.
pub fn parse_line(line: &str) -> Vec<Command> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Vec::new();
    };
    match head {
        "c" | "cycle" => vec![Command::Cycle],
        "adjust" => words
            .next()
            .and_then(CycleClass::from_key)
            .map(|class| vec![Command::AdjustTally(class)])
            .unwrap_or_default(),
        "andon" => words
            .next()
            .and_then(AndonCategory::from_key)
            .map(|category| vec![Command::Andon(category)])
            .unwrap_or_default(),
        "ack" | "respond" => vec![Command::AcknowledgeAndon],
        "pct" => keypad(EntryField::TargetSeconds, words.next()),
        "parts" => keypad(EntryField::PartsPerCycle, words.next()),
        "catchup" => match (words.next(), words.next()) {
            (Some("on"), None) => vec![Command::CatchUp(true)],
            (Some("off"), None) => vec![Command::CatchUp(false)],
            (Some("pace"), Some(value)) => value
                .parse()
                .map(|pace| vec![Command::CatchUpPace(pace)])
                .unwrap_or_default(),
            _ => Vec::new(),
        },
        "nudge" => parse_nudge(&mut words),
        "save" => match words.next() {
            None => vec![Command::PersistScheduleDefault],
            Some("once") => vec![Command::PersistScheduleOnce],
            Some(_) => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn keypad(field: EntryField, digits: Option<&str>) -> Vec<Command> {
    let Some(digits) = digits else {
        return Vec::new();
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Vec::new();
    }
    let mut out: Vec<Command> = digits
        .bytes()
        .map(|b| Command::Digit(field, b - b'0'))
        .collect();
    out.push(Command::Confirm(field));
    out
}

fn parse_nudge<'a>(words: &mut impl Iterator<Item = &'a str>) -> Vec<Command> {
    let (Some(block), Some(edge), Some(dir)) = (words.next(), words.next(), words.next()) else {
        return Vec::new();
    };
    let Ok(block) = block.parse::<usize>() else {
        return Vec::new();
    };
    if !(1..=4).contains(&block) {
        return Vec::new();
    }
    let edge = match edge {
        "start" => BoundaryEdge::Start,
        "end" => BoundaryEdge::End,
        _ => return Vec::new(),
    };
    let dir = match dir {
        "up" | "later" => NudgeDir::Later,
        "down" | "earlier" => NudgeDir::Earlier,
        _ => return Vec::new(),
    };
    vec![Command::Nudge { block, edge, dir }]
}

/// Forward stdin lines into the command channel until EOF or shutdown.
/// `quit`/`exit` raise the shutdown flag for the tick loop.
pub fn spawn_stdin_reader(tx: Sender<Command>, shutdown: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        use std::io::BufRead;
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            let Ok(line) = line else { break };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed == "quit" || trimmed == "exit" {
                shutdown.store(true, Ordering::Relaxed);
                break;
            }
            let commands = parse_line(trimmed);
            if commands.is_empty() {
                tracing::warn!(input = trimmed, "unrecognized command");
                continue;
            }
            for cmd in commands {
                if tx.send(cmd).is_err() {
                    return;
                }
            }
        }
        tracing::debug!("stdin reader exiting");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_basic_vocabulary() {
        assert_eq!(parse_line("c"), vec![Command::Cycle]);
        assert_eq!(parse_line("ack"), vec![Command::AcknowledgeAndon]);
        assert_eq!(
            parse_line("andon quality"),
            vec![Command::Andon(AndonCategory::Quality)]
        );
        assert_eq!(
            parse_line("adjust late"),
            vec![Command::AdjustTally(CycleClass::Late)]
        );
        assert_eq!(parse_line("catchup on"), vec![Command::CatchUp(true)]);
        assert_eq!(parse_line("catchup pace 25"), vec![Command::CatchUpPace(25)]);
        assert_eq!(parse_line("save once"), vec![Command::PersistScheduleOnce]);
    }

    #[test]
    fn keypad_lines_expand_into_digits_plus_confirm() {
        assert_eq!(
            parse_line("pct 45"),
            vec![
                Command::Digit(EntryField::TargetSeconds, 4),
                Command::Digit(EntryField::TargetSeconds, 5),
                Command::Confirm(EntryField::TargetSeconds),
            ]
        );
        assert_eq!(
            parse_line("parts 3"),
            vec![
                Command::Digit(EntryField::PartsPerCycle, 3),
                Command::Confirm(EntryField::PartsPerCycle),
            ]
        );
    }

    #[test]
    fn nudge_lines_name_block_edge_and_direction() {
        assert_eq!(
            parse_line("nudge 2 start up"),
            vec![Command::Nudge {
                block: 2,
                edge: BoundaryEdge::Start,
                dir: NudgeDir::Later,
            }]
        );
        assert!(parse_line("nudge 5 start up").is_empty());
        assert!(parse_line("nudge 2 middle up").is_empty());
    }

    #[test]
    fn garbage_lines_parse_to_nothing() {
        assert!(parse_line("").is_empty());
        assert!(parse_line("bogus").is_empty());
        assert!(parse_line("pct 4x5").is_empty());
        assert!(parse_line("andon lunch").is_empty());
    }
}
