use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rstest::rstest;
use takt_core::schedule::{
    select_shift, BoundaryEdge, NudgeDir, ScheduleStore, ShiftName, ShiftSchedule,
};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[rstest]
#[case(0, 0, ShiftName::Grave)]
#[case(6, 0, ShiftName::Grave)]
#[case(6, 59, ShiftName::Grave)]
#[case(7, 0, ShiftName::Day)]
#[case(14, 59, ShiftName::Day)]
#[case(15, 0, ShiftName::Swing)]
#[case(22, 59, ShiftName::Swing)]
#[case(23, 0, ShiftName::Grave)]
fn shift_selection_partitions_the_clock(#[case] hour: u32, #[case] min: u32, #[case] want: ShiftName) {
    assert_eq!(select_shift(at(2024, 6, 1, hour, min)), want);
}

fn grave_at(now: NaiveDateTime) -> ShiftSchedule {
    ShiftSchedule::from_lines(
        ShiftName::Grave,
        now,
        "2300, 0100, 0300, 0500",
        "0045, 0245, 0445, 0700",
    )
    .expect("grave schedule anchors")
}

fn day_at(now: NaiveDateTime) -> ShiftSchedule {
    ShiftSchedule::from_lines(
        ShiftName::Day,
        now,
        "0700, 0900, 1100, 1300",
        "0845, 1045, 1245, 1500",
    )
    .expect("day schedule anchors")
}

/// A Grave schedule loaded shortly before 23:00 anchors evening boundaries
/// to today and morning boundaries to tomorrow, fully sorted.
#[rstest]
#[case(at(2024, 6, 1, 22, 45))]
#[case(at(2024, 6, 1, 23, 30))]
fn grave_evening_load_produces_sorted_overnight_schedule(#[case] now: NaiveDateTime) {
    let schedule = grave_at(now);
    assert_eq!(schedule.block_start(1), at(2024, 6, 1, 23, 0));
    for block in 2..=4 {
        assert_eq!(schedule.block_start(block).date(), NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
    }
    assert_eq!(schedule.block_end(4), at(2024, 6, 2, 7, 0));
    for block in 1..4 {
        assert!(schedule.block_start(block) < schedule.block_start(block + 1));
        assert!(schedule.block_end(block) < schedule.block_end(block + 1));
        assert!(schedule.block_end(block) <= schedule.block_start(block + 1));
    }
}

#[test]
fn grave_morning_load_reaches_back_to_yesterday() {
    let schedule = grave_at(at(2024, 6, 2, 5, 0));
    assert_eq!(schedule.block_start(1), at(2024, 6, 1, 23, 0));
    assert_eq!(schedule.block_end(4), at(2024, 6, 2, 7, 0));
}

#[test]
fn totals_and_serialized_lines_round_trip() {
    let schedule = day_at(at(2024, 6, 1, 8, 0));
    // 105 + 105 + 105 + 120 minutes of working time.
    assert_eq!(schedule.total_available_seconds(), (105 + 105 + 105 + 120) * 60);
    assert_eq!(schedule.block_available_seconds(4), 120 * 60);
    assert_eq!(schedule.start_line(), "0700, 0900, 1100, 1300");
    assert_eq!(schedule.end_line(), "0845, 1045, 1245, 1500");
    assert_eq!(schedule.kpi_date(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
}

#[test]
fn elapsed_and_remaining_track_the_current_block() {
    let store = ScheduleStore::new(day_at(at(2024, 6, 1, 8, 0)), 5);
    let now = at(2024, 6, 1, 8, 0);
    assert_eq!(store.block_elapsed_seconds(now), 3600);
    assert_eq!(store.block_remaining_seconds(now), 45 * 60);
}

#[test]
fn start_nudge_clamps_to_its_own_end() {
    let mut store = ScheduleStore::new(day_at(at(2024, 6, 1, 8, 0)), 5);
    // 08:45 end; push the start up past it.
    for _ in 0..30 {
        store.nudge_boundary(1, BoundaryEdge::Start, NudgeDir::Later);
    }
    assert_eq!(store.schedule().block_start(1), store.schedule().block_end(1));
    assert!(store.is_dirty());
}

#[test]
fn start_nudge_cannot_cross_previous_end() {
    let mut store = ScheduleStore::new(day_at(at(2024, 6, 1, 8, 0)), 5);
    // Block 2 starts 09:00, block 1 ends 08:45: three earlier-nudges reach
    // the boundary, the fourth is pushed back.
    for _ in 0..4 {
        store.nudge_boundary(2, BoundaryEdge::Start, NudgeDir::Earlier);
    }
    assert_eq!(store.schedule().block_start(2), at(2024, 6, 1, 8, 45));
}

#[test]
fn end_nudge_cannot_cross_next_start() {
    let mut store = ScheduleStore::new(day_at(at(2024, 6, 1, 8, 0)), 5);
    // Block 1 ends 08:45, block 2 starts 09:00.
    for _ in 0..4 {
        store.nudge_boundary(1, BoundaryEdge::End, NudgeDir::Later);
    }
    assert_eq!(store.schedule().block_end(1), at(2024, 6, 1, 9, 0));
}

#[test]
fn outer_bounds_hold_for_day_shift() {
    let mut store = ScheduleStore::new(day_at(at(2024, 6, 1, 8, 0)), 5);
    store.nudge_boundary(1, BoundaryEdge::Start, NudgeDir::Earlier);
    assert_eq!(store.schedule().block_start(1), at(2024, 6, 1, 7, 0));
    store.nudge_boundary(4, BoundaryEdge::End, NudgeDir::Later);
    assert_eq!(store.schedule().block_end(4), at(2024, 6, 1, 15, 0));
}

#[test]
fn outer_bounds_hold_for_the_wrapped_grave_shift() {
    let mut store = ScheduleStore::new(grave_at(at(2024, 6, 1, 23, 30)), 5);
    store.nudge_boundary(1, BoundaryEdge::Start, NudgeDir::Earlier);
    assert_eq!(store.schedule().block_start(1), at(2024, 6, 1, 23, 0));
    store.nudge_boundary(4, BoundaryEdge::End, NudgeDir::Later);
    assert_eq!(store.schedule().block_end(4), at(2024, 6, 2, 7, 0));
}

fn assert_invariants(store: &ScheduleStore) {
    let s = store.schedule();
    for block in 1..=4 {
        assert!(
            s.block_start(block) <= s.block_end(block),
            "block {block} inverted"
        );
        assert!(s.block_start(block) >= s.open(), "block {block} before open");
        assert!(s.block_end(block) <= s.close(), "block {block} after close");
        if block < 4 {
            assert!(
                s.block_end(block) <= s.block_start(block + 1),
                "blocks {block} and {} overlap",
                block + 1
            );
        }
    }
}

proptest! {
    /// For all bounded nudge sequences, blocks never invert, never overlap,
    /// and stay inside the shift's outer bounds.
    #[test]
    fn nudge_sequences_preserve_schedule_invariants(
        moves in prop::collection::vec((1usize..=4, any::<bool>(), any::<bool>()), 0..60),
        grave in any::<bool>(),
    ) {
        let schedule = if grave {
            grave_at(at(2024, 6, 1, 23, 30))
        } else {
            day_at(at(2024, 6, 1, 8, 0))
        };
        let mut store = ScheduleStore::new(schedule, 5);
        for (block, start_edge, later) in moves {
            let edge = if start_edge { BoundaryEdge::Start } else { BoundaryEdge::End };
            let dir = if later { NudgeDir::Later } else { NudgeDir::Earlier };
            store.nudge_boundary(block, edge, dir);
            assert_invariants(&store);
        }
    }
}
