// Focused tests for the countdown formatting contract.
use rstest::rstest;
use takt_core::util::format_duration;

#[rstest]
#[case(0, false, ":00")]
#[case(5, false, ":05")]
#[case(59, false, ":59")]
#[case(65, false, "1:05")]
#[case(-65, false, "-1:05")]
#[case(600, false, "10:00")]
#[case(3600, false, "1h:00")]
#[case(3661, false, "1h:01")]
#[case(5, true, "+:05")]
#[case(-5, true, "-:05")]
#[case(65, true, "+1:05")]
fn formats_signed_second_counts(#[case] seconds: i64, #[case] force_sign: bool, #[case] want: &str) {
    assert_eq!(format_duration(seconds, force_sign), want);
}

// The hour branch drops both seconds and the sign. This mirrors the deployed
// display behavior exactly and is locked in on purpose.
#[rstest]
#[case(3661, "1h:01")]
#[case(-3661, "1h:01")]
#[case(7325, "2h:02")]
fn hour_branch_truncates_seconds_and_sign(#[case] seconds: i64, #[case] want: &str) {
    assert_eq!(format_duration(seconds, false), want);
    assert_eq!(format_duration(seconds, true), want);
}
