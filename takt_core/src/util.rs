//! Duration formatting and shared time constants.

/// Seconds in one hour.
pub const SECS_PER_HOUR: u64 = 3_600;
/// Seconds in one minute.
pub const SECS_PER_MIN: u64 = 60;
/// Rolling cycle-history capacity (most recent formatted durations).
pub const HISTORY_LEN: usize = 10;

/// Format a signed second count for the countdown and history displays.
///
/// Returns `":{SS}"` under a minute, `"{M}:{SS}"` under an hour, and
/// `"{H}h:{MM}"` at an hour or more. The hour branch drops seconds and the
/// sign entirely; that truncation is a long-standing display contract and is
/// kept verbatim.
///
/// `force_sign` prefixes `+` on non-negative values in the sub-hour branches.
pub fn format_duration(seconds: i64, force_sign: bool) -> String {
    let sign = if seconds < 0 {
        "-"
    } else if force_sign {
        "+"
    } else {
        ""
    };
    let abs = seconds.unsigned_abs();
    let hours = abs / SECS_PER_HOUR;
    let minutes = (abs % SECS_PER_HOUR) / SECS_PER_MIN;
    let secs = abs % SECS_PER_MIN;
    if hours > 0 {
        format!("{hours}h:{minutes:02}")
    } else if minutes > 0 {
        format!("{sign}{minutes}:{secs:02}")
    } else {
        format!("{sign}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::format_duration;

    #[test]
    fn sub_minute_values_keep_the_colon() {
        assert_eq!(format_duration(0, false), ":00");
        assert_eq!(format_duration(59, false), ":59");
        assert_eq!(format_duration(-5, false), "-:05");
    }

    #[test]
    fn hour_branch_truncates_seconds() {
        // 1h 1m 1s renders without the trailing second.
        assert_eq!(format_duration(3661, false), "1h:01");
        assert_eq!(format_duration(-3661, false), "1h:01");
    }
}
