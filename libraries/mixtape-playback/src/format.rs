//! "m:ss" time formatting for track clocks

/// Format a playback time in seconds as `minutes:seconds`
///
/// The value is rounded to the nearest whole second first, so `3599.6`
/// renders as `"60:00"`. Seconds are always two digits, minutes are never
/// padded. Negative or non-finite values (unknown time) render as `"0:00"`.
///
/// ```
/// use mixtape_playback::format_time;
///
/// assert_eq!(format_time(125.0), "2:05");
/// assert_eq!(format_time(3599.6), "60:00");
/// ```
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };

    format!("{}:{:02}", total / 60, total % 60)
}
