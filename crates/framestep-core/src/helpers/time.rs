// crates/framestep-core/src/helpers/time.rs
//
// Shared time-formatting utilities used by the worker's log lines and by
// frontends rendering frame counters.

/// Format a position in seconds as `MM:SS:FF` (minutes, seconds, frames at
/// the given rate). Used where frame-level precision matters.
///
/// ```
/// use framestep_core::helpers::time::format_timecode;
/// assert_eq!(format_timecode(0.0, 30.0),  "00:00:00");
/// assert_eq!(format_timecode(61.5, 30.0), "01:01:15");
/// assert_eq!(format_timecode(2.5, 24.0),  "00:02:12");
/// ```
pub fn format_timecode(s: f64, fps: f64) -> String {
    let fps = fps.max(1.0);
    let m   = (s / 60.0) as u32;
    let sc  = (s % 60.0) as u32;
    let fr  = ((s * fps) as u64 % fps as u64) as u32;
    format!("{m:02}:{sc:02}:{fr:02}")
}

/// Format a duration in seconds as a compact human-readable string.
///
/// ```
/// use framestep_core::helpers::time::format_duration;
/// assert_eq!(format_duration(4.2),    "4.2s");
/// assert_eq!(format_duration(187.0),  "3:07");
/// assert_eq!(format_duration(3875.0), "1:04:35");
/// ```
pub fn format_duration(secs: f64) -> String {
    if secs >= 3600.0 {
        format!(
            "{}:{:02}:{:02}",
            secs as u64 / 3600,
            (secs as u64 % 3600) / 60,
            secs as u64 % 60,
        )
    } else if secs >= 60.0 {
        format!("{}:{:02}", secs as u64 / 60, secs as u64 % 60)
    } else {
        format!("{secs:.1}s")
    }
}
