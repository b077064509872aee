/// Format a duration in seconds as `H:MM:SS`.
///
/// Hours are not padded and have no upper bound: `90061` → `"25:01:01"`.
pub fn format_duration(seconds: u64) -> String {
    let (mins, secs) = (seconds / 60, seconds % 60);
    let (hours, mins) = (mins / 60, mins % 60);
    format!("{hours}:{mins:02}:{secs:02}")
}
