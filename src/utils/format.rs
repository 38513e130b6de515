//! Clock display formatting

/// Format a number of seconds as `HH:MM:SS`.
///
/// Each field is zero-padded to two digits. Hours are not wrapped, so large
/// values simply widen the first field.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
