//! Human-readable time formatting

/// Format seconds as zero-padded `MM:SS`
///
/// Minutes are not wrapped into hours, so long workouts read e.g. `125:00`.
pub fn format_clock(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
