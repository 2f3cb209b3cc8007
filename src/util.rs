/// Format a second count as m:ss for the session timer.
pub fn format_session_time(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Render a millisecond duration as a compact seconds label ("4s", "1.5s").
pub fn secs_label(ms: u64) -> String {
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}
