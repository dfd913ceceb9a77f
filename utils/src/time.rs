//! Time formatting helpers.

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// "in 2d 0h", "3h 5m ago" or "now", for `target` seen from `now` (both in
/// seconds).
pub fn format_relative(target: u64, now: u64) -> String {
    match target.cmp(&now) {
        std::cmp::Ordering::Greater => format!("in {}", format_duration(target - now)),
        std::cmp::Ordering::Less => format!("{} ago", format_duration(now - target)),
        std::cmp::Ordering::Equal => "now".to_string(),
    }
}
