/// Display formatting for the remaining time
use std::time::Duration;

const HOUR: u64 = 3600;

/// `MM:SS` under an hour, `H:MM:SS` from an hour on.
pub fn format_remaining(remaining: Duration) -> String {
    let total_seconds = remaining.as_secs();
    let hours = total_seconds / HOUR;
    let minutes = (total_seconds % HOUR) / 60;
    let seconds = total_seconds % 60;

    if total_seconds >= HOUR {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
