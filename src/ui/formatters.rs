use chrono::{DateTime, Local};
use std::time::SystemTime;

/// Format file size in human-readable format (B, KB, MB, GB)
pub fn format_size(size: u64) -> String {
    humansize::format_size(size, humansize::WINDOWS)
}

/// Format timestamp in human-readable format (YYYY-MM-DD HH:MM:SS)
pub fn format_time(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    format_datetime(&datetime)
}

pub fn format_datetime(datetime: &DateTime<Local>) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}
