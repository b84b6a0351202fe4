use {
    chrono::{Local, NaiveDateTime},
    std::time::{SystemTime, UNIX_EPOCH},
};

/// Format used for human facing timestamps (status endpoint, overlay).
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local wall-clock time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Format a local time as `YYYY-MM-DD HH:MM:SS`.
pub fn format_display(at: NaiveDateTime) -> String {
    at.format(DISPLAY_FORMAT).to_string()
}

/// Whole seconds since the Unix epoch. Times before the epoch map to 0.
pub fn unix_seconds(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
