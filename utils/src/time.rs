//! Human-readable renderings of countdowns and simulated delays.

/// Render a countdown in seconds as `"45s"`, `"2m 05s"`, or `"1h 02m"`.
pub fn format_duration(secs: u64) -> String {
    let (hours, minutes, seconds) = (secs / 3_600, secs / 60 % 60, secs % 60);
    match (hours, minutes) {
        (0, 0) => format!("{seconds}s"),
        (0, m) => format!("{m}m {seconds:02}s"),
        (h, m) => format!("{h}h {m:02}m"),
    }
}

/// Render a delay in milliseconds, switching to seconds with one decimal
/// place from 1000ms up: `"850ms"`, `"3s"`, `"1.5s"`.
pub fn format_millis(ms: u64) -> String {
    if ms < 1_000 {
        return format!("{ms}ms");
    }
    let tenths = ms / 100;
    match tenths % 10 {
        0 => format!("{}s", tenths / 10),
        d => format!("{}.{d}s", tenths / 10),
    }
}
