//! Human readable byte counts.

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Render a byte count with a 1024-based unit, rounded to two decimals.
///
/// Zero renders as `0B`; everything else as `<value> <unit>` where the value
/// always carries at least one decimal, e.g. `500.0 B` or `1.5 KB`.
pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0B".to_string();
    }

    let mut unit = 0;
    let mut scale: u64 = 1;
    while unit + 1 < UNITS.len() && size_bytes / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }

    let value = (size_bytes as f64 / scale as f64 * 100.0).round() / 100.0;
    if value.fract() == 0.0 {
        format!("{:.1} {}", value, UNITS[unit])
    } else {
        format!("{} {}", value, UNITS[unit])
    }
}
