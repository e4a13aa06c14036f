//! Human-readable number formatting for the text table.

use std::fs;
use std::path::Path;

/// Narrowest pid column, wide enough for the default 32768 pid_max.
pub const MIN_PID_WIDTH: usize = 6;

const UNITS: [(f64, char); 4] = [(1.0, ' '), (1e3, 'k'), (1e6, 'M'), (1e9, 'G')];

/// Formats a fault or swap count into a 7 character cell: six characters of
/// number and a unit suffix (` `, `k`, `M` or `G`). The unit is the smallest
/// one whose rounded value still fits; negative values keep their sign.
pub fn format_count(value: i64) -> String {
    let negative = value < 0;
    let limit: i64 = if negative { 99_999 } else { 999_999 };
    let magnitude = value.unsigned_abs() as f64;

    let (mut scaled, mut unit) = (0, ' ');
    for (divisor, suffix) in UNITS {
        scaled = (magnitude / divisor).round() as i64;
        unit = suffix;
        if scaled <= limit {
            break;
        }
    }

    let scaled = scaled.min(limit);
    format!("{:6}{}", if negative { -scaled } else { scaled }, unit)
}

/// Width of the pid column: the digit count of the kernel's `pid_max`, never
/// less than [`MIN_PID_WIDTH`].
pub fn pid_max_digits(proc_root: &Path) -> usize {
    let path = proc_root.join("sys").join("kernel").join("pid_max");
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(|max| max.to_string().len())
        .unwrap_or(MIN_PID_WIDTH)
        .max(MIN_PID_WIDTH)
}
