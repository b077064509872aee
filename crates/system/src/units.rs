const MIB: f64 = (1u64 << 20) as f64;

/// Format a byte counter in binary megabytes (e.g. `"12.50 MB"`).
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / MIB)
}

/// Percentage of `part` in `total`; `None` when `total` is zero.
pub fn percent_of(part: u64, total: u64) -> Option<f32> {
    if total == 0 {
        return None;
    }
    Some((part as f64 / total as f64 * 100.0) as f32)
}
