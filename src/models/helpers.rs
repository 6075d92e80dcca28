/// Percentage of `current` in `total`, or 0 when `total` is not positive.
pub fn usage(current: f64, total: f64) -> f64 {
    if total > 0.0 {
        100.0 * current / total
    } else {
        0.0
    }
}

/// Numeric suffix of the last `.`-separated segment of a metric/query path,
/// e.g. `rule.3.command12` yields 12. A segment without digits yields 0.
pub fn parse_int_from_query_path_tail(path: &str) -> Option<u64> {
    let tail = path.rsplit('.').next().unwrap_or(path);
    let digits: String = tail.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse().ok()
}
