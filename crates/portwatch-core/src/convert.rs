// Unit conversion helpers for display values.

/// Convert a raw byte counter into a display-ready Mbps rate string.
///
/// Pure and total: any finite input yields the same output every time.
pub fn bytes_to_mbps(bytes: f64) -> String {
    let mbps = bytes * 8.0 / 1_000_000.0;
    format!("{mbps:.3}")
}
