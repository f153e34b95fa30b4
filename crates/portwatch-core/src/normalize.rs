// ── Stat normalization ──
//
// Maps raw wire records (fields absent, empty, number-or-string) into
// canonical `PortRecord`s. Pure functions only: same input, same
// output, no clock, no I/O.

use serde_json::Value;

use portwatch_api::models::{RawPortRecord, RawPortStats};

use crate::convert;
use crate::model::{PortNumber, PortRecord, PortStats, StatValue};

/// Normalize one raw port record.
///
/// Policy, field by field: absent or empty-string source values become
/// [`StatValue::Absent`]; byte counters additionally pass through the
/// bytes→Mbps conversion when present; all other counters keep their
/// source value as a string. An absent `stats` object is treated as
/// every field being absent.
pub fn normalize(raw: &RawPortRecord) -> PortRecord {
    let stats = raw
        .stats
        .as_ref()
        .map_or_else(PortStats::default, normalize_stats);

    PortRecord {
        port_number: PortNumber::from_raw(raw.port_number.as_deref()),
        interface_type: text_field(raw.interface_type.as_deref()),
        stats,
    }
}

fn normalize_stats(raw: &RawPortStats) -> PortStats {
    PortStats {
        tx_bytes: byte_counter(raw.tx_bytes.as_ref()),
        rx_bytes: byte_counter(raw.rx_bytes.as_ref()),
        tx_packets: counter(raw.tx_packets.as_ref()),
        rx_packets: counter(raw.rx_packets.as_ref()),
        tx_dropped: counter(raw.tx_dropped.as_ref()),
        rx_dropped: counter(raw.rx_dropped.as_ref()),
        tx_errors: counter(raw.tx_errors.as_ref()),
        rx_errors: counter(raw.rx_errors.as_ref()),
        collisions: counter(raw.collisions.as_ref()),
        rx_frame_error: counter(raw.rx_frame_error.as_ref()),
        rx_over_error: counter(raw.rx_over_error.as_ref()),
        rx_crc_error: counter(raw.rx_crc_error.as_ref()),
    }
}

/// An optional free-text field: absent or empty means absent.
fn text_field(raw: Option<&str>) -> StatValue {
    match raw {
        Some(s) if !s.is_empty() => StatValue::Present(s.to_owned()),
        _ => StatValue::Absent,
    }
}

/// A plain counter: kept as its string form when present.
fn counter(raw: Option<&Value>) -> StatValue {
    match raw {
        None | Some(Value::Null) => StatValue::Absent,
        Some(Value::String(s)) if s.is_empty() => StatValue::Absent,
        Some(Value::String(s)) => StatValue::Present(s.clone()),
        Some(v) => StatValue::Present(v.to_string()),
    }
}

/// A byte counter: converted to an Mbps rate string when present and
/// numeric. Non-numeric values pass through untouched rather than
/// turning into garbage arithmetic.
fn byte_counter(raw: Option<&Value>) -> StatValue {
    match counter(raw) {
        StatValue::Present(s) => match s.parse::<f64>() {
            Ok(bytes) => StatValue::Present(convert::bytes_to_mbps(bytes)),
            Err(_) => StatValue::Present(s),
        },
        StatValue::Absent => StatValue::Absent,
    }
}
