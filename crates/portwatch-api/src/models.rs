// Wire types for the console's telemetry endpoints.
//
// These mirror the JSON the console emits, quirks included: stat keys
// are hyphenated, `interfacetype` is one word, and any field may be
// absent or an empty string. Normalization into canonical records
// happens in `portwatch-core`, not here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One switch port as returned by `GET /api/switch/{id}/ports`.
///
/// `port_number` and `interfacetype` may be missing or empty; `stats`
/// may be absent entirely on ports the switch has not reported yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPortRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_number: Option<String>,

    #[serde(
        default,
        rename = "interfacetype",
        skip_serializing_if = "Option::is_none"
    )]
    pub interface_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<RawPortStats>,

    /// Fields the console sends that we don't model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Raw per-port counters. Each field may be a JSON number or string,
/// absent, or an empty string — the console is not consistent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPortStats {
    #[serde(default, rename = "tx-bytes", skip_serializing_if = "Option::is_none")]
    pub tx_bytes: Option<Value>,
    #[serde(default, rename = "rx-bytes", skip_serializing_if = "Option::is_none")]
    pub rx_bytes: Option<Value>,
    #[serde(default, rename = "tx-packets", skip_serializing_if = "Option::is_none")]
    pub tx_packets: Option<Value>,
    #[serde(default, rename = "rx-packets", skip_serializing_if = "Option::is_none")]
    pub rx_packets: Option<Value>,
    #[serde(default, rename = "tx-dropped", skip_serializing_if = "Option::is_none")]
    pub tx_dropped: Option<Value>,
    #[serde(default, rename = "rx-dropped", skip_serializing_if = "Option::is_none")]
    pub rx_dropped: Option<Value>,
    #[serde(default, rename = "tx-errors", skip_serializing_if = "Option::is_none")]
    pub tx_errors: Option<Value>,
    #[serde(default, rename = "rx-errors", skip_serializing_if = "Option::is_none")]
    pub rx_errors: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collisions: Option<Value>,
    #[serde(
        default,
        rename = "rx-frame-error",
        skip_serializing_if = "Option::is_none"
    )]
    pub rx_frame_error: Option<Value>,
    #[serde(
        default,
        rename = "rx-over-error",
        skip_serializing_if = "Option::is_none"
    )]
    pub rx_over_error: Option<Value>,
    #[serde(
        default,
        rename = "rx-crc-error",
        skip_serializing_if = "Option::is_none"
    )]
    pub rx_crc_error: Option<Value>,
}

/// One flow touching a port, as returned by
/// `GET /api/switch/{id}/flows?port={p}&inventory={bool}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFlow {
    /// Requested maximum bandwidth in the controller's native scale (kbit).
    #[serde(default)]
    pub maximum_bandwidth: f64,

    /// Fields the console sends that we don't model (flow id, endpoints, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl RawFlow {
    /// Convenience constructor used widely in tests.
    pub fn with_bandwidth(maximum_bandwidth: f64) -> Self {
        Self {
            maximum_bandwidth,
            extra: serde_json::Map::new(),
        }
    }
}
