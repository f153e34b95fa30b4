// Port-side domain types.
//
// "No data" is structural here (`Unassigned`, `Absent`), never a
// sentinel string. The `"-"` placeholder exists only at the display
// boundary: `Display` and `Serialize` emit it, nothing reads it back.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Display placeholder for absent values.
pub const PLACEHOLDER: &str = "-";

// ── SwitchId ────────────────────────────────────────────────────────

/// Opaque switch identifier as the console knows it
/// (e.g. `de:ad:be:ef:00:00:00:01`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwitchId(String);

impl SwitchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SwitchId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ── PortNumber ──────────────────────────────────────────────────────

/// A port's identifier on its switch.
///
/// `Unassigned` marks ports the console reported without a number.
/// Such ports are displayed with the placeholder and are skipped by
/// the per-port flow fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PortNumber {
    Assigned(String),
    Unassigned,
}

impl PortNumber {
    /// Build from a raw wire value: `None` and `""` both mean unassigned.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if !s.is_empty() => Self::Assigned(s.to_owned()),
            _ => Self::Unassigned,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    /// The port number string, if assigned.
    pub fn as_assigned(&self) -> Option<&str> {
        match self {
            Self::Assigned(n) => Some(n),
            Self::Unassigned => None,
        }
    }
}

impl fmt::Display for PortNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assigned(n) => f.write_str(n),
            Self::Unassigned => f.write_str(PLACEHOLDER),
        }
    }
}

impl Serialize for PortNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── StatValue ───────────────────────────────────────────────────────

/// One normalized telemetry field: either a concrete display value or
/// absent. Never an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatValue {
    Present(String),
    Absent,
}

impl StatValue {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// The display form: the value itself, or the placeholder.
    pub fn display(&self) -> &str {
        match self {
            Self::Present(v) => v,
            Self::Absent => PLACEHOLDER,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

impl Serialize for StatValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display())
    }
}

// ── PortStats ───────────────────────────────────────────────────────

/// The full set of per-port counters. Every field is structurally
/// present after normalization — absent source data becomes
/// [`StatValue::Absent`], not a missing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortStats {
    pub tx_bytes: StatValue,
    pub rx_bytes: StatValue,
    pub tx_packets: StatValue,
    pub rx_packets: StatValue,
    pub tx_dropped: StatValue,
    pub rx_dropped: StatValue,
    pub tx_errors: StatValue,
    pub rx_errors: StatValue,
    pub collisions: StatValue,
    pub rx_frame_error: StatValue,
    pub rx_over_error: StatValue,
    pub rx_crc_error: StatValue,
}

impl Default for PortStats {
    fn default() -> Self {
        Self {
            tx_bytes: StatValue::Absent,
            rx_bytes: StatValue::Absent,
            tx_packets: StatValue::Absent,
            rx_packets: StatValue::Absent,
            tx_dropped: StatValue::Absent,
            rx_dropped: StatValue::Absent,
            tx_errors: StatValue::Absent,
            rx_errors: StatValue::Absent,
            collisions: StatValue::Absent,
            rx_frame_error: StatValue::Absent,
            rx_over_error: StatValue::Absent,
            rx_crc_error: StatValue::Absent,
        }
    }
}

// ── PortRecord ──────────────────────────────────────────────────────

/// One switch port's normalized telemetry snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortRecord {
    pub port_number: PortNumber,
    pub interface_type: StatValue,
    pub stats: PortStats,
}
