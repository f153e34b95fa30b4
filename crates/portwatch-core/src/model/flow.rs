// Flow-side domain types.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

// ── FlowSource ──────────────────────────────────────────────────────

/// Which view of the flow data to query.
///
/// The console can answer from the controller's live state or from its
/// inventory database. This is explicit refresh configuration — never
/// read from ambient state mid-cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowSource {
    #[default]
    Controller,
    Inventory,
}

impl FlowSource {
    /// The `inventory` query-parameter value the console expects.
    pub fn is_inventory(self) -> bool {
        matches!(self, Self::Inventory)
    }
}

// ── FlowBandwidth ───────────────────────────────────────────────────

/// Summed flow bandwidth for one port.
///
/// `Zero` means no flow contributed anything — it displays and
/// serializes as the integer `0`. A non-zero sum is carried as a
/// value rounded to three decimals and rendered `N.NNN`. Keeping the
/// two apart preserves the distinction between "no data" and "a sum
/// that rounds to something".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowBandwidth {
    Zero,
    Total(f64),
}

impl FlowBandwidth {
    /// The summed value as a plain number.
    pub fn value(self) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::Total(v) => v,
        }
    }
}

impl fmt::Display for FlowBandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => f.write_str("0"),
            Self::Total(v) => write!(f, "{v:.3}"),
        }
    }
}

impl Serialize for FlowBandwidth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Zero => serializer.serialize_u64(0),
            Self::Total(_) => serializer.collect_str(self),
        }
    }
}

// ── FlowSummary ─────────────────────────────────────────────────────

/// Aggregate over the flows touching one port, recomputed every
/// refresh cycle. A failed or empty fetch resets to [`Self::EMPTY`];
/// a summary is never left stale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowSummary {
    pub bandwidth: FlowBandwidth,
    pub flow_count: usize,
}

impl FlowSummary {
    pub const EMPTY: Self = Self {
        bandwidth: FlowBandwidth::Zero,
        flow_count: 0,
    };
}

impl Default for FlowSummary {
    fn default() -> Self {
        Self::EMPTY
    }
}
