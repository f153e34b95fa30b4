// ── Domain model ──
//
// Canonical, normalized types consumed by the store and the rendering
// surface. Wire-level quirks (hyphenated keys, absent fields, empty
// strings) are resolved before anything becomes one of these.

pub mod flow;
pub mod port;

pub use flow::{FlowBandwidth, FlowSource, FlowSummary};
pub use port::{PLACEHOLDER, PortNumber, PortRecord, PortStats, StatValue, SwitchId};
