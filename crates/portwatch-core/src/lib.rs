// portwatch-core: reactive polling layer between portwatch-api and
// consumers (CLI, rendering surfaces).

pub mod aggregate;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod normalize;
pub mod poller;
pub mod store;
pub mod telemetry;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::aggregate;
pub use config::{PollerConfig, ViewHints};
pub use error::CoreError;
pub use normalize::normalize;
pub use poller::{PortPoller, RefreshOutcome};
pub use store::PollerStore;
pub use telemetry::Telemetry;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    FlowBandwidth, FlowSource, FlowSummary, PortNumber, PortRecord, PortStats, StatValue, SwitchId,
};
