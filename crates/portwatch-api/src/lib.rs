// portwatch-api: HTTP client for the network console's switch telemetry
// endpoints (per-switch port statistics, per-port flows).

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::SwitchApiClient;
pub use error::Error;
pub use models::{RawFlow, RawPortRecord, RawPortStats};
pub use transport::{TlsMode, TransportConfig};
