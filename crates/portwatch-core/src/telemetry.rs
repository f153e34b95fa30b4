// ── Telemetry client seam ──
//
// The poller is generic over this trait so the orchestrator can be
// exercised against in-memory fakes. `SwitchApiClient` is the real
// implementation; its HTTP behavior is tested separately in
// portwatch-api.

use std::future::Future;

use portwatch_api::models::{RawFlow, RawPortRecord};
use portwatch_api::{Error, SwitchApiClient};

use crate::model::{FlowSource, SwitchId};

/// Source of raw port and flow telemetry for one console.
///
/// Implementations must be cheap to clone — the poller hands clones to
/// spawned fan-out tasks. Futures are `Send` so fetches can run on a
/// multi-threaded runtime.
pub trait Telemetry: Clone + Send + Sync + 'static {
    /// Fetch the raw port-statistics list for a switch.
    fn port_stats(
        &self,
        switch: &SwitchId,
    ) -> impl Future<Output = Result<Vec<RawPortRecord>, Error>> + Send;

    /// Fetch the raw flows touching one port of a switch.
    fn port_flows(
        &self,
        switch: &SwitchId,
        source: FlowSource,
        port: &str,
    ) -> impl Future<Output = Result<Vec<RawFlow>, Error>> + Send;
}

impl Telemetry for SwitchApiClient {
    async fn port_stats(&self, switch: &SwitchId) -> Result<Vec<RawPortRecord>, Error> {
        self.list_port_stats(switch.as_str()).await
    }

    async fn port_flows(
        &self,
        switch: &SwitchId,
        source: FlowSource,
        port: &str,
    ) -> Result<Vec<RawFlow>, Error> {
        self.list_port_flows(switch.as_str(), source.is_inventory(), port)
            .await
    }
}
