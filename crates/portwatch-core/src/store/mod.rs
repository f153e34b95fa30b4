// ── Reactive poller state ──
//
// Thread-safe storage for the current port list and per-port flow
// summaries. Mutations are broadcast to subscribers via `watch`
// channels — a notification is the "re-render" signal for whatever
// surface is bound to the poller.

mod flow_table;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{FlowSummary, PortRecord};

pub use flow_table::FlowTable;

/// Reactive state for one polled switch.
pub struct PollerStore {
    /// Current normalized port list. Replaced wholesale per refresh so
    /// withdrawn ports disappear immediately.
    ports: watch::Sender<Arc<Vec<PortRecord>>>,

    /// Per-port flow summaries, written independently by fan-out tasks.
    pub(crate) flows: FlowTable,

    /// When the last successful refresh completed.
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl PollerStore {
    pub(crate) fn new() -> Self {
        let (ports, _) = watch::channel(Arc::new(Vec::new()));
        let (last_refresh, _) = watch::channel(None);

        Self {
            ports,
            flows: FlowTable::new(),
            last_refresh,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    /// The current port list (cheap `Arc` clone).
    pub fn ports_snapshot(&self) -> Arc<Vec<PortRecord>> {
        self.ports.borrow().clone()
    }

    /// The current flow-summary map (cheap `Arc` clone).
    pub fn flows_snapshot(&self) -> Arc<HashMap<String, FlowSummary>> {
        self.flows.snapshot()
    }

    /// One port's flow summary, if any cycle has produced one.
    pub fn flow_summary(&self, port: &str) -> Option<FlowSummary> {
        self.flows.get(port)
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Subscribe to port-list replacements.
    pub fn subscribe_ports(&self) -> watch::Receiver<Arc<Vec<PortRecord>>> {
        self.ports.subscribe()
    }

    /// Subscribe to flow-summary changes.
    pub fn subscribe_flows(&self) -> watch::Receiver<Arc<HashMap<String, FlowSummary>>> {
        self.flows.subscribe()
    }

    // ── Mutations (orchestrator only) ────────────────────────────────

    /// Replace the port list and prune flow summaries for ports no
    /// longer present. Pruning after the replacement avoids a
    /// transient state where a live port has no summary entry it had
    /// a moment ago.
    pub(crate) fn apply_port_list(&self, records: Vec<PortRecord>) {
        let live: std::collections::HashSet<String> = records
            .iter()
            .filter_map(|r| r.port_number.as_assigned().map(str::to_owned))
            .collect();

        self.ports.send_modify(|p| *p = Arc::new(records));

        for stale in self
            .flows
            .keys()
            .into_iter()
            .filter(|port| !live.contains(port))
        {
            self.flows.remove(&stale);
        }

        let _ = self.last_refresh.send(Some(Utc::now()));
    }

    /// Record one port's freshly aggregated summary.
    pub(crate) fn apply_flow_summary(&self, port: String, summary: FlowSummary) {
        self.flows.upsert(port, summary);
    }
}
