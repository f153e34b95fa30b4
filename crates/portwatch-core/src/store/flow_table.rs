// ── Reactive per-port flow summary table ──
//
// Lock-free concurrent storage keyed by port number, with push-based
// change notification via `watch` channels. Fan-out tasks write their
// own key only, so writes for different ports never contend beyond
// DashMap's shard locks.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::FlowSummary;

/// Reactive map from port number to its current [`FlowSummary`].
///
/// Every mutation bumps a version counter and rebuilds the snapshot
/// that subscribers receive.
pub struct FlowTable {
    /// Primary storage: port number -> summary.
    by_port: DashMap<String, FlowSummary>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<HashMap<String, FlowSummary>>>,
}

impl FlowTable {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(HashMap::new()));

        Self {
            by_port: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or replace the summary for one port. Returns `true` if
    /// the port was new.
    pub(crate) fn upsert(&self, port: String, summary: FlowSummary) -> bool {
        let is_new = self.by_port.insert(port, summary).is_none();
        self.rebuild_snapshot();
        self.bump_version();
        is_new
    }

    /// Remove one port's summary. Returns the removed summary if it existed.
    pub(crate) fn remove(&self, port: &str) -> Option<FlowSummary> {
        let removed = self.by_port.remove(port).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    /// Look up one port's summary.
    pub fn get(&self, port: &str) -> Option<FlowSummary> {
        self.by_port.get(port).map(|r| *r.value())
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<HashMap<String, FlowSummary>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub fn subscribe(&self) -> watch::Receiver<Arc<HashMap<String, FlowSummary>>> {
        self.snapshot.subscribe()
    }

    pub fn len(&self) -> usize {
        self.by_port.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_port.is_empty()
    }

    /// Return all current port numbers in the table.
    pub(crate) fn keys(&self) -> Vec<String> {
        self.by_port.iter().map(|r| r.key().clone()).collect()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all entries into a snapshot map and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let entries: HashMap<String, FlowSummary> = self
            .by_port
            .iter()
            .map(|r| (r.key().clone(), *r.value()))
            .collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(entries));
    }

    /// Increment the version counter.
    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}
