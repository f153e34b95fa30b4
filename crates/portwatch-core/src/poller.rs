// ── Refresh orchestrator ──
//
// One `PortPoller` owns the full lifecycle for a single switch: the
// guarded refresh cycle, the per-port flow fan-out, the periodic
// scheduler, and teardown. Cycles are generation-tagged so a stale
// in-flight fetch can never overwrite state published by a newer
// cycle, and every spawned task selects on a cancellation token so
// teardown is prompt rather than best-effort.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::config::PollerConfig;
use crate::error::CoreError;
use crate::model::{FlowSummary, PortRecord};
use crate::normalize::normalize;
use crate::store::PollerStore;
use crate::telemetry::Telemetry;

/// How a call to [`PortPoller::refresh`] resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cycle fetched, published a port list, and launched its
    /// flow fan-out.
    Completed,
    /// A cycle was already in flight; this call did nothing.
    AlreadyRunning,
    /// A newer cycle (or teardown) won while this one's fetch was in
    /// flight; its results were discarded.
    Superseded,
    /// The poller has been disposed; no work was attempted.
    Disposed,
}

struct TimerTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct PollerInner<C> {
    client: C,
    config: PollerConfig,
    store: Arc<PollerStore>,

    /// Single-flight guard: at most one refresh cycle runs at a time.
    refresh_in_progress: AtomicBool,

    /// Monotonic cycle counter. A task writes to the store only if the
    /// counter still matches the generation it was spawned under.
    generation: AtomicU64,

    /// Root token; cancelled once, on dispose.
    cancel: CancellationToken,

    /// Child token for the active cycle. Starting a new cycle cancels
    /// the previous one's outstanding fan-out.
    cycle_cancel: StdMutex<CancellationToken>,

    /// The periodic scheduler, if started.
    timer: Mutex<Option<TimerTask>>,

    /// Flow fan-out handles, pruned of finished tasks on each cycle
    /// and drained on dispose.
    flow_tasks: Mutex<Vec<JoinHandle<()>>>,

    disposed: AtomicBool,
}

/// Polls one switch's port telemetry into a [`PollerStore`].
///
/// Cheap to clone; all clones share the same state and store.
#[derive(Clone)]
pub struct PortPoller<C: Telemetry> {
    inner: Arc<PollerInner<C>>,
}

impl<C: Telemetry> PortPoller<C> {
    pub fn new(client: C, config: PollerConfig) -> Self {
        let cancel = CancellationToken::new();
        let cycle = cancel.child_token();

        Self {
            inner: Arc::new(PollerInner {
                client,
                config,
                store: Arc::new(PollerStore::new()),
                refresh_in_progress: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                cancel,
                cycle_cancel: StdMutex::new(cycle),
                timer: Mutex::new(None),
                flow_tasks: Mutex::new(Vec::new()),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub fn store(&self) -> &Arc<PollerStore> {
        &self.inner.store
    }

    pub fn config(&self) -> &PollerConfig {
        &self.inner.config
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    // ── Refresh cycle ────────────────────────────────────────────────

    /// Run one refresh cycle: fetch the port list, normalize, publish,
    /// then fan out one flow fetch per assigned port.
    ///
    /// Concurrent calls collapse to one cycle via the in-progress
    /// guard. A transport failure on the port-list fetch leaves the
    /// previously published list untouched.
    pub async fn refresh(&self) -> Result<RefreshOutcome, CoreError> {
        let inner = &self.inner;

        if inner.disposed.load(Ordering::SeqCst) {
            return Ok(RefreshOutcome::Disposed);
        }
        if inner
            .refresh_in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(switch = %inner.config.switch_id, "refresh already in flight, skipping");
            return Ok(RefreshOutcome::AlreadyRunning);
        }

        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cycle = {
            let mut slot = inner
                .cycle_cancel
                .lock()
                .expect("cycle token lock poisoned");
            slot.cancel();
            let fresh = inner.cancel.child_token();
            *slot = fresh.clone();
            fresh
        };
        debug!(switch = %inner.config.switch_id, generation, "refresh cycle started");

        let fetched = tokio::select! {
            biased;
            () = cycle.cancelled() => None,
            result = inner.client.port_stats(&inner.config.switch_id) => Some(result),
        };

        let raw = match fetched {
            None => {
                inner.refresh_in_progress.store(false, Ordering::SeqCst);
                return Ok(RefreshOutcome::Superseded);
            }
            Some(Err(e)) => {
                inner.refresh_in_progress.store(false, Ordering::SeqCst);
                warn!(switch = %inner.config.switch_id, error = %e, "port list fetch failed");
                return Err(CoreError::PortListFetch(e));
            }
            Some(Ok(raw)) => raw,
        };

        // The fetch may have raced teardown or a newer cycle.
        if cycle.is_cancelled() || inner.generation.load(Ordering::SeqCst) != generation {
            inner.refresh_in_progress.store(false, Ordering::SeqCst);
            debug!(generation, "discarding superseded port list");
            return Ok(RefreshOutcome::Superseded);
        }

        let records: Vec<PortRecord> = raw.iter().map(normalize).collect();
        let assigned: Vec<String> = records
            .iter()
            .filter_map(|r| r.port_number.as_assigned().map(str::to_owned))
            .collect();
        debug!(
            ports = records.len(),
            assigned = assigned.len(),
            "publishing port list"
        );
        inner.store.apply_port_list(records);

        {
            let mut tasks = inner.flow_tasks.lock().await;
            tasks.retain(|t| !t.is_finished());
            for port in assigned {
                tasks.push(tokio::spawn(flow_task(
                    Arc::clone(inner),
                    generation,
                    cycle.clone(),
                    port,
                )));
            }
        }

        inner.refresh_in_progress.store(false, Ordering::SeqCst);
        Ok(RefreshOutcome::Completed)
    }

    // ── Scheduler ────────────────────────────────────────────────────

    /// Start the periodic scheduler. Each tick runs [`Self::refresh`]
    /// unless `enabled` currently holds `false`, in which case the
    /// tick is skipped without touching the store.
    ///
    /// Calling `start` again replaces the previous schedule; a poller
    /// never runs two timers.
    pub async fn start(&self, interval: Duration, enabled: watch::Receiver<bool>) {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return;
        }
        self.stop().await;

        let cancel = self.inner.cancel.child_token();
        let handle = tokio::spawn(poll_task(self.clone(), interval, enabled, cancel.clone()));
        *self.inner.timer.lock().await = Some(TimerTask { cancel, handle });
        debug!(switch = %self.inner.config.switch_id, ?interval, "scheduler started");
    }

    /// Stop the periodic scheduler. In-flight cycles are unaffected;
    /// idempotent.
    pub async fn stop(&self) {
        if let Some(timer) = self.inner.timer.lock().await.take() {
            timer.cancel.cancel();
            let _ = timer.handle.await;
            debug!(switch = %self.inner.config.switch_id, "scheduler stopped");
        }
    }

    // ── Teardown ─────────────────────────────────────────────────────

    /// Tear the poller down: stop the scheduler, cancel the active
    /// cycle and its fan-out, and wait for every spawned task to
    /// finish. After `dispose` returns, no further store writes occur
    /// and all entry points are inert. Safe to call more than once.
    pub async fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(switch = %self.inner.config.switch_id, "disposing poller");

        // Root cancellation reaches the timer, the active cycle, and
        // every fan-out task through their child tokens.
        self.inner.cancel.cancel();

        if let Some(timer) = self.inner.timer.lock().await.take() {
            let _ = timer.handle.await;
        }
        for task in self.inner.flow_tasks.lock().await.drain(..) {
            let _ = task.await;
        }
        self.inner.refresh_in_progress.store(false, Ordering::SeqCst);
    }
}

/// Periodic tick loop. The first interval tick fires immediately and
/// is consumed so the schedule starts one full interval out.
async fn poll_task<C: Telemetry>(
    poller: PortPoller<C>,
    interval: Duration,
    enabled: watch::Receiver<bool>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if !*enabled.borrow() {
                    debug!("refresh disabled, skipping tick");
                    continue;
                }
                if let Err(e) = poller.refresh().await {
                    warn!(error = %e, transient = e.is_transient(), "scheduled refresh failed");
                }
            }
        }
    }
}

/// Fetch and aggregate one port's flows, then publish the summary.
///
/// A fetch failure resets this port's summary to empty; other ports
/// are untouched. Results from a superseded cycle are discarded.
async fn flow_task<C: Telemetry>(
    inner: Arc<PollerInner<C>>,
    generation: u64,
    cycle: CancellationToken,
    port: String,
) {
    let fetched = tokio::select! {
        biased;
        () = cycle.cancelled() => return,
        result = inner
            .client
            .port_flows(&inner.config.switch_id, inner.config.flow_source, &port) => result,
    };

    if cycle.is_cancelled() || inner.generation.load(Ordering::SeqCst) != generation {
        debug!(port, generation, "discarding superseded flow result");
        return;
    }

    let summary = match fetched {
        Ok(flows) => aggregate(&flows),
        Err(e) => {
            debug!(port, error = %e, "flow fetch failed, resetting summary");
            FlowSummary::EMPTY
        }
    };
    inner.store.apply_flow_summary(port, summary);
}
