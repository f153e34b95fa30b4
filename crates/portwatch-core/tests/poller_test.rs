// End-to-end poller lifecycle tests against an in-memory console.
//
// The fake client records call counts and can hold a port-list or
// flow fetch open on a semaphore, which lets the tests pin down the
// concurrency behavior (single-flight guard, dispose mid-cycle, stale
// fan-out results) deterministically.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use portwatch_api::Error as ApiError;
use portwatch_api::models::{RawFlow, RawPortRecord};
use portwatch_core::{
    FlowBandwidth, FlowSource, FlowSummary, PollerConfig, PollerStore, PortNumber, PortPoller,
    RefreshOutcome, SwitchId, Telemetry,
};
use pretty_assertions::assert_eq;
use tokio::sync::Semaphore;

// ── Fake console ────────────────────────────────────────────────────

#[derive(Clone)]
struct FakeConsole {
    state: Arc<ConsoleState>,
}

struct ConsoleState {
    ports: Mutex<Vec<RawPortRecord>>,
    flows: Mutex<HashMap<String, Vec<RawFlow>>>,
    failing_flow_ports: Mutex<HashSet<String>>,
    fail_port_list: AtomicBool,
    /// When present, `port_stats` blocks until a permit is released.
    port_gate: Option<Arc<Semaphore>>,
    /// When present, `port_flows` blocks until a permit is released.
    flow_gate: Option<Arc<Semaphore>>,
    port_calls: AtomicUsize,
    flow_calls: AtomicUsize,
}

impl FakeConsole {
    fn new(ports: Vec<RawPortRecord>) -> Self {
        Self::build(ports, None, None)
    }

    fn gated(ports: Vec<RawPortRecord>) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (Self::build(ports, Some(Arc::clone(&gate)), None), gate)
    }

    fn flow_gated(ports: Vec<RawPortRecord>) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (Self::build(ports, None, Some(Arc::clone(&gate))), gate)
    }

    fn build(
        ports: Vec<RawPortRecord>,
        port_gate: Option<Arc<Semaphore>>,
        flow_gate: Option<Arc<Semaphore>>,
    ) -> Self {
        Self {
            state: Arc::new(ConsoleState {
                ports: Mutex::new(ports),
                flows: Mutex::new(HashMap::new()),
                failing_flow_ports: Mutex::new(HashSet::new()),
                fail_port_list: AtomicBool::new(false),
                port_gate,
                flow_gate,
                port_calls: AtomicUsize::new(0),
                flow_calls: AtomicUsize::new(0),
            }),
        }
    }

    fn set_ports(&self, ports: Vec<RawPortRecord>) {
        *self.state.ports.lock().unwrap() = ports;
    }

    fn set_flows(&self, port: &str, bandwidths: &[f64]) {
        self.state.flows.lock().unwrap().insert(
            port.to_owned(),
            bandwidths.iter().copied().map(RawFlow::with_bandwidth).collect(),
        );
    }

    fn fail_flows_for(&self, port: &str) {
        self.state
            .failing_flow_ports
            .lock()
            .unwrap()
            .insert(port.to_owned());
    }

    fn fail_port_list(&self, fail: bool) {
        self.state.fail_port_list.store(fail, Ordering::SeqCst);
    }

    fn port_calls(&self) -> usize {
        self.state.port_calls.load(Ordering::SeqCst)
    }

    fn flow_calls(&self) -> usize {
        self.state.flow_calls.load(Ordering::SeqCst)
    }
}

fn server_error() -> ApiError {
    ApiError::Api {
        status: 500,
        message: "Internal Server Error".into(),
    }
}

impl Telemetry for FakeConsole {
    async fn port_stats(&self, _switch: &SwitchId) -> Result<Vec<RawPortRecord>, ApiError> {
        self.state.port_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.state.port_gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.state.fail_port_list.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.state.ports.lock().unwrap().clone())
    }

    async fn port_flows(
        &self,
        _switch: &SwitchId,
        _source: FlowSource,
        port: &str,
    ) -> Result<Vec<RawFlow>, ApiError> {
        self.state.flow_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.state.flow_gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.state.failing_flow_ports.lock().unwrap().contains(port) {
            return Err(server_error());
        }
        Ok(self
            .state
            .flows
            .lock()
            .unwrap()
            .get(port)
            .cloned()
            .unwrap_or_default())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

fn port(number: &str) -> RawPortRecord {
    RawPortRecord {
        port_number: Some(number.to_owned()),
        interface_type: Some("physical".to_owned()),
        ..RawPortRecord::default()
    }
}

fn unassigned_port() -> RawPortRecord {
    RawPortRecord::default()
}

fn poller(console: FakeConsole) -> PortPoller<FakeConsole> {
    PortPoller::new(
        console,
        PollerConfig::new(SwitchId::new("de:ad:be:ef:00:00:00:01")),
    )
}

/// Wait until the store holds flow summaries for `expected` ports.
/// Fan-out tasks run concurrently, so completion arrives via the
/// subscription rather than the `refresh` return.
async fn wait_for_flow_entries(store: &Arc<PollerStore>, expected: usize) {
    let mut rx = store.subscribe_flows();
    tokio::time::timeout(Duration::from_secs(5), async {
        while rx.borrow_and_update().len() != expected {
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("flow summaries did not converge");
}

// ── Refresh cycle ───────────────────────────────────────────────────

#[tokio::test]
async fn refresh_publishes_ports_and_fans_out_to_assigned_only() {
    let console = FakeConsole::new(vec![port("1"), port("2"), unassigned_port()]);
    console.set_flows("1", &[1000.0, 2000.0]);
    console.set_flows("2", &[]);

    let poller = poller(console.clone());
    let outcome = poller.refresh().await.unwrap();
    assert_eq!(outcome, RefreshOutcome::Completed);

    let ports = poller.store().ports_snapshot();
    assert_eq!(ports.len(), 3);
    assert_eq!(ports[0].port_number, PortNumber::Assigned("1".into()));
    assert_eq!(ports[2].port_number, PortNumber::Unassigned);

    wait_for_flow_entries(poller.store(), 2).await;
    assert_eq!(console.flow_calls(), 2);

    let one = poller.store().flow_summary("1").unwrap();
    assert_eq!(one.bandwidth, FlowBandwidth::Total(3.0));
    assert_eq!(one.bandwidth.to_string(), "3.000");
    assert_eq!(one.flow_count, 2);

    assert_eq!(poller.store().flow_summary("2"), Some(FlowSummary::EMPTY));
    assert_eq!(poller.store().flow_summary("-"), None);
}

#[tokio::test]
async fn concurrent_refresh_collapses_to_one_cycle() {
    let (console, gate) = FakeConsole::gated(vec![port("1")]);
    let poller = poller(console.clone());

    let background = {
        let poller = poller.clone();
        tokio::spawn(async move { poller.refresh().await })
    };
    // Let the first cycle reach the gated fetch.
    while console.port_calls() == 0 {
        tokio::task::yield_now().await;
    }

    let second = poller.refresh().await.unwrap();
    assert_eq!(second, RefreshOutcome::AlreadyRunning);

    gate.add_permits(1);
    let first = background.await.unwrap().unwrap();
    assert_eq!(first, RefreshOutcome::Completed);
    assert_eq!(console.port_calls(), 1);
}

#[tokio::test]
async fn flow_failure_resets_only_that_port() {
    let console = FakeConsole::new(vec![port("5"), port("7")]);
    console.set_flows("7", &[500.0]);
    console.fail_flows_for("5");

    let poller = poller(console);
    poller.refresh().await.unwrap();
    wait_for_flow_entries(poller.store(), 2).await;

    assert_eq!(poller.store().flow_summary("5"), Some(FlowSummary::EMPTY));

    let seven = poller.store().flow_summary("7").unwrap();
    assert_eq!(seven.bandwidth, FlowBandwidth::Total(0.5));
    assert_eq!(seven.flow_count, 1);
}

#[tokio::test]
async fn port_list_failure_keeps_previous_list() {
    let console = FakeConsole::new(vec![port("1"), port("2")]);
    let poller = poller(console.clone());

    poller.refresh().await.unwrap();
    wait_for_flow_entries(poller.store(), 2).await;
    let stamp = poller.store().last_refresh();

    console.fail_port_list(true);
    let err = poller.refresh().await.expect_err("fetch should fail");
    assert!(err.is_transient());

    assert_eq!(poller.store().ports_snapshot().len(), 2);
    assert_eq!(poller.store().flows_snapshot().len(), 2);
    assert_eq!(poller.store().last_refresh(), stamp);

    // The guard must be clear again: a later cycle succeeds.
    console.fail_port_list(false);
    assert_eq!(poller.refresh().await.unwrap(), RefreshOutcome::Completed);
}

#[tokio::test]
async fn withdrawn_port_loses_its_summary_on_the_next_cycle() {
    let console = FakeConsole::new(vec![port("1"), port("2")]);
    let poller = poller(console.clone());

    poller.refresh().await.unwrap();
    wait_for_flow_entries(poller.store(), 2).await;

    console.set_ports(vec![port("2")]);
    poller.refresh().await.unwrap();
    wait_for_flow_entries(poller.store(), 1).await;

    assert_eq!(poller.store().flow_summary("1"), None);
    assert!(poller.store().flow_summary("2").is_some());
}

#[tokio::test]
async fn superseded_cycle_flow_results_never_land() {
    let (console, gate) = FakeConsole::flow_gated(vec![port("1")]);
    console.set_flows("1", &[1000.0]);
    let poller = poller(console.clone());

    assert_eq!(poller.refresh().await.unwrap(), RefreshOutcome::Completed);
    // Let the first cycle's flow fetch reach the gate.
    while console.flow_calls() == 0 {
        tokio::task::yield_now().await;
    }

    // The next cycle drops port 1; the held fetch must not resurrect it.
    console.set_ports(vec![port("2")]);
    assert_eq!(poller.refresh().await.unwrap(), RefreshOutcome::Completed);
    while console.flow_calls() < 2 {
        tokio::task::yield_now().await;
    }

    gate.add_permits(2);
    wait_for_flow_entries(poller.store(), 1).await;

    assert_eq!(poller.store().flow_summary("1"), None);
    assert_eq!(poller.store().flow_summary("2"), Some(FlowSummary::EMPTY));
}

// ── Teardown ────────────────────────────────────────────────────────

#[tokio::test]
async fn dispose_discards_the_in_flight_cycle() {
    let (console, gate) = FakeConsole::gated(vec![port("1")]);
    let poller = poller(console.clone());

    let background = {
        let poller = poller.clone();
        tokio::spawn(async move { poller.refresh().await })
    };
    while console.port_calls() == 0 {
        tokio::task::yield_now().await;
    }

    poller.dispose().await;
    gate.add_permits(1);

    let outcome = background.await.unwrap().unwrap();
    assert_eq!(outcome, RefreshOutcome::Superseded);
    assert!(poller.store().ports_snapshot().is_empty());
    assert!(poller.store().flows_snapshot().is_empty());
}

#[tokio::test]
async fn dispose_discards_a_held_flow_fetch() {
    let (console, gate) = FakeConsole::flow_gated(vec![port("1")]);
    console.set_flows("1", &[1000.0]);
    let poller = poller(console.clone());

    assert_eq!(poller.refresh().await.unwrap(), RefreshOutcome::Completed);
    while console.flow_calls() == 0 {
        tokio::task::yield_now().await;
    }

    // Joins the fan-out task, which unblocks via cancellation rather
    // than the gate.
    poller.dispose().await;
    gate.add_permits(1);
    tokio::task::yield_now().await;

    assert_eq!(poller.store().ports_snapshot().len(), 1);
    assert!(poller.store().flows_snapshot().is_empty());
    assert_eq!(poller.store().flow_summary("1"), None);
}

#[tokio::test]
async fn disposed_poller_is_inert() {
    let console = FakeConsole::new(vec![port("1")]);
    let poller = poller(console.clone());

    poller.dispose().await;
    poller.dispose().await;

    assert!(poller.is_disposed());
    assert_eq!(poller.refresh().await.unwrap(), RefreshOutcome::Disposed);
    assert_eq!(console.port_calls(), 0);

    let (_tx, enabled) = tokio::sync::watch::channel(true);
    poller.start(Duration::from_millis(1), enabled).await;
    tokio::task::yield_now().await;
    assert_eq!(console.port_calls(), 0);
}

// ── Scheduler ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn scheduler_skips_ticks_while_disabled() {
    let console = FakeConsole::new(vec![port("1")]);
    let poller = poller(console.clone());

    let (enabled_tx, enabled_rx) = tokio::sync::watch::channel(false);
    poller.start(Duration::from_secs(30), enabled_rx).await;

    // Two full intervals with refresh disabled: nothing happens.
    tokio::time::sleep(Duration::from_secs(65)).await;
    assert_eq!(console.port_calls(), 0);
    assert!(poller.store().last_refresh().is_none());

    enabled_tx.send(true).unwrap();
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(console.port_calls(), 1);

    poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn restarting_replaces_the_previous_schedule() {
    let console = FakeConsole::new(vec![port("1")]);
    let poller = poller(console.clone());

    let (_tx, enabled) = tokio::sync::watch::channel(true);
    poller.start(Duration::from_secs(30), enabled.clone()).await;
    poller.start(Duration::from_secs(30), enabled).await;

    tokio::time::sleep(Duration::from_secs(31)).await;
    // One timer, one tick, one fetch.
    assert_eq!(console.port_calls(), 1);

    poller.stop().await;
    poller.stop().await;
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(console.port_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn first_scheduled_refresh_waits_one_full_interval() {
    let console = FakeConsole::new(vec![port("1")]);
    let poller = poller(console.clone());

    let (_tx, enabled) = tokio::sync::watch::channel(true);
    poller.start(Duration::from_secs(30), enabled).await;

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(console.port_calls(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(console.port_calls(), 1);

    poller.dispose().await;
}
