// ── Runtime poller configuration ──
//
// Describes *what* to poll and how the refresh behaves. Built by the
// consumer (CLI, service) and handed in — core never reads config
// files or ambient storage. Everything that influences a refresh is
// in here or in the store, so a cycle is a function of its inputs.

use std::time::Duration;

use serde_json::Value;

use crate::model::{FlowSource, SwitchId};

/// Read-only hints the rendering surface consumes.
///
/// These come from the console's cached UI state. The core never
/// writes them and never branches on them — they only shape how a
/// consumer presents the data.
#[derive(Debug, Clone, Default)]
pub struct ViewHints {
    /// Whether the "store" column applies to this deployment.
    pub has_store_setting: bool,
    /// Cached switch-detail blob (name, vendor, ...), if the console
    /// had one. Used for display headers only.
    pub switch_detail: Option<Value>,
}

/// Configuration for polling a single switch.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// The switch whose ports are polled.
    pub switch_id: SwitchId,
    /// Which view of the flow data per-port fetches query.
    pub flow_source: FlowSource,
    /// Interval between scheduled refresh ticks.
    pub refresh_interval: Duration,
    /// Display hints passed through to consumers.
    pub view_hints: ViewHints,
}

impl PollerConfig {
    /// Config with the console's defaults: controller-sourced flows,
    /// 30 second refresh cadence.
    pub fn new(switch_id: SwitchId) -> Self {
        Self {
            switch_id,
            flow_source: FlowSource::Controller,
            refresh_interval: Duration::from_secs(30),
            view_hints: ViewHints::default(),
        }
    }

    pub fn with_flow_source(mut self, source: FlowSource) -> Self {
        self.flow_source = source;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_view_hints(mut self, hints: ViewHints) -> Self {
        self.view_hints = hints;
        self
    }
}
