//! Output formatting: merged port/flow table or JSON.
//!
//! Table rendering uses `tabled`'s builder because the store column is
//! conditional; JSON serializes the merged view rows via serde.

use std::collections::HashMap;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use portwatch_core::model::PLACEHOLDER;
use portwatch_core::{
    FlowBandwidth, FlowSummary, PollerConfig, PollerStore, PortNumber, PortRecord, PortStats,
    StatValue, ViewHints,
};

use crate::cli::OutputFormat;

// ── Merged view rows ────────────────────────────────────────────────

/// One row of the rendered port table: the normalized record joined
/// with the port's current flow summary.
#[derive(Debug, Serialize)]
pub struct PortView {
    pub port_number: PortNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    pub interface_type: StatValue,
    #[serde(flatten)]
    pub stats: PortStats,
    pub flows: usize,
    pub bandwidth: FlowBandwidth,
}

/// Join the port list with the flow-summary map. Ports without a
/// summary yet (unassigned, or fan-out still in flight) render as
/// empty.
#[allow(clippy::implicit_hasher)]
pub fn merge_views(
    ports: &[PortRecord],
    flows: &HashMap<String, FlowSummary>,
    hints: &ViewHints,
) -> Vec<PortView> {
    ports
        .iter()
        .map(|record| {
            let summary = record
                .port_number
                .as_assigned()
                .and_then(|n| flows.get(n))
                .copied()
                .unwrap_or(FlowSummary::EMPTY);

            PortView {
                port_number: record.port_number.clone(),
                store: hints.has_store_setting.then(|| PLACEHOLDER.to_owned()),
                interface_type: record.interface_type.clone(),
                stats: record.stats.clone(),
                flows: summary.flow_count,
                bandwidth: summary.bandwidth,
            }
        })
        .collect()
}

// ── Render dispatchers ──────────────────────────────────────────────

/// Render the merged rows in the chosen format.
pub fn render(format: &OutputFormat, views: &[PortView], hints: &ViewHints) -> String {
    match format {
        OutputFormat::Table => render_table(views, hints),
        OutputFormat::Json => {
            serde_json::to_string_pretty(views).expect("serialization should not fail")
        }
        OutputFormat::JsonCompact => {
            serde_json::to_string(views).expect("serialization should not fail")
        }
    }
}

/// Header line above the table: switch name (from the cached detail
/// blob when available) and the last refresh time.
pub fn switch_header(config: &PollerConfig, store: &PollerStore) -> String {
    let name = config
        .view_hints
        .switch_detail
        .as_ref()
        .and_then(|detail| detail.get("name"))
        .and_then(Value::as_str)
        .map_or_else(|| config.switch_id.to_string(), str::to_owned);

    let name = if should_color() {
        name.bold().to_string()
    } else {
        name
    };

    match store.last_refresh() {
        Some(ts) => format!("{name}  (refreshed {})", ts.format("%H:%M:%S")),
        None => name,
    }
}

/// Print rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn should_color() -> bool {
    io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err()
}

// ── Table rendering ─────────────────────────────────────────────────

/// The headline columns of the console's port table. The long tail of
/// error counters is collapsed into combined cells; the JSON formats
/// carry every field.
fn render_table(views: &[PortView], hints: &ViewHints) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["port".to_owned()];
    if hints.has_store_setting {
        header.push("store".to_owned());
    }
    header.extend(
        [
            "iface", "tx mbps", "rx mbps", "tx pkts", "rx pkts", "drops", "errors", "flows",
            "bandwidth",
        ]
        .map(str::to_owned),
    );
    builder.push_record(header);

    for view in views {
        let mut row = vec![view.port_number.to_string()];
        if let Some(store) = &view.store {
            row.push(store.clone());
        }
        row.extend([
            view.interface_type.to_string(),
            view.stats.tx_bytes.to_string(),
            view.stats.rx_bytes.to_string(),
            view.stats.tx_packets.to_string(),
            view.stats.rx_packets.to_string(),
            pair(&view.stats.tx_dropped, &view.stats.rx_dropped),
            pair(&view.stats.tx_errors, &view.stats.rx_errors),
            view.flows.to_string(),
            view.bandwidth.to_string(),
        ]);
        builder.push_record(row);
    }

    builder.build().with(Style::rounded()).to_string()
}

/// Combined tx/rx cell.
fn pair(tx: &StatValue, rx: &StatValue) -> String {
    format!("{tx}/{rx}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(port: PortNumber) -> PortRecord {
        PortRecord {
            port_number: port,
            interface_type: StatValue::Present("physical".into()),
            stats: PortStats::default(),
        }
    }

    #[test]
    fn merge_joins_summaries_by_port_number() {
        let ports = vec![
            record(PortNumber::Assigned("1".into())),
            record(PortNumber::Unassigned),
        ];
        let mut flows = HashMap::new();
        flows.insert(
            "1".to_owned(),
            FlowSummary {
                bandwidth: FlowBandwidth::Total(3.0),
                flow_count: 2,
            },
        );

        let views = merge_views(&ports, &flows, &ViewHints::default());
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].flows, 2);
        assert_eq!(views[0].bandwidth, FlowBandwidth::Total(3.0));
        assert_eq!(views[1].flows, 0);
        assert_eq!(views[1].bandwidth, FlowBandwidth::Zero);
    }

    #[test]
    fn store_column_appears_only_when_hinted() {
        let ports = vec![record(PortNumber::Assigned("1".into()))];
        let flows = HashMap::new();

        let plain = merge_views(&ports, &flows, &ViewHints::default());
        assert!(plain[0].store.is_none());

        let hints = ViewHints {
            has_store_setting: true,
            switch_detail: None,
        };
        let with_store = merge_views(&ports, &flows, &hints);
        assert_eq!(with_store[0].store.as_deref(), Some("-"));

        let table = render_table(&with_store, &hints);
        assert!(table.contains("store"));
        let table = render_table(&plain, &ViewHints::default());
        assert!(!table.contains("store"));
    }

    #[test]
    fn json_keeps_placeholder_and_bandwidth_typing() {
        let ports = vec![record(PortNumber::Unassigned)];
        let views = merge_views(&ports, &HashMap::new(), &ViewHints::default());

        let json: serde_json::Value =
            serde_json::from_str(&render(&OutputFormat::JsonCompact, &views, &ViewHints::default()))
                .unwrap();
        assert_eq!(json[0]["port_number"], "-");
        assert_eq!(json[0]["tx_bytes"], "-");
        assert_eq!(json[0]["bandwidth"], 0);
        assert!(json[0].get("store").is_none());
    }
}
