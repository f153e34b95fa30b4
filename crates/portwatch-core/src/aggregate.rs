// ── Flow aggregation ──

use portwatch_api::models::RawFlow;

use crate::model::{FlowBandwidth, FlowSummary};

/// Reduce the flows touching one port to a summary.
///
/// Each flow's bandwidth is scaled from the controller's native kbit
/// down by 1000 before summing. A non-zero sum is rounded to three
/// decimals; an exactly-zero sum stays the literal zero so "no flows
/// contributed" remains distinguishable from a rounded value.
/// Addition over the scaled values makes the result independent of
/// input order.
pub fn aggregate(flows: &[RawFlow]) -> FlowSummary {
    if flows.is_empty() {
        return FlowSummary::EMPTY;
    }

    let sum: f64 = flows.iter().map(|f| f.maximum_bandwidth / 1000.0).sum();

    // A sum is exactly zero only when every contribution was zero.
    #[allow(clippy::float_cmp)]
    let bandwidth = if sum == 0.0 {
        FlowBandwidth::Zero
    } else {
        FlowBandwidth::Total(round3(sum))
    };

    FlowSummary {
        bandwidth,
        flow_count: flows.len(),
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
