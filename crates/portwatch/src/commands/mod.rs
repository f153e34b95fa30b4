//! Command handlers.

pub mod ports;
pub mod watch;

use std::time::Duration;

use tokio::time::timeout;

use portwatch_api::SwitchApiClient;
use portwatch_core::PortPoller;

use crate::config::Settings;
use crate::error::CliError;

/// Build the poller for a resolved command invocation.
pub fn build_poller(settings: &Settings) -> Result<PortPoller<SwitchApiClient>, CliError> {
    let client = SwitchApiClient::new(settings.base_url.clone(), &settings.transport)?;
    Ok(PortPoller::new(client, settings.poller.clone()))
}

/// Wait until every assigned port from the current list has a flow
/// summary. Fan-out tasks settle on their own (failures reset to an
/// empty summary), so this converges; the timeout covers a console
/// that stops answering mid-cycle.
pub async fn wait_for_summaries(poller: &PortPoller<SwitchApiClient>, limit: Duration) {
    let assigned = poller
        .store()
        .ports_snapshot()
        .iter()
        .filter(|p| p.port_number.is_assigned())
        .count();

    let mut rx = poller.store().subscribe_flows();
    let settled = async {
        while rx.borrow_and_update().len() < assigned {
            if rx.changed().await.is_err() {
                break;
            }
        }
    };
    if timeout(limit, settled).await.is_err() {
        tracing::warn!("flow summaries did not settle before the deadline");
    }
}
