//! `portwatch watch` -- continuous polling with live re-render.
//!
//! Runs an initial refresh, starts the scheduler, then repaints on
//! every store notification until Ctrl-C. JSON output streams one
//! compact snapshot line per change instead of repainting.

use std::io::{self, IsTerminal, Write};

use tokio::sync::watch;
use tracing::warn;

use portwatch_api::SwitchApiClient;
use portwatch_core::PortPoller;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::commands::build_poller;
use crate::config::{self, Settings};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let settings = config::resolve(global, args.switch.as_deref(), args.interval)?;
    let poller = build_poller(&settings)?;

    // First paint. A down console is not fatal here -- the scheduler
    // keeps retrying every interval.
    if let Err(e) = poller.refresh().await {
        warn!(error = %e, "initial refresh failed");
    }

    let (enabled_tx, enabled_rx) = watch::channel(true);
    poller
        .start(settings.poller.refresh_interval, enabled_rx)
        .await;

    let mut ports_rx = poller.store().subscribe_ports();
    let mut flows_rx = poller.store().subscribe_flows();
    render(&poller, &settings, global);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = ports_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&poller, &settings, global);
            }
            changed = flows_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&poller, &settings, global);
            }
        }
    }

    drop(enabled_tx);
    poller.dispose().await;
    Ok(())
}

fn render(poller: &PortPoller<SwitchApiClient>, settings: &Settings, global: &GlobalOpts) {
    let hints = &settings.poller.view_hints;
    let views = output::merge_views(
        &poller.store().ports_snapshot(),
        &poller.store().flows_snapshot(),
        hints,
    );

    match global.output {
        OutputFormat::Table => {
            clear_screen();
            output::print_output(
                &output::switch_header(&settings.poller, poller.store()),
                global.quiet,
            );
            output::print_output(&output::render(&global.output, &views, hints), global.quiet);
        }
        // Streaming formats append one snapshot per change.
        OutputFormat::Json | OutputFormat::JsonCompact => {
            let line = output::render(&OutputFormat::JsonCompact, &views, hints);
            output::print_output(&line, global.quiet);
        }
    }
}

fn clear_screen() {
    if io::stdout().is_terminal() {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "\x1b[2J\x1b[H");
    }
}
