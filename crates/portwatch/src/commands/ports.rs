//! `portwatch ports` -- one refresh cycle, then render.

use std::time::Duration;

use crate::cli::{GlobalOpts, OutputFormat, PortsArgs};
use crate::commands::{build_poller, wait_for_summaries};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: PortsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let settings = config::resolve(global, args.switch.as_deref(), None)?;
    let poller = build_poller(&settings)?;

    poller.refresh().await?;
    // One transport timeout per port, plus slack for task scheduling.
    wait_for_summaries(&poller, settings.transport.timeout + Duration::from_secs(5)).await;

    let views = output::merge_views(
        &poller.store().ports_snapshot(),
        &poller.store().flows_snapshot(),
        &settings.poller.view_hints,
    );

    if matches!(global.output, OutputFormat::Table) {
        output::print_output(
            &output::switch_header(&settings.poller, poller.store()),
            global.quiet,
        );
    }
    let rendered = output::render(&global.output, &views, &settings.poller.view_hints);
    output::print_output(&rendered, global.quiet);

    poller.dispose().await;
    Ok(())
}
