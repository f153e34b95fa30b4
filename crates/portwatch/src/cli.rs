//! Clap derive structures for the `portwatch` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// portwatch -- live switch-port telemetry from an OpenKilda console
#[derive(Debug, Parser)]
#[command(
    name = "portwatch",
    version,
    about = "Watch switch-port statistics and per-port flow summaries",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct GlobalOpts {
    /// Console base URL
    #[arg(long, short = 'c', env = "PORTWATCH_URL", global = true)]
    pub url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "PORTWATCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PORTWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// Query flows from the inventory database instead of the controller
    #[arg(long, global = true)]
    pub inventory: bool,

    /// Show the per-port store column
    #[arg(long, global = true)]
    pub store_column: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PORTWATCH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one refresh cycle and render the port table
    #[command(alias = "ls")]
    Ports(PortsArgs),

    /// Poll continuously, re-rendering on every change
    #[command(alias = "w")]
    Watch(WatchArgs),
}

#[derive(Debug, Args)]
pub struct PortsArgs {
    /// Switch ID (falls back to the configured default)
    pub switch: Option<String>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Switch ID (falls back to the configured default)
    pub switch: Option<String>,

    /// Seconds between scheduled refreshes
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}
