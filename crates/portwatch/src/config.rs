//! CLI configuration: `portwatch.toml` merged with `PORTWATCH_*`
//! environment variables, overridden by flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use url::Url;

use portwatch_api::{TlsMode, TransportConfig};
use portwatch_core::{FlowSource, PollerConfig, SwitchId, ViewHints};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── File config ─────────────────────────────────────────────────────

/// The on-disk config shape. Everything is optional; flags and env
/// fill the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub url: Option<String>,
    pub switch: Option<String>,
    pub timeout_secs: Option<u64>,
    pub insecure: Option<bool>,
    pub interval_secs: Option<u64>,
    pub flow_source: Option<FlowSource>,
    pub store_column: Option<bool>,
}

/// Path to `portwatch.toml` in the platform config directory.
pub fn config_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "portwatch")
        .map(|dirs| dirs.config_dir().join("portwatch.toml"))
        .unwrap_or_else(|| PathBuf::from("portwatch.toml"))
}

/// Load file + env config. A missing file yields the defaults; a
/// malformed one is an error.
pub fn load() -> Result<FileConfig, CliError> {
    load_from(&config_path())
}

fn load_from(path: &Path) -> Result<FileConfig, CliError> {
    Ok(Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("PORTWATCH_"))
        .extract()?)
}

// ── Resolution ──────────────────────────────────────────────────────

/// Fully resolved settings for one command invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: Url,
    pub transport: TransportConfig,
    pub poller: PollerConfig,
}

/// Resolve settings with flag > env > file precedence.
pub fn resolve(
    global: &GlobalOpts,
    switch_arg: Option<&str>,
    interval_flag: Option<u64>,
) -> Result<Settings, CliError> {
    let file = load()?;

    let url_str = global
        .url
        .clone()
        .or(file.url)
        .ok_or_else(|| CliError::NoConsoleUrl {
            path: config_path().display().to_string(),
        })?;
    let base_url: Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let tls = if global.insecure || file.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };
    let transport = TransportConfig {
        tls,
        timeout: Duration::from_secs(global.timeout.or(file.timeout_secs).unwrap_or(30)),
    };

    let switch = switch_arg
        .map(str::to_owned)
        .or(file.switch)
        .ok_or_else(|| CliError::NoSwitch {
            path: config_path().display().to_string(),
        })?;

    let flow_source = if global.inventory {
        FlowSource::Inventory
    } else {
        file.flow_source.unwrap_or_default()
    };

    let poller = PollerConfig::new(SwitchId::new(switch))
        .with_flow_source(flow_source)
        .with_refresh_interval(Duration::from_secs(
            interval_flag.or(file.interval_secs).unwrap_or(30),
        ))
        .with_view_hints(ViewHints {
            has_store_setting: global.store_column || file.store_column.unwrap_or(false),
            switch_detail: None,
        });

    Ok(Settings {
        base_url,
        transport,
        poller,
    })
}
