// Telemetry HTTP client.
//
// Wraps `reqwest::Client` with console-specific URL construction and
// response decoding. The console returns bare JSON arrays (no envelope);
// errors surface as HTTP status codes.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{RawFlow, RawPortRecord};
use crate::transport::TransportConfig;

/// HTTP client for the console's switch telemetry endpoints.
///
/// Cheap to clone — the underlying `reqwest::Client` is an `Arc`
/// around its connection pool.
#[derive(Debug, Clone)]
pub struct SwitchApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SwitchApiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the console root (e.g. `https://console.example:8080`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client` (used in tests).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The console base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the port statistics list for one switch.
    pub async fn list_port_stats(&self, switch_id: &str) -> Result<Vec<RawPortRecord>, Error> {
        let url = self.switch_url(switch_id, "ports")?;
        self.get(url).await
    }

    /// Fetch the flows touching one port of a switch.
    ///
    /// `inventory` selects the inventory-sourced flow view instead of
    /// the controller-sourced one.
    pub async fn list_port_flows(
        &self,
        switch_id: &str,
        inventory: bool,
        port_number: &str,
    ) -> Result<Vec<RawFlow>, Error> {
        let mut url = self.switch_url(switch_id, "flows")?;
        url.query_pairs_mut()
            .append_pair("port", port_number)
            .append_pair("inventory", if inventory { "true" } else { "false" });
        self.get(url).await
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a switch-scoped URL: `{base}/api/switch/{switch_id}/{path}`.
    fn switch_url(&self, switch_id: &str, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/api/switch/{switch_id}/{path}");
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the bare JSON array response.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| {
            let snippet = preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {snippet:?})"),
                body,
            }
        })
    }
}

/// The leading portion of a response body, capped at 200 bytes and
/// backed off to a char boundary so multi-byte UTF-8 never splits.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
