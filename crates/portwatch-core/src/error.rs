// ── Core error types ──
//
// Consumer-facing errors from portwatch-core. Per-port flow failures
// never surface here — they are absorbed into a reset summary for the
// affected port only. What remains is the port-list path, which the
// caller may want to report as "no new data this tick".

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The port-list fetch for a refresh cycle failed. The previously
    /// published port list is untouched; the next tick retries.
    #[error("port list fetch failed: {0}")]
    PortListFetch(#[source] portwatch_api::Error),
}

impl CoreError {
    /// Returns `true` if the underlying failure is transient and the
    /// next scheduled tick is likely to succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::PortListFetch(e) => e.is_transient(),
        }
    }
}
