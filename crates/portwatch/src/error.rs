//! CLI error types and exit-code mapping.

use thiserror::Error;

use portwatch_core::CoreError;

/// Exit codes, kept stable for scripting.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no console URL configured (pass --url, set PORTWATCH_URL, or add `url` to {path})")]
    NoConsoleUrl { path: String },

    #[error("no switch specified (pass one as an argument or add `switch` to {path})")]
    NoSwitch { path: String },

    #[error(transparent)]
    Config(Box<figment::Error>),

    #[error(transparent)]
    Api(#[from] portwatch_api::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. }
            | Self::NoConsoleUrl { .. }
            | Self::NoSwitch { .. }
            | Self::Config(_) => exit_code::USAGE,
            Self::Api(e) => api_exit_code(e),
            Self::Core(CoreError::PortListFetch(e)) => api_exit_code(e),
            Self::Io(_) => exit_code::GENERAL,
        }
    }
}

fn api_exit_code(err: &portwatch_api::Error) -> i32 {
    use portwatch_api::Error;
    match err {
        Error::Transport(e) if e.is_timeout() => exit_code::TIMEOUT,
        Error::Transport(_) | Error::Tls(_) => exit_code::CONNECTION,
        Error::Api { status: 404, .. } => exit_code::NOT_FOUND,
        _ => exit_code::GENERAL,
    }
}
