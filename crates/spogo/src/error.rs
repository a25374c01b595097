//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help
//! text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use spogo_config::ConfigError;
use spogo_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NETWORK: i32 = 4;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(spogo::auth_failed),
        help(
            "Export fresh cookies from a logged-in open.spotify.com tab and run:\n\
             spogo auth import <cookies.json>"
        )
    )]
    AuthFailed { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach Spotify: {reason}")]
    #[diagnostic(
        code(spogo::connection_failed),
        help("Check your network connection and try again.")
    )]
    Connection { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(spogo::timeout),
        help("Increase the timeout with --timeout.")
    )]
    Timeout { seconds: u64 },

    #[error("Cancelled")]
    #[diagnostic(code(spogo::cancelled))]
    Cancelled,

    // ── Remote ───────────────────────────────────────────────────────
    #[error("Spotify API error ({status}): {message}")]
    #[diagnostic(code(spogo::api_error))]
    Api { status: u16, message: String },

    #[error("{message}")]
    #[diagnostic(
        code(spogo::protocol),
        help(
            "The web player protocol may have changed.\n\
             Try the documented Web API instead: --engine web"
        )
    )]
    Protocol { message: String },

    #[error("No {kind} found for '{id}'")]
    #[diagnostic(code(spogo::not_found))]
    NotFound { kind: String, id: String },

    #[error("'{operation}' is not supported by the {engine} engine")]
    #[diagnostic(
        code(spogo::unsupported),
        help("Pick another engine with --engine (auto, web, connect, applescript).")
    )]
    Unsupported { operation: String, engine: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(spogo::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid resource '{input}': {reason}")]
    #[diagnostic(
        code(spogo::invalid_resource),
        help(
            "Use a spotify:<kind>:<id> URI or an open.spotify.com link, e.g.\n\
             spotify:track:4uLU6hMCjMI75M1A2tKUQC"
        )
    )]
    InvalidResource { input: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {source}")]
    #[diagnostic(code(spogo::config), help("Config file: {path}"))]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    // ── General ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(spogo::failed))]
    Failed { message: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(spogo::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(spogo::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Connection { .. } | Self::Timeout { .. } => exit_code::NETWORK,
            Self::Cancelled => exit_code::CANCELLED,
            Self::Validation { .. } | Self::InvalidResource { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            source => Self::Config {
                path: spogo_config::config_path().display().to_string(),
                source,
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        if err.is_auth() {
            return Self::AuthFailed {
                message: match err {
                    CoreError::AuthenticationFailed { message } | CoreError::Cookies { message } => {
                        message
                    }
                    other => other.to_string(),
                },
            };
        }

        match err {
            CoreError::ConnectionFailed { reason } => Self::Connection { reason },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Cancelled => Self::Cancelled,
            CoreError::Api { status, message } => Self::Api { status, message },
            CoreError::Query { message } | CoreError::Discovery { message } => {
                Self::Protocol { message }
            }
            CoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            CoreError::Unsupported { operation, backend } => Self::Unsupported {
                operation,
                engine: backend,
            },
            CoreError::InvalidResource { input, reason } => Self::InvalidResource { input, reason },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            other => Self::Failed {
                message: other.to_string(),
            },
        }
    }
}
