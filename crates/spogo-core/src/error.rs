// ── Core error types ──
//
// User-facing errors from spogo-core. The `From<spogo_api::Error>` impl
// translates protocol-level failures into these variants while keeping the
// two facts the router and the CLI care about: "this backend cannot do
// that" and the HTTP status.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cookie source failed: {message}")]
    Cookies { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Operation cancelled")]
    Cancelled,

    // ── Remote ───────────────────────────────────────────────────────
    /// Non-2xx from any Spotify endpoint.
    #[error("spotify api error ({status}){}", suffix(.message))]
    Api { status: u16, message: String },

    /// GraphQL `errors` array on an otherwise successful response.
    #[error("{message}")]
    Query { message: String },

    /// A reverse-engineered assumption no longer holds.
    #[error("{message}")]
    Discovery { message: String },

    #[error("no {kind} found for {id}")]
    NotFound { kind: String, id: String },

    // ── Operation ────────────────────────────────────────────────────
    /// The backend has no equivalent for this operation.
    #[error("{operation} is not supported by the {backend} engine")]
    Unsupported {
        operation: String,
        backend: String,
    },

    #[error("Invalid resource '{input}': {reason}")]
    InvalidResource { input: String, reason: String },

    #[error("{message}")]
    ValidationFailed { message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

fn suffix(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {message}")
    }
}

impl CoreError {
    pub fn unsupported(operation: impl Into<String>, backend: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
            backend: backend.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// HTTP status, when the failure came from a remote endpoint.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Credential problems: failed exchange, unusable cookies, or 401/403.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::Cookies { .. }
        ) || matches!(self.status(), Some(401 | 403))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// ── Conversion from protocol-level errors ────────────────────────────

impl From<spogo_api::Error> for CoreError {
    fn from(err: spogo_api::Error) -> Self {
        use spogo_api::Error as Api;

        match err {
            Api::Authentication { message } => Self::AuthenticationFailed { message },
            Api::Cookies { message } => Self::Cookies { message },
            Api::Totp { message } => Self::AuthenticationFailed {
                message: format!("totp: {message}"),
            },
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    Self::Timeout { timeout_secs: 0 }
                } else if let Some(status) = e.status() {
                    Self::Api {
                        status: status.as_u16(),
                        message: e.to_string(),
                    }
                } else {
                    Self::ConnectionFailed {
                        reason: e.to_string(),
                    }
                }
            }
            Api::InvalidUrl(e) => Self::Internal(format!("Invalid URL: {e}")),
            Api::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            Api::Cancelled => Self::Cancelled,
            Api::Api {
                status, message, ..
            } => Self::Api { status, message },
            Api::NoContent => Self::OperationFailed {
                message: "no content".into(),
            },
            Api::Pathfinder { message } => Self::Query { message },
            Api::Discovery { what } => Self::Discovery { message: what },
            err @ Api::MissingHashes(_) => Self::Discovery {
                message: err.to_string(),
            },
            Api::Pattern(e) => Self::Internal(format!("Invalid pattern: {e}")),
            Api::WebSocketConnect(reason) => Self::ConnectionFailed {
                reason: format!("dealer: {reason}"),
            },
            Api::Deserialization { message, body: _ } => {
                Self::Internal(format!("Deserialization error: {message}"))
            }
            Api::Script { message } => Self::OperationFailed {
                message: format!("applescript error: {message}"),
            },
            Api::Io(e) => Self::OperationFailed {
                message: e.to_string(),
            },
            Api::Unsupported(what) => Self::unsupported(what, "current platform"),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("Deserialization error: {err}"))
    }
}
