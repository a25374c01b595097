use thiserror::Error;

/// Top-level error type for the `spogo-api` crate.
///
/// Covers every failure mode of the web-player protocol and the Web API:
/// cookies, token exchange, transport, remote API statuses, persisted-query
/// discovery, the dealer handshake, and local script execution.
/// `spogo-core` inspects [`Error::is_rate_limited`] and
/// [`Error::is_unsupported`] to drive backend fallback.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token exchange succeeded at the HTTP level but yielded no usable
    /// credential (no access token, no client token, no client id).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Cookie source could not produce cookies.
    #[error("Cookie source failed: {message}")]
    Cookies { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Operation exceeded its deadline.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    // ── Remote API ──────────────────────────────────────────────────
    /// Non-2xx response from any Spotify endpoint.
    #[error("spotify api error ({status}){}", message_suffix(.message))]
    Api {
        status: u16,
        message: String,
        body: String,
    },

    /// Endpoint answered 204 where a payload was expected.
    #[error("no content")]
    NoContent,

    /// GraphQL-level failure reported in the `errors` array.
    #[error("{message}")]
    Pathfinder { message: String },

    // ── Protocol discovery ──────────────────────────────────────────
    /// A reverse-engineered assumption no longer holds (config block,
    /// player bundle, chunk maps, connection id, device ids).
    #[error("{what}")]
    Discovery { what: String },

    /// Bundle scan finished with operations still unresolved.
    #[error("missing hashes for {}", .0.join(", "))]
    MissingHashes(Vec<String>),

    /// Regex built from an operation name failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    // ── WebSocket ───────────────────────────────────────────────────
    /// Dealer connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// TOTP secret or code generation failed.
    #[error("TOTP error: {message}")]
    Totp { message: String },

    // ── Local ───────────────────────────────────────────────────────
    /// AppleScript execution failed.
    #[error("applescript error: {message}")]
    Script { message: String },

    /// Filesystem or process I/O.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ── Platform ────────────────────────────────────────────────────
    /// Operation not available on this backend or platform.
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

fn message_suffix(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {message}")
    }
}

impl Error {
    pub(crate) fn discovery(what: impl Into<String>) -> Self {
        Self::Discovery { what: what.into() }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for HTTP 429 responses.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Returns `true` when the credentials were rejected or never obtained.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. }) || matches!(self.status(), Some(401 | 403))
    }

    /// Returns `true` for network-level failures (connect, DNS, timeout).
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Self::Timeout { .. } | Self::WebSocketConnect(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if the operation has no equivalent on this backend.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Returns `true` if the response body failed to parse.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Deserialization { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_with_and_without_message() {
        let with = Error::Api {
            status: 404,
            message: "not found".into(),
            body: String::new(),
        };
        assert_eq!(with.to_string(), "spotify api error (404): not found");

        let without = Error::Api {
            status: 500,
            message: String::new(),
            body: String::new(),
        };
        assert_eq!(without.to_string(), "spotify api error (500)");
    }

    #[test]
    fn classification() {
        let limited = Error::Api {
            status: 429,
            message: String::new(),
            body: String::new(),
        };
        assert!(limited.is_rate_limited());
        assert!(!limited.is_auth());

        let forbidden = Error::Api {
            status: 403,
            message: String::new(),
            body: String::new(),
        };
        assert!(forbidden.is_auth());
        assert!(Error::Unsupported("transfer").is_unsupported());
        assert!(!Error::NoContent.is_unsupported());
    }

    #[test]
    fn missing_hashes_lists_operations() {
        let err = Error::MissingHashes(vec!["searchDesktop".into(), "getTrack".into()]);
        assert_eq!(err.to_string(), "missing hashes for searchDesktop, getTrack");
    }
}
