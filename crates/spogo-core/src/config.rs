// ── Runtime client configuration ──
//
// Describes which engine to build and how to reach Spotify. The CLI builds
// a `ClientConfig` from profiles and flags; core never reads config files.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spogo_api::{CookieSource, Endpoints, TotpEngine};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Backend selection.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Engine {
    /// Connect engine first, web engine when it cannot serve a call.
    #[default]
    Auto,
    /// Web engine first; playback moves to connect when rate limited.
    Web,
    Connect,
    /// Desktop app via AppleScript, backed by the auto router.
    Applescript,
}

/// Configuration for one client.
#[derive(Clone)]
pub struct ClientConfig {
    pub cookies: Arc<dyn CookieSource>,
    pub engine: Engine,
    /// ISO country code for catalog requests.
    pub market: Option<String>,
    pub language: Option<String>,
    /// Target device id for Web API player calls.
    pub device: Option<String>,
    pub timeout: Duration,
    pub endpoints: Endpoints,
    /// Overrides `SPOGO_CONNECT_VERSION` and the built-in default.
    pub connect_version: Option<String>,
    /// TOTP engine; `None` reads `SPOGO_TOTP_SECRET_URL` or the mirrors.
    pub totp: Option<TotpEngine>,
    /// Persisted-query hashes known up front.
    pub known_hashes: Vec<(String, String)>,
}

impl ClientConfig {
    pub fn new(cookies: Arc<dyn CookieSource>) -> Self {
        Self {
            cookies,
            engine: Engine::default(),
            market: None,
            language: None,
            device: None,
            timeout: Duration::from_secs(10),
            endpoints: Endpoints::default(),
            connect_version: None,
            totp: None,
            known_hashes: Vec::new(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("engine", &self.engine)
            .field("market", &self.market)
            .field("language", &self.language)
            .field("device", &self.device)
            .field("timeout", &self.timeout)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}
