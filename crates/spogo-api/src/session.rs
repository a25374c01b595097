//! Per-process credential cache for the web-player protocol.
//!
//! [`Session::authorize`] walks three steps (access token, app config,
//! client token), each skipped while its cached value is fresh. One lock
//! covers the whole walk, so concurrent callers wait for a single refresh
//! and then reuse its result.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use tokio::sync::Mutex;
use tracing::{debug, instrument, trace};

use crate::cookies::{self, Cookie, CookieSource, DEVICE_COOKIE};
use crate::error::Error;
use crate::token::{self, AccessToken, ClientToken, DeviceFingerprint};
use crate::totp::TotpEngine;
use crate::transport::{Endpoints, TransportConfig};

/// Env override for the version string sent on connect-state calls.
pub const CONNECT_VERSION_ENV: &str = "SPOGO_CONNECT_VERSION";
pub const DEFAULT_CONNECT_VERSION: &str = "harmony:4.43.2-a61ecaf5";

const FRESHNESS_MARGIN_SECS: i64 = 60;

/// Everything a private-protocol request needs.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: SecretString,
    pub client_token: SecretString,
    /// Web player version from the landing page config.
    pub client_version: String,
    /// Version declared to connect-state.
    pub connect_version: String,
    /// Anonymous device id from the `sp_t` cookie.
    pub device_id: String,
}

#[derive(Default)]
struct CredentialState {
    access: Option<AccessToken>,
    /// Last non-empty client id; refreshed tokens may omit it.
    client_id: Option<String>,
    client_version: Option<String>,
    device_id: Option<String>,
    client: Option<ClientToken>,
}

fn fresh(expires_at: DateTime<Utc>) -> bool {
    Utc::now() + Duration::seconds(FRESHNESS_MARGIN_SECS) < expires_at
}

/// Cookie-backed session shared by every private-protocol client.
pub struct Session {
    http: reqwest::Client,
    transport: TransportConfig,
    endpoints: Arc<Endpoints>,
    cookies: Arc<dyn CookieSource>,
    totp: TotpEngine,
    connect_version: String,
    state: Mutex<CredentialState>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("endpoints", &self.endpoints)
            .field("connect_version", &self.connect_version)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(
        cookies: Arc<dyn CookieSource>,
        endpoints: Arc<Endpoints>,
        transport: TransportConfig,
        totp: TotpEngine,
    ) -> Result<Self, Error> {
        let connect_version = std::env::var(CONNECT_VERSION_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONNECT_VERSION.to_owned());

        Ok(Self {
            http: transport.build_client()?,
            transport,
            endpoints,
            cookies,
            totp,
            connect_version,
            state: Mutex::new(CredentialState::default()),
        })
    }

    /// Override the declared connect version.
    #[must_use]
    pub fn with_connect_version(mut self, version: impl Into<String>) -> Self {
        self.connect_version = version.into();
        self
    }

    /// Cookie-less client for API calls that authenticate with headers.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn user_agent(&self) -> &str {
        &self.transport.user_agent
    }

    // ── Public entry points ─────────────────────────────────────────

    /// Full credential set, refreshing whichever parts are stale.
    #[instrument(skip_all)]
    pub async fn authorize(&self) -> Result<Credentials, Error> {
        let mut state = self.state.lock().await;
        let mut cookie_cache: Option<Vec<Cookie>> = None;

        let access = self.ensure_access(&mut state, &mut cookie_cache).await?;

        if state.client_version.is_none() || state.device_id.is_none() {
            let cookies = self.load_cookies(&mut cookie_cache).await?;
            let device_id = cookies::find(&cookies, DEVICE_COOKIE)
                .ok_or_else(|| Error::discovery("missing sp_t cookie"))?
                .to_owned();
            let http = self.cookie_client(&cookies)?;
            let version = token::fetch_client_version(&http, &self.endpoints.web_player).await?;
            debug!(client_version = %version, "app config refreshed");
            state.client_version = Some(version);
            state.device_id = Some(device_id);
        } else {
            trace!("app config cache hit");
        }

        let client_version = state.client_version.clone().unwrap_or_default();
        let device_id = state.device_id.clone().unwrap_or_default();

        let client = match state.client.as_ref().filter(|t| fresh(t.expires_at)) {
            Some(token) => {
                trace!("client token cache hit");
                token.clone()
            }
            None => {
                let client_id = state
                    .client_id
                    .clone()
                    .ok_or_else(|| Error::discovery("missing client id"))?;
                let token = token::fetch_client_token(
                    &self.http,
                    &self.endpoints.client_token,
                    DeviceFingerprint {
                        client_version: &client_version,
                        client_id: &client_id,
                        device_id: &device_id,
                    },
                )
                .await?;
                debug!(expires_at = %token.expires_at, "client token refreshed");
                state.client = Some(token.clone());
                token
            }
        };

        Ok(Credentials {
            access_token: access.value,
            client_token: client.value,
            client_version,
            connect_version: self.connect_version.clone(),
            device_id,
        })
    }

    /// Access token only; enough for the documented Web API.
    pub async fn access_token(&self) -> Result<SecretString, Error> {
        let mut state = self.state.lock().await;
        let mut cookie_cache = None;
        Ok(self.ensure_access(&mut state, &mut cookie_cache).await?.value)
    }

    /// Drop the cached access token so the next call re-exchanges cookies.
    pub async fn invalidate_access_token(&self) {
        debug!("access token invalidated");
        self.state.lock().await.access = None;
    }

    // ── Steps ───────────────────────────────────────────────────────

    async fn ensure_access(
        &self,
        state: &mut CredentialState,
        cookie_cache: &mut Option<Vec<Cookie>>,
    ) -> Result<AccessToken, Error> {
        if let Some(token) = state.access.as_ref().filter(|t| fresh(t.expires_at)) {
            trace!("access token cache hit");
            return Ok(token.clone());
        }

        let cookies = self.load_cookies(cookie_cache).await?;
        let http = self.cookie_client(&cookies)?;
        let code = self.totp.generate_code(Utc::now()).await?;
        let token = token::fetch_access_token(&http, &self.endpoints.token, &code).await?;
        debug!(
            expires_at = %token.expires_at,
            anonymous = token.anonymous,
            "access token refreshed"
        );

        // The client token is bound to the client id of the access token.
        if let Some(client_id) = token.client_id.as_deref().filter(|id| !id.is_empty()) {
            if state.client_id.as_deref() != Some(client_id) {
                if state.client_id.is_some() {
                    debug!("client id changed, dropping client token");
                    state.client = None;
                }
                state.client_id = Some(client_id.to_owned());
            }
        }
        state.access = Some(token.clone());
        Ok(token)
    }

    async fn load_cookies(&self, cache: &mut Option<Vec<Cookie>>) -> Result<Vec<Cookie>, Error> {
        if let Some(cookies) = cache {
            return Ok(cookies.clone());
        }
        let cookies = self.cookies.cookies().await?;
        if cookies.is_empty() {
            return Err(Error::Cookies {
                message: "cookie source returned no cookies".into(),
            });
        }
        *cache = Some(cookies.clone());
        Ok(cookies)
    }

    /// Fresh jar per call: exported cookies may have rotated on disk.
    fn cookie_client(&self, cookies: &[Cookie]) -> Result<reqwest::Client, Error> {
        let jar = cookies::jar_for(
            cookies,
            &[&self.endpoints.token, &self.endpoints.web_player],
        );
        self.transport.clone().with_cookie_jar(jar).build_client()
    }
}
