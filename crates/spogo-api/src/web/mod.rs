// Documented Web API client
//
// Hand-written client for api.spotify.com/v1 authenticated with the
// cookie-derived access token. Endpoints are split by area: catalog
// (search and lookups), player, and library (saved items, follows,
// playlists).

pub mod catalog;
pub mod library;
pub mod models;
pub mod player;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::session::Session;
use crate::token::{api_error, read_text};
use crate::transport::join;

const MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Body placeholder for calls without a JSON payload.
pub(crate) const NO_BODY: Option<&()> = None;

/// Caller defaults applied to every request.
#[derive(Debug, Clone, Default)]
pub struct WebOptions {
    /// `market` query parameter (ISO country code).
    pub market: Option<String>,
    /// `locale` query parameter.
    pub language: Option<String>,
    /// `device_id` for mutating player calls.
    pub device: Option<String>,
}

/// Raw HTTP client for the documented Web API.
#[derive(Debug, Clone)]
pub struct WebClient {
    session: Arc<Session>,
    base: Url,
    options: WebOptions,
}

/// A request before defaults are applied.
struct Call<'a, B: Serialize> {
    method: Method,
    path: &'a str,
    params: Vec<(&'a str, String)>,
    body: Option<&'a B>,
}

impl WebClient {
    pub fn new(session: Arc<Session>, options: WebOptions) -> Self {
        let base = session.endpoints().web_api.clone();
        Self {
            session,
            base,
            options,
        }
    }

    pub fn options(&self) -> &WebOptions {
        &self.options
    }

    // ── Verb helpers ────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(&str, String)>,
    ) -> Result<T, Error> {
        let text = self
            .send(Call::<()> {
                method: Method::GET,
                path,
                params,
                body: None,
            })
            .await?;
        decode(text)
    }

    /// Mutating call whose response body is ignored.
    pub(crate) async fn execute<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: Vec<(&str, String)>,
        body: Option<&B>,
    ) -> Result<(), Error> {
        match self
            .send(Call {
                method,
                path,
                params,
                body,
            })
            .await
        {
            Ok(_) | Err(Error::NoContent) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let text = self
            .send(Call {
                method: Method::POST,
                path,
                params: Vec::new(),
                body: Some(body),
            })
            .await?;
        decode(text)
    }

    // ── Core send loop ──────────────────────────────────────────────

    /// Send with defaults and the 429 retry loop.
    ///
    /// Returns the body text; a 204 or empty body is [`Error::NoContent`].
    async fn send<B: Serialize>(&self, call: Call<'_, B>) -> Result<String, Error> {
        let url = self.url_for(&call)?;

        for attempt in 1..=MAX_ATTEMPTS {
            let token = self.session.access_token().await?;
            debug!(method = %call.method, url = %url, attempt, "web api request");

            let mut req = self
                .session
                .http()
                .request(call.method.clone(), url.clone())
                .header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
                .header(ACCEPT, "application/json");
            if let Some(body) = call.body {
                req = req.json(body);
            }
            let resp = req.send().await?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS {
                if attempt == MAX_ATTEMPTS {
                    break;
                }
                let delay = retry_delay(&resp);
                warn!(attempt, delay_secs = delay.as_secs(), "web api rate limited, retrying");
                self.session.invalidate_access_token().await;
                tokio::time::sleep(delay).await;
                continue;
            }
            if resp.status() == StatusCode::NO_CONTENT {
                return Err(Error::NoContent);
            }
            if !resp.status().is_success() {
                return Err(api_error(resp).await);
            }

            let text = read_text(resp).await?;
            if text.trim().is_empty() {
                return Err(Error::NoContent);
            }
            return Ok(text);
        }

        Err(Error::Api {
            status: 429,
            message: "rate limit retry exhausted".into(),
            body: String::new(),
        })
    }

    fn url_for<B: Serialize>(&self, call: &Call<'_, B>) -> Result<Url, Error> {
        let mut url = join(&self.base, call.path)?;
        let mutating = matches!(call.method, Method::PUT | Method::POST | Method::DELETE);
        let has = |key: &str| call.params.iter().any(|(k, _)| *k == key);

        let mut params: Vec<(&str, &str)> =
            call.params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        if let Some(market) = self.options.market.as_deref().filter(|_| !has("market")) {
            params.push(("market", market));
        }
        if let Some(lang) = self.options.language.as_deref().filter(|_| !has("locale")) {
            params.push(("locale", lang));
        }
        if mutating {
            if let Some(device) = self.options.device.as_deref().filter(|_| !has("device_id")) {
                params.push(("device_id", device));
            }
        }

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }
}

fn retry_delay(resp: &reqwest::Response) -> Duration {
    resp.headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map_or(DEFAULT_RETRY_DELAY, Duration::from_secs)
        .min(MAX_RETRY_DELAY)
}

fn decode<T: DeserializeOwned>(text: String) -> Result<T, Error> {
    serde_json::from_str(&text).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: text,
    })
}
