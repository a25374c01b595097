// Shared transport configuration for building reqwest::Client instances.
//
// Every Spotify surface (token exchange, client token, pathfinder,
// connect-state, Web API) shares timeout, user agent, and cookie settings
// through this module. Endpoint roots live here too so tests can point
// the whole stack at a single mock origin.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::Error;

/// Desktop Chrome user agent the web player expects.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

pub(crate) const WEB_ORIGIN: &str = "https://open.spotify.com";

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.into(),
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str());

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder.build().map_err(Error::Transport)
    }

    /// Clone this config with the given cookie jar attached.
    pub fn with_cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Clone this config with a different request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Headers the web player sends on same-origin XHRs.
pub(crate) fn browser_headers() -> HeaderMap {
    const PAIRS: [(&str, &str); 10] = [
        ("accept", "application/json"),
        ("accept-language", "en-US,en;q=0.9"),
        ("origin", WEB_ORIGIN),
        ("referer", "https://open.spotify.com/"),
        ("sec-fetch-site", "same-origin"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-dest", "empty"),
        (
            "sec-ch-ua",
            "\"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\", \"Google Chrome\";v=\"131\"",
        ),
        ("sec-ch-ua-platform", "\"macOS\""),
        ("app-platform", "WebPlayer"),
    ];

    let mut headers = HeaderMap::with_capacity(PAIRS.len() + 1);
    for (name, value) in PAIRS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static("?0"),
    );
    headers
}

/// Join `path` onto `base`, tolerating a trailing slash on either side.
pub(crate) fn join(base: &Url, path: &str) -> Result<Url, Error> {
    let root = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{root}/{path}"))?)
}

// ── Endpoints ───────────────────────────────────────────────────────

/// Every remote root the clients talk to.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Access-token exchange (`GET`, cookie-authenticated).
    pub token: Url,
    /// Web player landing page (app config block, bundle script tags).
    pub web_player: Url,
    /// Client-token grant (`POST`).
    pub client_token: Url,
    /// Persisted-query GraphQL endpoint.
    pub pathfinder: Url,
    /// Connect-state service root.
    pub connect_state: Url,
    /// Track-playback service root (device registration).
    pub track_playback: Url,
    /// Dealer WebSocket.
    pub dealer: Url,
    /// Documented Web API root.
    pub web_api: Url,
    /// Bundle directory used when the player script URL has no path.
    pub bundle_base: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            token: fixed("https://open.spotify.com/api/token"),
            web_player: fixed("https://open.spotify.com/"),
            client_token: fixed("https://clienttoken.spotify.com/v1/clienttoken"),
            pathfinder: fixed("https://api-partner.spotify.com/pathfinder/v1/query"),
            connect_state: fixed("https://gue1-spclient.spotify.com/connect-state/v1"),
            track_playback: fixed("https://gue1-spclient.spotify.com/track-playback/v1"),
            dealer: fixed("wss://dealer.spotify.com/"),
            web_api: fixed("https://api.spotify.com/v1"),
            bundle_base: fixed("https://open.spotifycdn.com/cdn/build/web-player/"),
        }
    }
}

impl Endpoints {
    /// Point every endpoint at one HTTP origin (local proxies, mock servers).
    ///
    /// Paths mirror the production layout; the dealer uses the same host
    /// over `ws://` (or `wss://` for an `https://` origin).
    pub fn rooted_at(origin: &str) -> Result<Self, Error> {
        let base = Url::parse(origin)?;
        let mut dealer = base.clone();
        let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
        dealer
            .set_scheme(scheme)
            .map_err(|()| Error::discovery(format!("cannot derive dealer url from {origin}")))?;

        Ok(Self {
            token: join(&base, "api/token")?,
            web_player: join(&base, "")?,
            client_token: join(&base, "v1/clienttoken")?,
            pathfinder: join(&base, "pathfinder/v1/query")?,
            connect_state: join(&base, "connect-state/v1")?,
            track_playback: join(&base, "track-playback/v1")?,
            dealer: join(&dealer, "")?,
            web_api: join(&base, "v1")?,
            bundle_base: join(&base, "cdn/build/web-player/")?,
        })
    }
}

fn fixed(raw: &str) -> Url {
    Url::parse(raw).expect("static endpoint URL")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_handles_slashes() {
        let base = Url::parse("http://127.0.0.1:9000/v1/").expect("url");
        assert_eq!(
            join(&base, "/me/player").expect("join").as_str(),
            "http://127.0.0.1:9000/v1/me/player"
        );
    }

    #[test]
    fn rooted_endpoints_share_origin() {
        let endpoints = Endpoints::rooted_at("http://127.0.0.1:4567").expect("endpoints");
        assert_eq!(endpoints.token.as_str(), "http://127.0.0.1:4567/api/token");
        assert_eq!(endpoints.web_player.as_str(), "http://127.0.0.1:4567/");
        assert_eq!(endpoints.dealer.as_str(), "ws://127.0.0.1:4567/");
        assert_eq!(
            endpoints.connect_state.as_str(),
            "http://127.0.0.1:4567/connect-state/v1"
        );
    }

    #[test]
    fn browser_headers_mark_web_player() {
        let headers = browser_headers();
        assert_eq!(headers["app-platform"], "WebPlayer");
        assert_eq!(headers["origin"], WEB_ORIGIN);
    }
}
