// Web-player token endpoints.
//
// Two grants make up a session: the cookie-authenticated access token
// (bearer for every API) and the client token (device fingerprint grant
// that pathfinder and connect-state additionally require). The landing
// page embeds the app version both grants are tied to.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::totp::TotpCode;
use crate::transport::browser_headers;

const CLIENT_TOKEN_DEFAULT_TTL_SECS: i64 = 30 * 60;
const PREVIEW_CHARS: usize = 200;

static APP_CONFIG_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r#"<script id="appServerConfig" type="text/plain">([^<]+)</script>"#)
        .expect("valid appServerConfig pattern")
});

// ── Access token ────────────────────────────────────────────────────

/// Bearer token obtained from browser cookies.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub value: SecretString,
    pub expires_at: DateTime<Utc>,
    pub anonymous: bool,
    pub client_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    expires_in: i64,
    #[serde(default)]
    access_token_expiration_timestamp_ms: i64,
    #[serde(default)]
    is_anonymous: bool,
    #[serde(default)]
    client_id: String,
}

/// Exchange cookies for an access token.
///
/// `http` must already carry the cookie jar for `endpoint`.
pub async fn fetch_access_token(
    http: &reqwest::Client,
    endpoint: &Url,
    totp: &TotpCode,
) -> Result<AccessToken, Error> {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("reason", "init")
        .append_pair("productType", "web-player")
        .append_pair("totp", &totp.code)
        .append_pair("totpVer", &totp.version.to_string())
        .append_pair("totpServer", &totp.code);

    debug!(url = %endpoint, totp_version = totp.version, "GET access token");
    let resp = http.get(url).headers(browser_headers()).send().await?;
    let payload: AccessTokenResponse = read_json(resp).await?;

    if payload.access_token.is_empty() {
        return Err(Error::Authentication {
            message: "missing access token".into(),
        });
    }

    let expires_at = if payload.access_token_expiration_timestamp_ms > 0 {
        DateTime::from_timestamp_millis(payload.access_token_expiration_timestamp_ms)
            .unwrap_or_else(Utc::now)
    } else {
        Utc::now() + Duration::seconds(payload.expires_in)
    };

    Ok(AccessToken {
        value: SecretString::from(payload.access_token),
        expires_at,
        anonymous: payload.is_anonymous,
        client_id: Some(payload.client_id).filter(|id| !id.is_empty()),
    })
}

// ── App config ──────────────────────────────────────────────────────

/// Fetch the landing page and pull `clientVersion` out of the embedded
/// base64 `appServerConfig` block, truncated before its `.g` build suffix.
pub async fn fetch_client_version(http: &reqwest::Client, page: &Url) -> Result<String, Error> {
    debug!(url = %page, "GET web player config");
    let resp = http.get(page.clone()).send().await?;
    let body = read_text(resp).await?;
    parse_client_version(&body)
}

pub(crate) fn parse_client_version(html: &str) -> Result<String, Error> {
    let encoded = APP_CONFIG_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .ok_or_else(|| Error::discovery("missing appServerConfig"))?
        .as_str();

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::discovery(format!("invalid appServerConfig: {e}")))?;
    let config: serde_json::Value =
        serde_json::from_slice(&decoded).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::from_utf8_lossy(&decoded).into_owned(),
        })?;

    let version = config
        .get("clientVersion")
        .and_then(serde_json::Value::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::discovery("missing clientVersion"))?;

    Ok(match version.find(".g") {
        Some(idx) if idx > 0 => version[..idx].to_owned(),
        _ => version.to_owned(),
    })
}

// ── Client token ────────────────────────────────────────────────────

/// Client token plus its expiry.
#[derive(Debug, Clone)]
pub struct ClientToken {
    pub value: SecretString,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ClientTokenRequest<'a> {
    client_data: ClientData<'a>,
}

#[derive(Serialize)]
struct ClientData<'a> {
    client_version: &'a str,
    client_id: &'a str,
    js_sdk_data: JsSdkData<'a>,
}

#[derive(Serialize)]
struct JsSdkData<'a> {
    device_brand: &'a str,
    device_model: &'a str,
    os: &'a str,
    os_version: &'a str,
    device_id: &'a str,
    device_type: &'a str,
}

#[derive(Deserialize)]
struct ClientTokenResponse {
    #[serde(default)]
    granted_token: GrantedToken,
}

#[derive(Default, Deserialize)]
struct GrantedToken {
    #[serde(default)]
    token: String,
    #[serde(default)]
    expires_in: i64,
}

/// Inputs for the client-token grant.
#[derive(Debug, Clone, Copy)]
pub struct DeviceFingerprint<'a> {
    pub client_version: &'a str,
    pub client_id: &'a str,
    pub device_id: &'a str,
}

/// POST the device fingerprint and return the granted client token.
pub async fn fetch_client_token(
    http: &reqwest::Client,
    endpoint: &Url,
    device: DeviceFingerprint<'_>,
) -> Result<ClientToken, Error> {
    let body = ClientTokenRequest {
        client_data: ClientData {
            client_version: device.client_version,
            client_id: device.client_id,
            js_sdk_data: JsSdkData {
                device_brand: "unknown",
                device_model: "unknown",
                os: os_name(),
                os_version: "unknown",
                device_id: device.device_id,
                device_type: "computer",
            },
        },
    };

    debug!(url = %endpoint, "POST client token");
    let resp = http
        .post(endpoint.clone())
        .header(reqwest::header::ACCEPT, "application/json")
        .json(&body)
        .send()
        .await?;
    let payload: ClientTokenResponse = read_json(resp).await?;

    let granted = payload.granted_token;
    if granted.token.is_empty() {
        return Err(Error::Authentication {
            message: "missing client token".into(),
        });
    }
    let ttl = if granted.expires_in > 0 {
        granted.expires_in
    } else {
        CLIENT_TOKEN_DEFAULT_TTL_SECS
    };

    Ok(ClientToken {
        value: SecretString::from(granted.token),
        expires_at: Utc::now() + Duration::seconds(ttl),
    })
}

/// OS name as the web player reports it.
pub fn os_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "macos",
        "windows" => "windows",
        _ => "linux",
    }
}

// ── Response helpers ────────────────────────────────────────────────

/// Shape of Spotify error bodies: `{"error":{"message":..}}` or `{"message":..}`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorInner>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorInner {
    Detailed {
        #[serde(default)]
        message: Option<String>,
    },
    Plain(String),
}

/// Turn a non-2xx response into [`Error::Api`].
pub(crate) async fn api_error(resp: reqwest::Response) -> Error {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<ErrorBody>(&body).ok();

    let message = parsed
        .and_then(|p| {
            let inner = match p.error {
                Some(ErrorInner::Detailed { message }) => message,
                Some(ErrorInner::Plain(message)) => Some(message),
                None => None,
            };
            inner.filter(|m| !m.is_empty()).or(p.message)
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_owned());

    Error::Api {
        status: status.as_u16(),
        message,
        body,
    }
}

pub(crate) async fn read_text(resp: reqwest::Response) -> Result<String, Error> {
    if !resp.status().is_success() {
        return Err(api_error(resp).await);
    }
    Ok(resp.text().await?)
}

/// First 200 characters of a body, cut on a char boundary.
fn preview(body: &str) -> &str {
    body.char_indices()
        .nth(PREVIEW_CHARS)
        .map_or(body, |(end, _)| &body[..end])
}

pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Error> {
    let body = read_text(resp).await?;
    serde_json::from_str(&body).map_err(|e| {
        let snippet = preview(&body);
        Error::Deserialization {
            message: format!("{e} (body preview: {snippet:?})"),
            body,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_cuts_on_char_boundary() {
        let body = format!("{}\u{e9} and more", "a".repeat(199));
        let cut = preview(&body);
        assert_eq!(cut.chars().count(), 200);
        assert!(cut.ends_with('\u{e9}'));
        assert_eq!(preview("short"), "short");
    }

    fn page_with(config: &str) -> String {
        format!(
            "<html><script id=\"appServerConfig\" type=\"text/plain\">{}</script></html>",
            STANDARD.encode(config)
        )
    }

    #[test]
    fn client_version_strips_build_suffix() {
        let html = page_with(r#"{"clientVersion":"1.2.48.123.g1a2b3c4d"}"#);
        assert_eq!(parse_client_version(&html).expect("version"), "1.2.48.123");
    }

    #[test]
    fn client_version_without_suffix_is_kept() {
        let html = page_with(r#"{"clientVersion":"1.2.48"}"#);
        assert_eq!(parse_client_version(&html).expect("version"), "1.2.48");
    }

    #[test]
    fn missing_config_block_is_discovery_error() {
        let err = parse_client_version("<html></html>").expect_err("no block");
        assert!(matches!(err, Error::Discovery { .. }));
        assert_eq!(err.to_string(), "missing appServerConfig");
    }

    #[test]
    fn missing_client_version_is_reported() {
        let html = page_with(r#"{"other":1}"#);
        assert_eq!(
            parse_client_version(&html).expect_err("missing").to_string(),
            "missing clientVersion"
        );
    }
}
