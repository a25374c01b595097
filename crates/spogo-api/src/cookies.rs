//! Browser cookies: the only credential the web-player protocol needs.
//!
//! The core never extracts cookies itself. It consumes a [`CookieSource`]
//! and rebuilds a fresh [`Jar`] from it on every token exchange, since
//! browser-exported cookies rotate underneath us.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Cookie that carries the logged-in session.
pub const SESSION_COOKIE: &str = "sp_dc";

/// Cookie that carries the anonymous device identifier.
pub const DEVICE_COOKIE: &str = "sp_t";

/// A single browser cookie as persisted on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Expiry as unix seconds; `None` for session cookies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

fn default_path() -> String {
    "/".into()
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: ".spotify.com".into(),
            path: default_path(),
            expires: None,
            secure: true,
            http_only: false,
        }
    }
}

/// Anything that can hand out the current cookie set.
#[async_trait]
pub trait CookieSource: Send + Sync {
    async fn cookies(&self) -> Result<Vec<Cookie>, Error>;
}

// ── Sources ─────────────────────────────────────────────────────────

/// Reads a JSON array of [`Cookie`] from disk on every call.
#[derive(Debug, Clone)]
pub struct FileCookieSource {
    path: PathBuf,
}

impl FileCookieSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CookieSource for FileCookieSource {
    async fn cookies(&self) -> Result<Vec<Cookie>, Error> {
        debug!(path = %self.path.display(), "reading cookie file");
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Cookies {
                message: format!("{}: {e}", self.path.display()),
            })?;
        serde_json::from_str(&raw).map_err(|e| Error::Cookies {
            message: format!("{}: {e}", self.path.display()),
        })
    }
}

/// Fixed in-memory cookie set.
#[derive(Debug, Clone, Default)]
pub struct StaticCookieSource {
    cookies: Vec<Cookie>,
}

impl StaticCookieSource {
    pub fn new(cookies: Vec<Cookie>) -> Self {
        Self { cookies }
    }
}

#[async_trait]
impl CookieSource for StaticCookieSource {
    async fn cookies(&self) -> Result<Vec<Cookie>, Error> {
        Ok(self.cookies.clone())
    }
}

// ── Persistence ─────────────────────────────────────────────────────

/// Write cookies as pretty JSON, creating parent directories.
///
/// On unix the file is restricted to the owner (0600).
pub fn write_cookies(path: &Path, cookies: &[Cookie]) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(cookies).map_err(|e| Error::Cookies {
        message: e.to_string(),
    })?;
    std::fs::write(path, body)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

// ── Jar helpers ─────────────────────────────────────────────────────

/// Load cookies into a fresh jar, host-scoped to each of `origins`.
///
/// Domain attributes are dropped: the jar only needs to replay the
/// cookies to the endpoints we call, which may be a local proxy.
pub fn jar_for(cookies: &[Cookie], origins: &[&Url]) -> Arc<Jar> {
    let jar = Jar::default();
    for origin in origins {
        for cookie in cookies {
            jar.add_cookie_str(&format!("{}={}; Path=/", cookie.name, cookie.value), origin);
        }
    }
    Arc::new(jar)
}

/// Value of the named cookie, if present and non-empty.
pub fn find<'a>(cookies: &'a [Cookie], name: &str) -> Option<&'a str> {
    cookies
        .iter()
        .find(|c| c.name == name && !c.value.is_empty())
        .map(|c| c.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore;

    #[tokio::test]
    async fn file_source_round_trips_written_cookies() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cookies").join("default.json");
        let cookies = vec![Cookie::new("sp_dc", "abc"), Cookie::new(DEVICE_COOKIE, "dev-1")];

        write_cookies(&path, &cookies).expect("write");
        let loaded = FileCookieSource::new(&path).cookies().await.expect("read");

        assert_eq!(loaded, cookies);
        assert_eq!(find(&loaded, DEVICE_COOKIE), Some("dev-1"));
    }

    #[tokio::test]
    async fn missing_file_names_path() {
        let err = FileCookieSource::new("/nonexistent/spogo/cookies.json")
            .cookies()
            .await
            .expect_err("should fail");
        assert!(err.to_string().contains("/nonexistent/spogo/cookies.json"));
    }

    #[test]
    fn static_source_hands_out_copies() {
        let source = StaticCookieSource::new(vec![Cookie::new("sp_dc", "abc")]);
        let first = tokio_test::block_on(source.cookies()).expect("cookies");
        let second = tokio_test::block_on(source.cookies()).expect("cookies");
        assert_eq!(first, second);
        assert_eq!(find(&first, "sp_dc"), Some("abc"));
    }

    #[test]
    fn minimal_cookie_json_parses() {
        let parsed: Vec<Cookie> =
            serde_json::from_str(r#"[{"name":"sp_dc","value":"x"}]"#).expect("parse");
        assert_eq!(parsed[0].path, "/");
        assert!(parsed[0].expires.is_none());
    }

    #[test]
    fn jar_replays_cookies_to_each_origin() {
        let a = Url::parse("http://127.0.0.1:1000/").expect("url");
        let b = Url::parse("https://open.spotify.com/").expect("url");
        let jar = jar_for(&[Cookie::new("sp_dc", "abc")], &[&a, &b]);

        for url in [&a, &b] {
            let header = jar.cookies(url).expect("cookie header");
            assert_eq!(header.to_str().expect("ascii"), "sp_dc=abc");
        }
    }
}
