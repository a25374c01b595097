//! Time-based one-time codes for the web-player token exchange.
//!
//! The token endpoint wants a 6-digit TOTP derived from a versioned shared
//! secret that Spotify rotates. Community mirrors publish the current
//! secrets as `{"<version>": [bytes...]}`; we take the highest version any
//! reachable mirror offers, cache it for a while, and fall back to a
//! compiled-in record when every mirror is down.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;

/// Env var naming an alternate secret source (URL, `file://` URL, or path).
pub const SECRET_SOURCE_ENV: &str = "SPOGO_TOTP_SECRET_URL";

const SECRET_MIRRORS: [&str; 3] = [
    "https://github.com/xyloflake/spot-secrets-go/blob/main/secrets/secretDict.json?raw=true",
    "https://github.com/Thereallo1026/spotify-secrets/blob/main/secrets/secretDict.json?raw=true",
    "https://code.thetadev.de/ThetaDev/spotify-secrets/raw/branch/main/secrets/secretDict.json",
];

const FALLBACK_VERSION: u32 = 18;
const FALLBACK_SECRET: [u8; 18] = [
    70, 60, 33, 57, 92, 120, 90, 33, 32, 62, 62, 55, 126, 93, 66, 35, 108, 68,
];

const CACHE_TTL: Duration = Duration::from_secs(15 * 60);
const SOURCE_TIMEOUT: Duration = Duration::from_secs(5);
const STEP_SECS: i64 = 30;
const DIGITS_MODULUS: u32 = 1_000_000;

type HmacSha1 = Hmac<Sha1>;

// ── Types ───────────────────────────────────────────────────────────

/// A versioned shared secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub version: u32,
    pub secret: Vec<u8>,
}

impl SecretRecord {
    /// The compiled-in record used when no mirror answers.
    pub fn fallback() -> Self {
        Self {
            version: FALLBACK_VERSION,
            secret: FALLBACK_SECRET.to_vec(),
        }
    }
}

/// A generated code together with the secret version it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotpCode {
    pub code: String,
    pub version: u32,
}

/// Where a secret dictionary can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    Http(Url),
    File(PathBuf),
}

impl SecretSource {
    /// Interpret an override string: `http(s)://` URL, `file://` URL, or a path.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::Totp {
                message: "secret source empty".into(),
            });
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(Self::Http(Url::parse(raw)?));
        }
        let path = raw.strip_prefix("file://").unwrap_or(raw);
        Ok(Self::File(PathBuf::from(path)))
    }
}

// ── Cache ───────────────────────────────────────────────────────────

/// Owned, lock-guarded cache for the last fetched secret.
///
/// Shared by cloning the `Arc`; only successful remote fetches land here.
#[derive(Debug, Default)]
pub struct SecretCache {
    slot: Mutex<Option<(SecretRecord, Instant)>>,
}

impl SecretCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    async fn get(&self, ttl: Duration) -> Option<SecretRecord> {
        let slot = self.slot.lock().await;
        slot.as_ref()
            .filter(|(_, stored)| stored.elapsed() < ttl)
            .map(|(record, _)| record.clone())
    }

    async fn put(&self, record: SecretRecord) {
        *self.slot.lock().await = Some((record, Instant::now()));
    }
}

// ── Engine ──────────────────────────────────────────────────────────

/// Produces TOTP codes from the best-known secret.
#[derive(Debug, Clone)]
pub struct TotpEngine {
    http: reqwest::Client,
    sources: Vec<SecretSource>,
    cache: Arc<SecretCache>,
    ttl: Duration,
}

impl TotpEngine {
    /// Engine reading the env override if set, otherwise the public mirrors.
    pub fn from_env(cache: Arc<SecretCache>) -> Result<Self, Error> {
        let sources = match std::env::var(SECRET_SOURCE_ENV) {
            Ok(raw) if !raw.trim().is_empty() => vec![SecretSource::parse(&raw)?],
            _ => SECRET_MIRRORS
                .iter()
                .map(|raw| SecretSource::parse(raw))
                .collect::<Result<_, _>>()?,
        };
        Self::with_sources(sources, cache)
    }

    /// Engine reading only the given sources. An empty list always
    /// yields the fallback record.
    pub fn with_sources(sources: Vec<SecretSource>, cache: Arc<SecretCache>) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(SOURCE_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            sources,
            cache,
            ttl: CACHE_TTL,
        })
    }

    /// Generate the code for `now` and report which secret version it used.
    pub async fn generate_code(&self, now: DateTime<Utc>) -> Result<TotpCode, Error> {
        let record = self.secret().await;
        let key = derive_key(&record.secret);
        let code = totp_at(&key, now.timestamp())?;
        Ok(TotpCode {
            code,
            version: record.version,
        })
    }

    /// Best-known secret: cached, else freshly fetched, else the fallback.
    pub async fn secret(&self) -> SecretRecord {
        if let Some(record) = self.cache.get(self.ttl).await {
            trace!(version = record.version, "totp secret cache hit");
            return record;
        }

        match self.fetch_best().await {
            Some(record) => {
                debug!(version = record.version, "totp secret refreshed");
                self.cache.put(record.clone()).await;
                record
            }
            None => {
                warn!("all totp secret sources failed, using built-in secret");
                SecretRecord::fallback()
            }
        }
    }

    /// Highest version across every source that answered.
    async fn fetch_best(&self) -> Option<SecretRecord> {
        let mut best: Option<SecretRecord> = None;
        for source in &self.sources {
            match self.fetch_source(source).await {
                Ok(record) => {
                    if best.as_ref().is_none_or(|b| record.version > b.version) {
                        best = Some(record);
                    }
                }
                Err(e) => debug!(?source, error = %e, "totp secret source failed"),
            }
        }
        best
    }

    async fn fetch_source(&self, source: &SecretSource) -> Result<SecretRecord, Error> {
        let body = match source {
            SecretSource::Http(url) => {
                let resp = self.http.get(url.clone()).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(Error::Totp {
                        message: format!("secret source status {}", status.as_u16()),
                    });
                }
                resp.text().await?
            }
            SecretSource::File(path) => tokio::fs::read_to_string(path).await?,
        };
        parse_secret_dict(&body)
    }
}

// ── Pure functions ──────────────────────────────────────────────────

/// Pick the highest numeric version from a `{"<ver>": [bytes]}` document.
pub fn parse_secret_dict(body: &str) -> Result<SecretRecord, Error> {
    let raw: HashMap<String, Vec<i64>> =
        serde_json::from_str(body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.to_owned(),
        })?;

    let (version, values) = raw
        .iter()
        .filter_map(|(key, values)| key.parse::<u32>().ok().map(|v| (v, values)))
        .max_by_key(|(version, _)| *version)
        .filter(|(_, values)| !values.is_empty())
        .ok_or_else(|| Error::Totp {
            message: "totp secrets missing".into(),
        })?;

    let secret = values
        .iter()
        .map(|&v| u8::try_from(v))
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| Error::Totp {
            message: "totp secret out of range".into(),
        })?;

    Ok(SecretRecord { version, secret })
}

/// XOR each byte with `(i % 33) + 9`, then concatenate the decimal
/// renderings of the results. The resulting ASCII bytes are the HMAC key.
pub fn derive_key(secret: &[u8]) -> Vec<u8> {
    let mut joined = String::with_capacity(secret.len() * 3);
    for (i, byte) in secret.iter().enumerate() {
        let mask = u8::try_from(i % 33).unwrap_or(0) + 9;
        joined.push_str(&(byte ^ mask).to_string());
    }
    joined.into_bytes()
}

/// RFC 6238 code (30 s step, HMAC-SHA1, 6 digits) for a unix timestamp.
pub fn totp_at(key: &[u8], unix_secs: i64) -> Result<String, Error> {
    let counter = u64::try_from(unix_secs.div_euclid(STEP_SECS)).unwrap_or(0);
    hotp(key, counter)
}

/// RFC 4226 HOTP with dynamic truncation, zero-padded to 6 digits.
pub fn hotp(key: &[u8], counter: u64) -> Result<String, Error> {
    let mut mac = HmacSha1::new_from_slice(key).map_err(|e| Error::Totp {
        message: e.to_string(),
    })?;
    mac.update(&counter.to_be_bytes());
    let sum = mac.finalize().into_bytes();

    let offset = usize::from(sum[sum.len() - 1] & 0x0f);
    let truncated = u32::from_be_bytes([
        sum[offset] & 0x7f,
        sum[offset + 1],
        sum[offset + 2],
        sum[offset + 3],
    ]);
    Ok(format!("{:06}", truncated % DIGITS_MODULUS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RFC_KEY: &[u8] = b"12345678901234567890";

    #[test]
    fn rfc6238_vectors() {
        let vectors = [
            (59, "287082"),
            (1_111_111_109, "081804"),
            (1_111_111_111, "050471"),
            (1_234_567_890, "005924"),
            (2_000_000_000, "279037"),
            (20_000_000_000, "353130"),
        ];
        for (time, expected) in vectors {
            assert_eq!(totp_at(RFC_KEY, time).expect("code"), expected, "t={time}");
        }
    }

    #[test]
    fn derived_key_is_decimal_concatenation() {
        // 70 ^ 9 = 79, 60 ^ 10 = 54, 33 ^ 11 = 42
        assert_eq!(derive_key(&[70, 60, 33]), b"795442".to_vec());
    }

    #[test]
    fn key_mask_wraps_every_33_bytes() {
        let secret = vec![0u8; 34];
        let key = String::from_utf8(derive_key(&secret)).expect("ascii");
        // mask for i=0 and i=33 are both 9
        assert!(key.starts_with("910"));
        assert!(key.ends_with("419"));
    }

    #[test]
    fn secret_dict_picks_highest_version() {
        let record = parse_secret_dict(r#"{"7":[1,2],"18":[3,4],"9":[5],"x":[9]}"#).expect("parse");
        assert_eq!(record, SecretRecord { version: 18, secret: vec![3, 4] });
    }

    #[test]
    fn secret_dict_rejects_out_of_range_bytes() {
        let err = parse_secret_dict(r#"{"3":[1,256]}"#).expect_err("out of range");
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn secret_source_parsing() {
        assert_eq!(
            SecretSource::parse("file:///tmp/secrets.json").expect("file"),
            SecretSource::File(PathBuf::from("/tmp/secrets.json"))
        );
        assert!(matches!(
            SecretSource::parse("https://example.com/s.json").expect("http"),
            SecretSource::Http(_)
        ));
        assert!(SecretSource::parse("  ").is_err());
    }

    #[tokio::test]
    async fn no_sources_uses_uncached_fallback() {
        let cache = SecretCache::new();
        let engine = TotpEngine::with_sources(Vec::new(), cache.clone()).expect("engine");

        let code = engine
            .generate_code(DateTime::from_timestamp(59, 0).expect("ts"))
            .await
            .expect("code");

        assert_eq!(code.version, FALLBACK_VERSION);
        assert_eq!(code.code.len(), 6);
        assert!(cache.get(CACHE_TTL).await.is_none());
    }

    #[tokio::test]
    async fn highest_version_across_sources_wins_and_is_cached() {
        let dir = tempfile::tempdir().expect("tempdir");
        let low = dir.path().join("low.json");
        let high = dir.path().join("high.json");
        std::fs::write(&low, r#"{"20":[1,2,3]}"#).expect("write");
        std::fs::write(&high, r#"{"21":[4,5,6]}"#).expect("write");

        let cache = SecretCache::new();
        let engine = TotpEngine::with_sources(
            vec![
                SecretSource::File(dir.path().join("missing.json")),
                SecretSource::File(low),
                SecretSource::File(high.clone()),
            ],
            cache.clone(),
        )
        .expect("engine");

        assert_eq!(engine.secret().await.version, 21);

        // Cached: the file can disappear without changing the answer.
        std::fs::remove_file(&high).expect("remove");
        assert_eq!(engine.secret().await.version, 21);
    }
}
