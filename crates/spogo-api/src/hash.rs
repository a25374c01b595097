//! Persisted-query hash discovery.
//!
//! Pathfinder only accepts operations by their `sha256Hash`, and those
//! hashes change with every web-player deploy. The resolver mines them
//! from the published bundles:
//!
//! 1. the landing page names the player bundle in a `<script src>`;
//! 2. the bundle embeds two `{id:"..."}` literals mapping chunk ids to
//!    chunk names and to chunk content hashes;
//! 3. each `<name>.<hash>.js` chunk is fetched until every requested
//!    operation name has been seen next to a `sha256Hash`.
//!
//! Discovered hashes are kept for the lifetime of the resolver.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use tokio::sync::Mutex;
use tracing::{debug, instrument, trace, warn};
use url::Url;

use crate::error::Error;
use crate::token::read_text;

/// Minimum hex-value share for a literal to count as the hash map.
pub const DEFAULT_HASH_THRESHOLD: f64 = 0.4;
/// Minimum punctuated-value share for a literal to count as the name map.
pub const DEFAULT_NAME_THRESHOLD: f64 = 0.4;

const OPERATION_WINDOW: usize = 400;

static SCRIPT_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<script[^>]+src="([^"]+)""#).expect("valid script pattern"));
static MAP_LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{(?:\d+:"[^"]+",?)+\}"#).expect("valid map pattern"));
static MAP_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\d+):"([^"]+)""#).expect("valid entry pattern"));

type ChunkMap = BTreeMap<u64, String>;

/// Memoizing operation-name → hash resolver.
#[derive(Debug)]
pub struct HashResolver {
    http: reqwest::Client,
    web_player: Url,
    hashes: Mutex<HashMap<String, String>>,
    pub hash_threshold: f64,
    pub name_threshold: f64,
}

impl HashResolver {
    pub fn new(http: reqwest::Client, web_player: Url) -> Self {
        Self {
            http,
            web_player,
            hashes: Mutex::new(HashMap::new()),
            hash_threshold: DEFAULT_HASH_THRESHOLD,
            name_threshold: DEFAULT_NAME_THRESHOLD,
        }
    }

    /// Pre-populate known hashes; seeded operations never trigger a scan.
    pub async fn seed<I, K, V>(&self, known: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut hashes = self.hashes.lock().await;
        for (op, hash) in known {
            hashes.insert(op.into(), hash.into());
        }
    }

    /// Hash for `operation`, scanning the bundles on a miss.
    pub async fn resolve(&self, operation: &str) -> Result<String, Error> {
        if operation.is_empty() {
            return Err(Error::discovery("operation required"));
        }
        if let Some(hash) = self.cached(operation).await {
            trace!(operation, "hash cache hit");
            return Ok(hash);
        }

        self.load(&[operation]).await?;
        self.cached(operation)
            .await
            .ok_or_else(|| Error::MissingHashes(vec![operation.to_owned()]))
    }

    async fn cached(&self, operation: &str) -> Option<String> {
        self.hashes
            .lock()
            .await
            .get(operation)
            .filter(|h| !h.is_empty())
            .cloned()
    }

    /// Scan for every operation in `ops` not already known.
    #[instrument(skip_all, fields(ops = ?ops))]
    pub async fn load(&self, ops: &[&str]) -> Result<(), Error> {
        let mut need: Vec<String> = {
            let hashes = self.hashes.lock().await;
            ops.iter()
                .filter(|op| !hashes.contains_key(**op))
                .map(|op| (*op).to_owned())
                .collect()
        };
        if need.is_empty() {
            return Ok(());
        }

        let html = self.fetch(&self.web_player).await?;
        let bundle = pick_bundle(&html, &self.web_player)?;
        debug!(bundle = %bundle, "web player bundle located");
        let body = self.fetch(&bundle).await?;

        let (names, hashes) = parse_chunk_maps(&body, self.name_threshold, self.hash_threshold)?;
        let chunks = combine_chunks(&names, &hashes);
        if chunks.is_empty() {
            return Err(Error::discovery("no chunks found"));
        }
        debug!(count = chunks.len(), "scanning bundle chunks");

        for chunk in &chunks {
            let url = bundle.join(chunk)?;
            let text = match self.fetch(&url).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(chunk = %url, error = %e, "skipping chunk");
                    continue;
                }
            };

            let found = find_operation_hashes(&text, &need)?;
            if found.is_empty() {
                continue;
            }
            {
                let mut known = self.hashes.lock().await;
                for (op, hash) in &found {
                    known.entry(op.clone()).or_insert_with(|| hash.clone());
                }
            }
            need.retain(|op| !found.contains_key(op));
            if need.is_empty() {
                return Ok(());
            }
        }

        Err(Error::MissingHashes(need))
    }

    async fn fetch(&self, url: &Url) -> Result<String, Error> {
        trace!(url = %url, "GET");
        let resp = self.http.get(url.clone()).send().await?;
        read_text(resp).await
    }
}

// ── Bundle parsing ──────────────────────────────────────────────────

/// First player bundle script on the landing page, resolved against it.
pub(crate) fn pick_bundle(html: &str, page: &Url) -> Result<Url, Error> {
    SCRIPT_SRC_RE
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .find(|src| {
            src.ends_with(".js")
                && (src.contains("/web-player/") || src.contains("/mobile-web-player/"))
        })
        .ok_or_else(|| Error::discovery("web player bundle not found"))
        .and_then(|src| page.join(src).map_err(Error::from))
}

fn parse_map_literal(raw: &str) -> ChunkMap {
    MAP_ENTRY_RE
        .captures_iter(raw)
        .filter_map(|c| {
            let key = c.get(1)?.as_str().parse().ok()?;
            Some((key, c.get(2)?.as_str().to_owned()))
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn share(map: &ChunkMap, pred: impl Fn(&str) -> bool) -> f64 {
    if map.is_empty() {
        return 0.0;
    }
    let hits = map.values().filter(|v| pred(v)).count();
    hits as f64 / map.len() as f64
}

pub(crate) fn hash_score(map: &ChunkMap) -> f64 {
    share(map, |v| {
        (6..=12).contains(&v.len())
            && v.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    })
}

pub(crate) fn name_score(map: &ChunkMap) -> f64 {
    share(map, |v| v.contains('-') || v.contains('/'))
}

/// Best name map and best hash map among the bundle's id literals.
pub(crate) fn parse_chunk_maps(
    js: &str,
    name_threshold: f64,
    hash_threshold: f64,
) -> Result<(ChunkMap, ChunkMap), Error> {
    let literals: Vec<ChunkMap> = MAP_LITERAL_RE
        .find_iter(js)
        .map(|m| parse_map_literal(m.as_str()))
        .filter(|m| !m.is_empty())
        .collect();
    if literals.is_empty() {
        return Err(Error::discovery("no maps found"));
    }

    let mut best_names: Option<(f64, &ChunkMap)> = None;
    let mut best_hashes: Option<(f64, &ChunkMap)> = None;
    for map in &literals {
        let (ns, hs) = (name_score(map), hash_score(map));
        if ns > name_threshold && best_names.is_none_or(|(s, _)| ns > s) {
            best_names = Some((ns, map));
        }
        if hs > hash_threshold && best_hashes.is_none_or(|(s, _)| hs > s) {
            best_hashes = Some((hs, map));
        }
    }

    match (best_names, best_hashes) {
        (Some((_, names)), Some((_, hashes))) => Ok((names.clone(), hashes.clone())),
        _ => Err(Error::discovery("no suitable maps found")),
    }
}

/// `<name>.<hash>.js` for every chunk id present in both maps, by id.
pub(crate) fn combine_chunks(names: &ChunkMap, hashes: &ChunkMap) -> Vec<String> {
    names
        .iter()
        .filter_map(|(id, name)| {
            let hash = hashes.get(id)?;
            (!name.is_empty() && !hash.is_empty()).then(|| format!("{name}.{hash}.js"))
        })
        .collect()
}

/// Hashes for the operations in `ops` that appear in `body`.
pub(crate) fn find_operation_hashes(
    body: &str,
    ops: &[String],
) -> Result<HashMap<String, String>, Error> {
    let mut found = HashMap::new();
    for op in ops.iter().filter(|op| !op.is_empty()) {
        let pattern = Regex::new(&format!(
            r#"(?s){}.{{0,{OPERATION_WINDOW}}}?sha256Hash":"([a-f0-9]{{64}})""#,
            regex::escape(op)
        ))?;
        if let Some(hash) = pattern.captures(body).and_then(|c| c.get(1)) {
            found.insert(op.clone(), hash.as_str().to_owned());
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn picks_first_player_bundle() {
        let page = Url::parse("https://open.spotify.com/").expect("url");
        let html = r#"<script src="/vendor.js"></script>
            <script defer src="https://cdn.example/cdn/build/web-player/web-player.abc.js"></script>
            <script src="https://cdn.example/cdn/build/mobile-web-player/other.js"></script>"#;
        let url = pick_bundle(html, &page).expect("bundle");
        assert_eq!(
            url.as_str(),
            "https://cdn.example/cdn/build/web-player/web-player.abc.js"
        );
    }

    #[test]
    fn relative_bundle_resolves_against_page() {
        let page = Url::parse("http://127.0.0.1:9000/").expect("url");
        let html = r#"<script src="/cdn/build/web-player/web-player.1.js"></script>"#;
        assert_eq!(
            pick_bundle(html, &page).expect("bundle").as_str(),
            "http://127.0.0.1:9000/cdn/build/web-player/web-player.1.js"
        );
    }

    #[test]
    fn missing_bundle_is_reported() {
        let page = Url::parse("https://open.spotify.com/").expect("url");
        let err = pick_bundle("<html></html>", &page).expect_err("none");
        assert_eq!(err.to_string(), "web player bundle not found");
    }

    #[test]
    fn scores_separate_names_from_hashes() {
        let names = parse_map_literal(r#"{1:"xpui-routes-search",2:"home/feed",3:"plain"}"#);
        let hashes = parse_map_literal(r#"{1:"a1b2c3d4",2:"0f0f0f0f0f",3:"zz"}"#);

        assert!((name_score(&names) - 2.0 / 3.0).abs() < f64::EPSILON);
        assert!(hash_score(&names).abs() < f64::EPSILON);
        assert!((hash_score(&hashes) - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn chunk_maps_pick_best_literal_per_category() {
        let js = r#"var a={1:"xpui-a",2:"xpui-b"};var b={1:"abcdef12",2:"123456ab"};
                    var c={1:"x",2:"y"};"#;
        let (names, hashes) = parse_chunk_maps(js, 0.4, 0.4).expect("maps");
        assert_eq!(
            combine_chunks(&names, &hashes),
            vec!["xpui-a.abcdef12.js", "xpui-b.123456ab.js"]
        );
    }

    #[test]
    fn thresholds_are_tunable() {
        let js = r#"{1:"xpui-a",2:"plain",3:"plain"};{1:"abcdef12",2:"123456ab"}"#;
        assert!(parse_chunk_maps(js, 0.4, 0.4).is_err());
        assert!(parse_chunk_maps(js, 0.3, 0.4).is_ok());
    }

    #[test]
    fn no_literals_is_reported() {
        let err = parse_chunk_maps("var x = 1;", 0.4, 0.4).expect_err("none");
        assert_eq!(err.to_string(), "no maps found");
    }

    #[test]
    fn combine_skips_ids_without_hash() {
        let names = parse_map_literal(r#"{3:"c-c",1:"a-a",2:"b-b"}"#);
        let hashes = parse_map_literal(r#"{1:"111111",3:"333333"}"#);
        assert_eq!(
            combine_chunks(&names, &hashes),
            vec!["a-a.111111.js", "c-c.333333.js"]
        );
    }

    #[test]
    fn operation_hash_within_window() {
        let body = format!(
            r#"x"searchDesktop",{{persisted:{{"sha256Hash":"{HASH}"}}}}"#
        );
        let found =
            find_operation_hashes(&body, &["searchDesktop".into(), "getTrack".into()]).expect("ok");
        assert_eq!(found.get("searchDesktop").map(String::as_str), Some(HASH));
        assert!(!found.contains_key("getTrack"));
    }

    #[test]
    fn operation_hash_beyond_window_is_ignored() {
        let filler = "x".repeat(OPERATION_WINDOW + 10);
        let body = format!(r#"getTrack{filler}sha256Hash":"{HASH}""#);
        let found = find_operation_hashes(&body, &["getTrack".into()]).expect("ok");
        assert!(found.is_empty());
    }
}
