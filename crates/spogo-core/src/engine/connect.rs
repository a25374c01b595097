// ── Connect engine ──
//
// Catalog reads go through pathfinder persisted queries; playback and
// device control go through connect-state commands. A failed pathfinder
// call is retried once on the web engine when one is attached. Library,
// follow and playlist calls have no private equivalent and stay
// unsupported.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use spogo_api::{ConnectClient, Pathfinder};
use tracing::{debug, warn};

use super::effective_limit;
use crate::backend::SpotifyBackend;
use crate::convert::{extract_item_from_payload, extract_search_items, map_devices, map_playback, map_queue};
use crate::error::CoreError;
use crate::model::{Device, Item, ItemKind, PlaybackStatus, Queue, RepeatMode, SearchResult};

const TOP_RESULTS: u32 = 5;
const LOOKUP_PAGE: u32 = 25;

pub struct ConnectEngine {
    client: Arc<ConnectClient>,
    pathfinder: Pathfinder,
    web: Option<Arc<dyn SpotifyBackend>>,
    language: String,
}

impl ConnectEngine {
    pub fn new(client: Arc<ConnectClient>, pathfinder: Pathfinder) -> Self {
        Self {
            client,
            pathfinder,
            web: None,
            language: String::new(),
        }
    }

    /// Engine used when a pathfinder lookup or search fails.
    #[must_use]
    pub fn with_web(mut self, web: Arc<dyn SpotifyBackend>) -> Self {
        self.web = Some(web);
        self
    }

    /// Locale passed to artist overview queries.
    #[must_use]
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.unwrap_or_default();
        self
    }

    /// Operation name and variables for a single-item lookup.
    fn lookup_query(&self, kind: ItemKind, id: &str) -> (&'static str, Value) {
        let uri = kind.uri(id);
        match kind {
            ItemKind::Track => ("getTrack", json!({ "uri": uri })),
            ItemKind::Album => ("getAlbum", json!({ "uri": uri })),
            ItemKind::Artist => (
                "queryArtistOverview",
                json!({ "uri": uri, "locale": self.language }),
            ),
            ItemKind::Playlist => (
                "fetchPlaylist",
                json!({
                    "uri": uri,
                    "offset": 0,
                    "limit": LOOKUP_PAGE,
                    "enableWatchFeedEntrypoint": false,
                }),
            ),
            ItemKind::Show => (
                "queryPodcastEpisodes",
                json!({ "uri": uri, "offset": 0, "limit": LOOKUP_PAGE }),
            ),
            ItemKind::Episode => ("getEpisodeOrChapter", json!({ "uri": uri })),
        }
    }

    async fn lookup(&self, kind: ItemKind, id: &str) -> Result<Item, CoreError> {
        let (operation, variables) = self.lookup_query(kind, id);
        let payload = self.pathfinder.query(operation, variables).await?;
        extract_item_from_payload(&payload, kind).ok_or_else(|| CoreError::NotFound {
            kind: kind.to_string(),
            id: id.to_owned(),
        })
    }

    async fn pathfinder_search(
        &self,
        kind: ItemKind,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchResult, CoreError> {
        let variables = json!({
            "searchTerm": query,
            "offset": offset,
            "limit": limit,
            "numberOfTopResults": TOP_RESULTS,
            "includeAudiobooks": true,
            "includePreReleases": true,
            "includeLocalConcertsField": false,
            "includeArtistHasConcertsField": false,
        });
        let payload = self.pathfinder.query("searchDesktop", variables).await?;
        let (items, total) = extract_search_items(&payload, kind);
        debug!(%kind, count = items.len(), total, "pathfinder search");
        Ok(SearchResult {
            kind,
            limit,
            offset,
            total,
            items,
        })
    }

    /// The web engine when `err` warrants a second attempt there.
    fn web_retry(&self, operation: &str, err: &CoreError) -> Option<&dyn SpotifyBackend> {
        if err.is_cancelled() {
            return None;
        }
        let web = self.web.as_deref()?;
        warn!(operation, error = %err, "pathfinder failed, retrying on web");
        Some(web)
    }
}

#[async_trait]
impl SpotifyBackend for ConnectEngine {
    fn name(&self) -> &'static str {
        "connect"
    }

    async fn search(
        &self,
        kind: ItemKind,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchResult, CoreError> {
        if query.trim().is_empty() {
            return Err(CoreError::validation("query required"));
        }
        let limit = effective_limit(limit);
        match self.pathfinder_search(kind, query, limit, offset).await {
            Ok(result) => Ok(result),
            Err(err) => match self.web_retry("search", &err) {
                Some(web) => web.search(kind, query, limit, offset).await,
                None => Err(err),
            },
        }
    }

    async fn item(&self, kind: ItemKind, id: &str) -> Result<Item, CoreError> {
        match self.lookup(kind, id).await {
            Ok(item) => Ok(item),
            Err(err) => match self.web_retry("info", &err) {
                Some(web) => web.item(kind, id).await,
                None => Err(err),
            },
        }
    }

    async fn playback(&self) -> Result<PlaybackStatus, CoreError> {
        let state = self.client.state().await?;
        Ok(map_playback(&state))
    }

    async fn play(&self, uri: Option<&str>) -> Result<(), CoreError> {
        Ok(self.client.play(uri).await?)
    }

    async fn pause(&self) -> Result<(), CoreError> {
        Ok(self.client.pause().await?)
    }

    async fn next(&self) -> Result<(), CoreError> {
        Ok(self.client.next().await?)
    }

    async fn previous(&self) -> Result<(), CoreError> {
        Ok(self.client.previous().await?)
    }

    async fn seek(&self, position_ms: i64) -> Result<(), CoreError> {
        Ok(self.client.seek(position_ms).await?)
    }

    async fn volume(&self, percent: i64) -> Result<(), CoreError> {
        Ok(self.client.set_volume(percent).await?)
    }

    async fn shuffle(&self, enabled: bool) -> Result<(), CoreError> {
        Ok(self.client.shuffle(enabled).await?)
    }

    async fn repeat(&self, mode: RepeatMode) -> Result<(), CoreError> {
        let (track, context) = mode.flags();
        Ok(self.client.repeat(track, context).await?)
    }

    async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        let state = self.client.state().await?;
        Ok(map_devices(&state))
    }

    async fn transfer(&self, device_id: &str) -> Result<(), CoreError> {
        Ok(self.client.transfer(device_id).await?)
    }

    async fn queue_add(&self, uri: &str) -> Result<(), CoreError> {
        Ok(self.client.queue_add(uri).await?)
    }

    async fn queue(&self) -> Result<Queue, CoreError> {
        let state = self.client.state().await?;
        Ok(map_queue(&state))
    }
}
