// ── Web engine ──
//
// The documented Web API behind the full capability surface.

use async_trait::async_trait;
use spogo_api::WebClient;
use spogo_api::web::library::SavedCollection;
use tracing::debug;

use super::effective_limit;
use crate::backend::SpotifyBackend;
use crate::convert::search_item;
use crate::error::CoreError;
use crate::model::{
    CursorPage, Device, Item, ItemKind, LibraryKind, Page, PlaybackStatus, Queue, RepeatMode,
    SearchResult,
};

#[derive(Debug, Clone)]
pub struct WebEngine {
    client: WebClient,
}

impl WebEngine {
    pub fn new(client: WebClient) -> Self {
        Self { client }
    }
}

fn collection(kind: LibraryKind) -> SavedCollection {
    match kind {
        LibraryKind::Tracks => SavedCollection::Tracks,
        LibraryKind::Albums => SavedCollection::Albums,
    }
}

fn page<T: Into<Item>>((items, total): (Vec<T>, u64)) -> Page<Item> {
    Page {
        items: items.into_iter().map(Into::into).collect(),
        total,
    }
}

#[async_trait]
impl SpotifyBackend for WebEngine {
    fn name(&self) -> &'static str {
        "web"
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
        let container = self
            .client
            .search(kind.as_str(), query, limit, offset)
            .await?;
        let mut items = Vec::with_capacity(container.items.len());
        for raw in container.items {
            if let Some(item) = search_item(kind, raw)? {
                items.push(item);
            }
        }
        debug!(%kind, count = items.len(), total = container.total, "web search");
        Ok(SearchResult {
            kind,
            limit: if container.limit == 0 { limit } else { container.limit },
            offset: container.offset,
            total: container.total,
            items,
        })
    }

    async fn item(&self, kind: ItemKind, id: &str) -> Result<Item, CoreError> {
        let item = match kind {
            ItemKind::Track => self.client.track(id).await?.into(),
            ItemKind::Album => self.client.album(id).await?.into(),
            ItemKind::Artist => self.client.artist(id).await?.into(),
            ItemKind::Playlist => self.client.playlist(id).await?.into(),
            ItemKind::Show => self.client.show(id).await?.into(),
            ItemKind::Episode => self.client.episode(id).await?.into(),
        };
        Ok(item)
    }

    async fn playback(&self) -> Result<PlaybackStatus, CoreError> {
        Ok(self
            .client
            .playback_state()
            .await?
            .map(PlaybackStatus::from)
            .unwrap_or_default())
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
        Ok(self.client.volume(percent).await?)
    }

    async fn shuffle(&self, enabled: bool) -> Result<(), CoreError> {
        Ok(self.client.shuffle(enabled).await?)
    }

    async fn repeat(&self, mode: RepeatMode) -> Result<(), CoreError> {
        Ok(self.client.repeat(mode.as_str()).await?)
    }

    async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        let devices = self.client.devices().await?;
        Ok(devices.into_iter().map(Device::from).collect())
    }

    async fn transfer(&self, device_id: &str) -> Result<(), CoreError> {
        Ok(self.client.transfer(device_id).await?)
    }

    async fn queue_add(&self, uri: &str) -> Result<(), CoreError> {
        Ok(self.client.queue_add(uri).await?)
    }

    async fn queue(&self) -> Result<Queue, CoreError> {
        Ok(self.client.queue().await?.into())
    }

    async fn library(
        &self,
        kind: LibraryKind,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Item>, CoreError> {
        let limit = effective_limit(limit);
        match kind {
            LibraryKind::Tracks => Ok(page(self.client.saved_tracks(limit, offset).await?)),
            LibraryKind::Albums => Ok(page(self.client.saved_albums(limit, offset).await?)),
        }
    }

    async fn library_modify(
        &self,
        kind: LibraryKind,
        ids: &[String],
        save: bool,
    ) -> Result<(), CoreError> {
        if ids.is_empty() {
            return Err(CoreError::validation("at least one id required"));
        }
        Ok(self.client.modify_saved(collection(kind), ids, save).await?)
    }

    async fn follow_artists(&self, ids: &[String], follow: bool) -> Result<(), CoreError> {
        if ids.is_empty() {
            return Err(CoreError::validation("at least one id required"));
        }
        Ok(self.client.modify_followed_artists(ids, follow).await?)
    }

    async fn followed_artists(
        &self,
        limit: u32,
        after: Option<&str>,
    ) -> Result<CursorPage<Item>, CoreError> {
        let resp = self
            .client
            .followed_artists(effective_limit(limit), after)
            .await?;
        Ok(CursorPage {
            items: resp.items.into_iter().map(Item::from).collect(),
            total: resp.total,
            next_after: resp.next_after,
        })
    }

    async fn playlists(&self, limit: u32, offset: u32) -> Result<Page<Item>, CoreError> {
        Ok(page(
            self.client.playlists(effective_limit(limit), offset).await?,
        ))
    }

    async fn playlist_tracks(
        &self,
        id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Item>, CoreError> {
        Ok(page(
            self.client
                .playlist_tracks(id, effective_limit(limit), offset)
                .await?,
        ))
    }

    async fn create_playlist(
        &self,
        name: &str,
        public: bool,
        collaborative: bool,
    ) -> Result<Item, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::validation("playlist name required"));
        }
        Ok(self
            .client
            .create_playlist(name, public, collaborative)
            .await?
            .into())
    }

    async fn add_playlist_tracks(&self, id: &str, uris: &[String]) -> Result<(), CoreError> {
        if uris.is_empty() {
            return Err(CoreError::validation("at least one uri required"));
        }
        Ok(self.client.add_playlist_tracks(id, uris).await?)
    }

    async fn remove_playlist_tracks(&self, id: &str, uris: &[String]) -> Result<(), CoreError> {
        if uris.is_empty() {
            return Err(CoreError::validation("at least one uri required"));
        }
        Ok(self.client.remove_playlist_tracks(id, uris).await?)
    }
}
