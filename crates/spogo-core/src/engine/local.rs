// ── Local engine ──
//
// Drives the desktop app through AppleScript. Playback control is served
// locally; everything else goes to the fallback backend. Transfer has no
// local meaning and is always unsupported.

use std::sync::Arc;

use async_trait::async_trait;
use spogo_api::{LocalPlayer, LocalStatus};

use crate::backend::SpotifyBackend;
use crate::error::CoreError;
use crate::model::{
    CursorPage, Device, Item, ItemKind, LibraryKind, Page, PlaybackStatus, Queue, RepeatMode,
    SearchResult,
};

pub const LOCAL_DEVICE_ID: &str = "local";
pub const LOCAL_DEVICE_NAME: &str = "Local Spotify";

pub struct LocalEngine {
    player: LocalPlayer,
    fallback: Option<Arc<dyn SpotifyBackend>>,
}

impl LocalEngine {
    pub fn new(player: LocalPlayer) -> Self {
        Self {
            player,
            fallback: None,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn SpotifyBackend>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    fn fallback(&self, operation: &str) -> Result<&dyn SpotifyBackend, CoreError> {
        self.fallback
            .as_deref()
            .ok_or_else(|| CoreError::unsupported(operation, "applescript"))
    }
}

fn local_device(volume: u32) -> Device {
    Device {
        id: LOCAL_DEVICE_ID.into(),
        name: LOCAL_DEVICE_NAME.into(),
        device_type: "COMPUTER".into(),
        volume,
        active: true,
        restricted: false,
    }
}

fn status_from_local(status: LocalStatus) -> PlaybackStatus {
    let item = Item::from_uri(&status.track_uri).map(|mut item| {
        item.name = status.track_name;
        item.artists = vec![status.artist]
            .into_iter()
            .filter(|a| !a.is_empty())
            .collect();
        item.album = Some(status.album).filter(|a| !a.is_empty());
        item.duration_ms = Some(status.duration_ms).filter(|ms| *ms > 0);
        item
    });
    PlaybackStatus {
        is_playing: status.playing,
        progress_ms: status.position_ms,
        item,
        device: local_device(status.volume.min(100)),
        shuffle: status.shuffling,
        repeat: if status.repeating {
            RepeatMode::Context
        } else {
            RepeatMode::Off
        },
    }
}

#[async_trait]
impl SpotifyBackend for LocalEngine {
    fn name(&self) -> &'static str {
        "applescript"
    }

    // ── Served locally ───────────────────────────────────────────────

    async fn playback(&self) -> Result<PlaybackStatus, CoreError> {
        Ok(status_from_local(self.player.status().await?))
    }

    async fn play(&self, uri: Option<&str>) -> Result<(), CoreError> {
        Ok(self.player.play(uri).await?)
    }

    async fn pause(&self) -> Result<(), CoreError> {
        Ok(self.player.pause().await?)
    }

    async fn next(&self) -> Result<(), CoreError> {
        Ok(self.player.next().await?)
    }

    async fn previous(&self) -> Result<(), CoreError> {
        Ok(self.player.previous().await?)
    }

    async fn seek(&self, position_ms: i64) -> Result<(), CoreError> {
        Ok(self.player.seek(position_ms).await?)
    }

    async fn volume(&self, percent: i64) -> Result<(), CoreError> {
        Ok(self.player.set_volume(percent).await?)
    }

    async fn shuffle(&self, enabled: bool) -> Result<(), CoreError> {
        Ok(self.player.set_shuffling(enabled).await?)
    }

    /// The app only knows "repeating"; track and context both turn it on.
    async fn repeat(&self, mode: RepeatMode) -> Result<(), CoreError> {
        Ok(self.player.set_repeating(mode != RepeatMode::Off).await?)
    }

    async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        if !LocalPlayer::available() {
            return Err(CoreError::unsupported("devices", "applescript"));
        }
        Ok(vec![local_device(0)])
    }

    async fn transfer(&self, _device_id: &str) -> Result<(), CoreError> {
        Err(CoreError::unsupported("transfer", self.name()))
    }

    // ── Delegated ────────────────────────────────────────────────────

    async fn search(
        &self,
        kind: ItemKind,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchResult, CoreError> {
        self.fallback("search")?
            .search(kind, query, limit, offset)
            .await
    }

    async fn item(&self, kind: ItemKind, id: &str) -> Result<Item, CoreError> {
        self.fallback("info")?.item(kind, id).await
    }

    async fn queue_add(&self, uri: &str) -> Result<(), CoreError> {
        self.fallback("queue add")?.queue_add(uri).await
    }

    async fn queue(&self) -> Result<Queue, CoreError> {
        self.fallback("queue")?.queue().await
    }

    async fn library(
        &self,
        kind: LibraryKind,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Item>, CoreError> {
        self.fallback("library")?.library(kind, limit, offset).await
    }

    async fn library_modify(
        &self,
        kind: LibraryKind,
        ids: &[String],
        save: bool,
    ) -> Result<(), CoreError> {
        self.fallback("library update")?
            .library_modify(kind, ids, save)
            .await
    }

    async fn follow_artists(&self, ids: &[String], follow: bool) -> Result<(), CoreError> {
        self.fallback("follow")?.follow_artists(ids, follow).await
    }

    async fn followed_artists(
        &self,
        limit: u32,
        after: Option<&str>,
    ) -> Result<CursorPage<Item>, CoreError> {
        self.fallback("followed artists")?
            .followed_artists(limit, after)
            .await
    }

    async fn playlists(&self, limit: u32, offset: u32) -> Result<Page<Item>, CoreError> {
        self.fallback("playlists")?.playlists(limit, offset).await
    }

    async fn playlist_tracks(
        &self,
        id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Item>, CoreError> {
        self.fallback("playlist tracks")?
            .playlist_tracks(id, limit, offset)
            .await
    }

    async fn create_playlist(
        &self,
        name: &str,
        public: bool,
        collaborative: bool,
    ) -> Result<Item, CoreError> {
        self.fallback("create playlist")?
            .create_playlist(name, public, collaborative)
            .await
    }

    async fn add_playlist_tracks(&self, id: &str, uris: &[String]) -> Result<(), CoreError> {
        self.fallback("playlist add")?
            .add_playlist_tracks(id, uris)
            .await
    }

    async fn remove_playlist_tracks(&self, id: &str, uris: &[String]) -> Result<(), CoreError> {
        self.fallback("playlist remove")?
            .remove_playlist_tracks(id, uris)
            .await
    }
}
