// ── Capability surface ──
//
// Every engine and router implements `SpotifyBackend`. Methods an engine
// has no equivalent for keep the default body, which reports
// `CoreError::Unsupported` so a router can move the call elsewhere.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::model::{
    CursorPage, Device, Item, ItemKind, LibraryKind, Page, PlaybackStatus, Queue, RepeatMode,
    SearchResult,
};

#[async_trait]
pub trait SpotifyBackend: Send + Sync {
    /// Engine name used in logs and `Unsupported` errors.
    fn name(&self) -> &'static str;

    // ── Catalog ──────────────────────────────────────────────────────

    async fn search(
        &self,
        kind: ItemKind,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchResult, CoreError> {
        let _ = (kind, query, limit, offset);
        Err(CoreError::unsupported("search", self.name()))
    }

    async fn item(&self, kind: ItemKind, id: &str) -> Result<Item, CoreError> {
        let _ = (kind, id);
        Err(CoreError::unsupported("info", self.name()))
    }

    // ── Playback ─────────────────────────────────────────────────────

    async fn playback(&self) -> Result<PlaybackStatus, CoreError> {
        Err(CoreError::unsupported("playback status", self.name()))
    }

    /// Resume, or start `uri` (a track or a context) when given.
    async fn play(&self, uri: Option<&str>) -> Result<(), CoreError> {
        let _ = uri;
        Err(CoreError::unsupported("play", self.name()))
    }

    async fn pause(&self) -> Result<(), CoreError> {
        Err(CoreError::unsupported("pause", self.name()))
    }

    async fn next(&self) -> Result<(), CoreError> {
        Err(CoreError::unsupported("next", self.name()))
    }

    async fn previous(&self) -> Result<(), CoreError> {
        Err(CoreError::unsupported("previous", self.name()))
    }

    async fn seek(&self, position_ms: i64) -> Result<(), CoreError> {
        let _ = position_ms;
        Err(CoreError::unsupported("seek", self.name()))
    }

    /// Set volume in percent; values outside 0–100 are clamped.
    async fn volume(&self, percent: i64) -> Result<(), CoreError> {
        let _ = percent;
        Err(CoreError::unsupported("volume", self.name()))
    }

    async fn shuffle(&self, enabled: bool) -> Result<(), CoreError> {
        let _ = enabled;
        Err(CoreError::unsupported("shuffle", self.name()))
    }

    async fn repeat(&self, mode: RepeatMode) -> Result<(), CoreError> {
        let _ = mode;
        Err(CoreError::unsupported("repeat", self.name()))
    }

    // ── Devices and queue ────────────────────────────────────────────

    async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        Err(CoreError::unsupported("devices", self.name()))
    }

    async fn transfer(&self, device_id: &str) -> Result<(), CoreError> {
        let _ = device_id;
        Err(CoreError::unsupported("transfer", self.name()))
    }

    async fn queue_add(&self, uri: &str) -> Result<(), CoreError> {
        let _ = uri;
        Err(CoreError::unsupported("queue add", self.name()))
    }

    async fn queue(&self) -> Result<Queue, CoreError> {
        Err(CoreError::unsupported("queue", self.name()))
    }

    // ── Library ──────────────────────────────────────────────────────

    async fn library(
        &self,
        kind: LibraryKind,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Item>, CoreError> {
        let _ = (kind, limit, offset);
        Err(CoreError::unsupported("library", self.name()))
    }

    /// Save (`save = true`) or remove ids from a library collection.
    async fn library_modify(
        &self,
        kind: LibraryKind,
        ids: &[String],
        save: bool,
    ) -> Result<(), CoreError> {
        let _ = (kind, ids, save);
        Err(CoreError::unsupported("library update", self.name()))
    }

    async fn follow_artists(&self, ids: &[String], follow: bool) -> Result<(), CoreError> {
        let _ = (ids, follow);
        Err(CoreError::unsupported("follow", self.name()))
    }

    async fn followed_artists(
        &self,
        limit: u32,
        after: Option<&str>,
    ) -> Result<CursorPage<Item>, CoreError> {
        let _ = (limit, after);
        Err(CoreError::unsupported("followed artists", self.name()))
    }

    // ── Playlists ────────────────────────────────────────────────────

    async fn playlists(&self, limit: u32, offset: u32) -> Result<Page<Item>, CoreError> {
        let _ = (limit, offset);
        Err(CoreError::unsupported("playlists", self.name()))
    }

    async fn playlist_tracks(
        &self,
        id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Item>, CoreError> {
        let _ = (id, limit, offset);
        Err(CoreError::unsupported("playlist tracks", self.name()))
    }

    async fn create_playlist(
        &self,
        name: &str,
        public: bool,
        collaborative: bool,
    ) -> Result<Item, CoreError> {
        let _ = (name, public, collaborative);
        Err(CoreError::unsupported("create playlist", self.name()))
    }

    async fn add_playlist_tracks(&self, id: &str, uris: &[String]) -> Result<(), CoreError> {
        let _ = (id, uris);
        Err(CoreError::unsupported("playlist add", self.name()))
    }

    async fn remove_playlist_tracks(&self, id: &str, uris: &[String]) -> Result<(), CoreError> {
        let _ = (id, uris);
        Err(CoreError::unsupported("playlist remove", self.name()))
    }
}
