// ── Auto router ──
//
// Primary/secondary cascade over the whole surface: unsupported and
// rate-limited primary calls are retried on the secondary.

use std::sync::Arc;

use async_trait::async_trait;

use super::{FallbackPolicy, cascade};
use crate::backend::SpotifyBackend;
use crate::error::CoreError;
use crate::model::{
    CursorPage, Device, Item, ItemKind, LibraryKind, Page, PlaybackStatus, Queue, RepeatMode,
    SearchResult,
};

const POLICY: FallbackPolicy = FallbackPolicy::UnsupportedOrRateLimited;

pub struct AutoRouter {
    primary: Arc<dyn SpotifyBackend>,
    secondary: Option<Arc<dyn SpotifyBackend>>,
}

impl AutoRouter {
    pub fn new(primary: Arc<dyn SpotifyBackend>, secondary: Option<Arc<dyn SpotifyBackend>>) -> Self {
        Self { primary, secondary }
    }

    fn pair(&self) -> (&dyn SpotifyBackend, Option<&dyn SpotifyBackend>) {
        (self.primary.as_ref(), self.secondary.as_deref())
    }
}

#[async_trait]
impl SpotifyBackend for AutoRouter {
    fn name(&self) -> &'static str {
        "auto"
    }

    async fn search(
        &self,
        kind: ItemKind,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchResult, CoreError> {
        let (primary, secondary) = self.pair();
        cascade("search", primary, secondary, POLICY, |b| {
            b.search(kind, query, limit, offset)
        })
        .await
    }

    async fn item(&self, kind: ItemKind, id: &str) -> Result<Item, CoreError> {
        let (primary, secondary) = self.pair();
        cascade("info", primary, secondary, POLICY, |b| b.item(kind, id)).await
    }

    async fn playback(&self) -> Result<PlaybackStatus, CoreError> {
        let (primary, secondary) = self.pair();
        cascade("playback", primary, secondary, POLICY, |b| b.playback()).await
    }

    async fn play(&self, uri: Option<&str>) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("play", primary, secondary, POLICY, |b| b.play(uri)).await
    }

    async fn pause(&self) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("pause", primary, secondary, POLICY, |b| b.pause()).await
    }

    async fn next(&self) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("next", primary, secondary, POLICY, |b| b.next()).await
    }

    async fn previous(&self) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("previous", primary, secondary, POLICY, |b| b.previous()).await
    }

    async fn seek(&self, position_ms: i64) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("seek", primary, secondary, POLICY, |b| b.seek(position_ms)).await
    }

    async fn volume(&self, percent: i64) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("volume", primary, secondary, POLICY, |b| b.volume(percent)).await
    }

    async fn shuffle(&self, enabled: bool) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("shuffle", primary, secondary, POLICY, |b| b.shuffle(enabled)).await
    }

    async fn repeat(&self, mode: RepeatMode) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("repeat", primary, secondary, POLICY, |b| b.repeat(mode)).await
    }

    async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        let (primary, secondary) = self.pair();
        cascade("devices", primary, secondary, POLICY, |b| b.devices()).await
    }

    async fn transfer(&self, device_id: &str) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("transfer", primary, secondary, POLICY, |b| b.transfer(device_id)).await
    }

    async fn queue_add(&self, uri: &str) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("queue add", primary, secondary, POLICY, |b| b.queue_add(uri)).await
    }

    async fn queue(&self) -> Result<Queue, CoreError> {
        let (primary, secondary) = self.pair();
        cascade("queue", primary, secondary, POLICY, |b| b.queue()).await
    }

    async fn library(
        &self,
        kind: LibraryKind,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Item>, CoreError> {
        let (primary, secondary) = self.pair();
        cascade("library", primary, secondary, POLICY, |b| {
            b.library(kind, limit, offset)
        })
        .await
    }

    async fn library_modify(
        &self,
        kind: LibraryKind,
        ids: &[String],
        save: bool,
    ) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("library update", primary, secondary, POLICY, |b| {
            b.library_modify(kind, ids, save)
        })
        .await
    }

    async fn follow_artists(&self, ids: &[String], follow: bool) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("follow", primary, secondary, POLICY, |b| {
            b.follow_artists(ids, follow)
        })
        .await
    }

    async fn followed_artists(
        &self,
        limit: u32,
        after: Option<&str>,
    ) -> Result<CursorPage<Item>, CoreError> {
        let (primary, secondary) = self.pair();
        cascade("followed artists", primary, secondary, POLICY, |b| {
            b.followed_artists(limit, after)
        })
        .await
    }

    async fn playlists(&self, limit: u32, offset: u32) -> Result<Page<Item>, CoreError> {
        let (primary, secondary) = self.pair();
        cascade("playlists", primary, secondary, POLICY, |b| {
            b.playlists(limit, offset)
        })
        .await
    }

    async fn playlist_tracks(
        &self,
        id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Item>, CoreError> {
        let (primary, secondary) = self.pair();
        cascade("playlist tracks", primary, secondary, POLICY, |b| {
            b.playlist_tracks(id, limit, offset)
        })
        .await
    }

    async fn create_playlist(
        &self,
        name: &str,
        public: bool,
        collaborative: bool,
    ) -> Result<Item, CoreError> {
        let (primary, secondary) = self.pair();
        cascade("create playlist", primary, secondary, POLICY, |b| {
            b.create_playlist(name, public, collaborative)
        })
        .await
    }

    async fn add_playlist_tracks(&self, id: &str, uris: &[String]) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("playlist add", primary, secondary, POLICY, |b| {
            b.add_playlist_tracks(id, uris)
        })
        .await
    }

    async fn remove_playlist_tracks(&self, id: &str, uris: &[String]) -> Result<(), CoreError> {
        let (primary, secondary) = self.pair();
        cascade("playlist remove", primary, secondary, POLICY, |b| {
            b.remove_playlist_tracks(id, uris)
        })
        .await
    }
}
