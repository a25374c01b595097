// ── Web-first fallback router ──
//
// The web engine serves everything. Playback-affecting calls move to the
// connect engine when the web engine is rate limited; catalog reads stay
// on web, and library, follow and playlist calls go to web unconditionally.

use std::sync::Arc;

use async_trait::async_trait;

use super::{FallbackPolicy, cascade};
use crate::backend::SpotifyBackend;
use crate::error::CoreError;
use crate::model::{
    CursorPage, Device, Item, ItemKind, LibraryKind, Page, PlaybackStatus, Queue, RepeatMode,
    SearchResult,
};

const POLICY: FallbackPolicy = FallbackPolicy::RateLimitedOnly;

pub struct FallbackRouter {
    web: Arc<dyn SpotifyBackend>,
    connect: Option<Arc<dyn SpotifyBackend>>,
}

impl FallbackRouter {
    pub fn new(web: Arc<dyn SpotifyBackend>, connect: Option<Arc<dyn SpotifyBackend>>) -> Self {
        Self { web, connect }
    }

    fn pair(&self) -> (&dyn SpotifyBackend, Option<&dyn SpotifyBackend>) {
        (self.web.as_ref(), self.connect.as_deref())
    }
}

#[async_trait]
impl SpotifyBackend for FallbackRouter {
    fn name(&self) -> &'static str {
        "web"
    }

    // ── Web only ─────────────────────────────────────────────────────

    async fn search(
        &self,
        kind: ItemKind,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchResult, CoreError> {
        self.web.search(kind, query, limit, offset).await
    }

    async fn item(&self, kind: ItemKind, id: &str) -> Result<Item, CoreError> {
        self.web.item(kind, id).await
    }

    async fn library(
        &self,
        kind: LibraryKind,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Item>, CoreError> {
        self.web.library(kind, limit, offset).await
    }

    async fn library_modify(
        &self,
        kind: LibraryKind,
        ids: &[String],
        save: bool,
    ) -> Result<(), CoreError> {
        self.web.library_modify(kind, ids, save).await
    }

    async fn follow_artists(&self, ids: &[String], follow: bool) -> Result<(), CoreError> {
        self.web.follow_artists(ids, follow).await
    }

    async fn followed_artists(
        &self,
        limit: u32,
        after: Option<&str>,
    ) -> Result<CursorPage<Item>, CoreError> {
        self.web.followed_artists(limit, after).await
    }

    async fn playlists(&self, limit: u32, offset: u32) -> Result<Page<Item>, CoreError> {
        self.web.playlists(limit, offset).await
    }

    async fn playlist_tracks(
        &self,
        id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Page<Item>, CoreError> {
        self.web.playlist_tracks(id, limit, offset).await
    }

    async fn create_playlist(
        &self,
        name: &str,
        public: bool,
        collaborative: bool,
    ) -> Result<Item, CoreError> {
        self.web.create_playlist(name, public, collaborative).await
    }

    async fn add_playlist_tracks(&self, id: &str, uris: &[String]) -> Result<(), CoreError> {
        self.web.add_playlist_tracks(id, uris).await
    }

    async fn remove_playlist_tracks(&self, id: &str, uris: &[String]) -> Result<(), CoreError> {
        self.web.remove_playlist_tracks(id, uris).await
    }

    // ── Connect on 429 ───────────────────────────────────────────────

    async fn playback(&self) -> Result<PlaybackStatus, CoreError> {
        let (web, connect) = self.pair();
        cascade("playback", web, connect, POLICY, |b| b.playback()).await
    }

    async fn play(&self, uri: Option<&str>) -> Result<(), CoreError> {
        let (web, connect) = self.pair();
        cascade("play", web, connect, POLICY, |b| b.play(uri)).await
    }

    async fn pause(&self) -> Result<(), CoreError> {
        let (web, connect) = self.pair();
        cascade("pause", web, connect, POLICY, |b| b.pause()).await
    }

    async fn next(&self) -> Result<(), CoreError> {
        let (web, connect) = self.pair();
        cascade("next", web, connect, POLICY, |b| b.next()).await
    }

    async fn previous(&self) -> Result<(), CoreError> {
        let (web, connect) = self.pair();
        cascade("previous", web, connect, POLICY, |b| b.previous()).await
    }

    async fn seek(&self, position_ms: i64) -> Result<(), CoreError> {
        let (web, connect) = self.pair();
        cascade("seek", web, connect, POLICY, |b| b.seek(position_ms)).await
    }

    async fn volume(&self, percent: i64) -> Result<(), CoreError> {
        let (web, connect) = self.pair();
        cascade("volume", web, connect, POLICY, |b| b.volume(percent)).await
    }

    async fn shuffle(&self, enabled: bool) -> Result<(), CoreError> {
        let (web, connect) = self.pair();
        cascade("shuffle", web, connect, POLICY, |b| b.shuffle(enabled)).await
    }

    async fn repeat(&self, mode: RepeatMode) -> Result<(), CoreError> {
        let (web, connect) = self.pair();
        cascade("repeat", web, connect, POLICY, |b| b.repeat(mode)).await
    }

    async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        let (web, connect) = self.pair();
        cascade("devices", web, connect, POLICY, |b| b.devices()).await
    }

    async fn transfer(&self, device_id: &str) -> Result<(), CoreError> {
        let (web, connect) = self.pair();
        cascade("transfer", web, connect, POLICY, |b| b.transfer(device_id)).await
    }

    async fn queue_add(&self, uri: &str) -> Result<(), CoreError> {
        let (web, connect) = self.pair();
        cascade("queue add", web, connect, POLICY, |b| b.queue_add(uri)).await
    }

    async fn queue(&self) -> Result<Queue, CoreError> {
        let (web, connect) = self.pair();
        cascade("queue", web, connect, POLICY, |b| b.queue()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::router::testing::{Script, Scripted};

    fn router(web: Script, connect: Script) -> (FallbackRouter, Arc<Scripted>, Arc<Scripted>) {
        let w = Arc::new(Scripted::new("web", web));
        let c = Arc::new(Scripted::new("connect", connect));
        let router = FallbackRouter::new(w.clone(), Some(c.clone()));
        (router, w, c)
    }

    #[tokio::test]
    async fn playback_moves_to_connect_on_429() {
        let (router, w, c) = router(Script::Status(429), Script::Ok);
        router.pause().await.expect("connect serves");
        assert_eq!(w.calls(), 1);
        assert_eq!(c.calls(), 1);
    }

    #[tokio::test]
    async fn unsupported_is_not_a_fallback_trigger() {
        let (router, _, c) = router(Script::Unsupported, Script::Ok);
        let err = router.playback().await.expect_err("web error surfaces");
        assert!(err.is_unsupported());
        assert_eq!(c.calls(), 0);
    }

    #[tokio::test]
    async fn search_stays_on_web_even_when_rate_limited() {
        let (router, _, c) = router(Script::Status(429), Script::Ok);
        let err = router
            .search(ItemKind::Album, "blue", 10, 0)
            .await
            .expect_err("no fallback");
        assert!(err.is_rate_limited());
        assert_eq!(c.calls(), 0);
    }

    #[tokio::test]
    async fn library_goes_to_web_only() {
        let (router, w, c) = router(Script::Status(429), Script::Ok);
        assert!(router.library(LibraryKind::Tracks, 10, 0).await.is_err());
        assert_eq!(w.calls(), 1);
        assert_eq!(c.calls(), 0);
    }
}
