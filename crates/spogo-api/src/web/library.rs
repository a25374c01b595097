// Web API library endpoints
//
// Saved tracks and albums, followed artists, and the user's playlists.

use reqwest::Method;
use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::web::models::{
    Album, Artist, FollowedArtists, Paged, Playlist, PlaylistEntry, SavedAlbum, SavedTrack,
    Track, UserProfile,
};
use crate::web::{NO_BODY, WebClient};

/// Saved-item collections under `/me`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedCollection {
    Tracks,
    Albums,
}

impl SavedCollection {
    fn path(self) -> &'static str {
        match self {
            Self::Tracks => "me/tracks",
            Self::Albums => "me/albums",
        }
    }
}

/// One page of followed artists plus the cursor for the next.
#[derive(Debug, Clone, Default)]
pub struct ArtistCursorPage {
    pub items: Vec<Artist>,
    pub total: u64,
    /// Id of the last artist on this page, empty when the page is empty.
    pub next_after: String,
}

fn page_params(limit: u32, offset: u32) -> Vec<(&'static str, String)> {
    vec![("limit", limit.to_string()), ("offset", offset.to_string())]
}

impl WebClient {
    // ── Saved items ─────────────────────────────────────────────────

    /// `GET /me/tracks`
    pub async fn saved_tracks(&self, limit: u32, offset: u32) -> Result<(Vec<Track>, u64), Error> {
        let page: Paged<SavedTrack> = self
            .get(SavedCollection::Tracks.path(), page_params(limit, offset))
            .await?;
        let items = page.items.into_iter().filter_map(|s| s.track).collect();
        Ok((items, page.total))
    }

    /// `GET /me/albums`
    pub async fn saved_albums(&self, limit: u32, offset: u32) -> Result<(Vec<Album>, u64), Error> {
        let page: Paged<SavedAlbum> = self
            .get(SavedCollection::Albums.path(), page_params(limit, offset))
            .await?;
        let items = page.items.into_iter().filter_map(|s| s.album).collect();
        Ok((items, page.total))
    }

    /// `PUT` (save) or `DELETE` (remove) `/me/{tracks,albums}?ids=`
    pub async fn modify_saved(
        &self,
        collection: SavedCollection,
        ids: &[String],
        save: bool,
    ) -> Result<(), Error> {
        let method = if save { Method::PUT } else { Method::DELETE };
        debug!(?collection, count = ids.len(), save, "modifying library");
        self.execute(
            method,
            collection.path(),
            vec![("ids", ids.join(","))],
            NO_BODY,
        )
        .await
    }

    // ── Follows ─────────────────────────────────────────────────────

    /// `PUT` (follow) or `DELETE` (unfollow) `/me/following?type=artist&ids=`
    pub async fn modify_followed_artists(&self, ids: &[String], follow: bool) -> Result<(), Error> {
        let method = if follow { Method::PUT } else { Method::DELETE };
        self.execute(
            method,
            "me/following",
            vec![("type", "artist".to_owned()), ("ids", ids.join(","))],
            NO_BODY,
        )
        .await
    }

    /// `GET /me/following?type=artist`, cursor-paged by `after`.
    pub async fn followed_artists(
        &self,
        limit: u32,
        after: Option<&str>,
    ) -> Result<ArtistCursorPage, Error> {
        let mut params = vec![("type", "artist".to_owned()), ("limit", limit.to_string())];
        if let Some(after) = after.filter(|a| !a.is_empty()) {
            params.push(("after", after.to_owned()));
        }
        let resp: FollowedArtists = self.get("me/following", params).await?;
        let next_after = resp
            .artists
            .items
            .last()
            .map(|a| a.id.clone())
            .unwrap_or_default();
        Ok(ArtistCursorPage {
            items: resp.artists.items,
            total: resp.artists.total,
            next_after,
        })
    }

    // ── Playlists ───────────────────────────────────────────────────

    /// `GET /me/playlists`
    pub async fn playlists(&self, limit: u32, offset: u32) -> Result<(Vec<Playlist>, u64), Error> {
        let page: Paged<Playlist> = self.get("me/playlists", page_params(limit, offset)).await?;
        Ok((page.items, page.total))
    }

    /// `GET /playlists/{id}/tracks`; local or removed entries are skipped.
    pub async fn playlist_tracks(
        &self,
        id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Track>, u64), Error> {
        let page: Paged<PlaylistEntry> = self
            .get(&format!("playlists/{id}/tracks"), page_params(limit, offset))
            .await?;
        let items = page
            .items
            .into_iter()
            .filter_map(|e| e.track)
            .filter(|t| !t.id.is_empty())
            .collect();
        Ok((items, page.total))
    }

    /// Create a playlist owned by the current user.
    ///
    /// `GET /me` for the user id, then `POST /users/{id}/playlists`.
    pub async fn create_playlist(
        &self,
        name: &str,
        public: bool,
        collaborative: bool,
    ) -> Result<Playlist, Error> {
        let me: UserProfile = self.get("me", Vec::new()).await?;
        if me.id.is_empty() {
            return Err(Error::discovery("missing user id"));
        }
        let body = json!({
            "name": name,
            "public": public,
            "collaborative": collaborative,
        });
        self.post_json(&format!("users/{}/playlists", me.id), &body)
            .await
    }

    /// `POST /playlists/{id}/tracks` with `{"uris": [...]}`
    pub async fn add_playlist_tracks(&self, id: &str, uris: &[String]) -> Result<(), Error> {
        let body = json!({ "uris": uris });
        self.execute(
            Method::POST,
            &format!("playlists/{id}/tracks"),
            Vec::new(),
            Some(&body),
        )
        .await
    }

    /// `DELETE /playlists/{id}/tracks` with `{"tracks": [{"uri": ..}]}`
    pub async fn remove_playlist_tracks(&self, id: &str, uris: &[String]) -> Result<(), Error> {
        let tracks: Vec<_> = uris.iter().map(|uri| json!({ "uri": uri })).collect();
        let body = json!({ "tracks": tracks });
        self.execute(
            Method::DELETE,
            &format!("playlists/{id}/tracks"),
            Vec::new(),
            Some(&body),
        )
        .await
    }
}
