// Web API catalog endpoints
//
// Search plus single-item lookups for every catalog kind.

use tracing::debug;

use crate::error::Error;
use crate::web::WebClient;
use crate::web::models::{Album, Artist, Episode, Playlist, SearchContainer, SearchResponse, Show, Track};

impl WebClient {
    /// Search one kind.
    ///
    /// `GET /search?q=..&type=<kind>`; the response is keyed by the plural
    /// kind (`tracks`), with the singular key accepted as well.
    pub async fn search(
        &self,
        kind: &str,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchContainer, Error> {
        debug!(kind, query, limit, offset, "searching");
        let mut response: SearchResponse = self
            .get(
                "search",
                vec![
                    ("q", query.to_owned()),
                    ("type", kind.to_owned()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;

        response
            .remove(&format!("{kind}s"))
            .or_else(|| response.remove(kind))
            .ok_or_else(|| Error::discovery(format!("missing {kind} result")))
    }

    /// `GET /tracks/{id}`
    pub async fn track(&self, id: &str) -> Result<Track, Error> {
        self.get(&format!("tracks/{id}"), Vec::new()).await
    }

    /// `GET /albums/{id}`
    pub async fn album(&self, id: &str) -> Result<Album, Error> {
        self.get(&format!("albums/{id}"), Vec::new()).await
    }

    /// `GET /artists/{id}`
    pub async fn artist(&self, id: &str) -> Result<Artist, Error> {
        self.get(&format!("artists/{id}"), Vec::new()).await
    }

    /// `GET /playlists/{id}`
    pub async fn playlist(&self, id: &str) -> Result<Playlist, Error> {
        self.get(&format!("playlists/{id}"), Vec::new()).await
    }

    /// `GET /shows/{id}`
    pub async fn show(&self, id: &str) -> Result<Show, Error> {
        self.get(&format!("shows/{id}"), Vec::new()).await
    }

    /// `GET /episodes/{id}`
    pub async fn episode(&self, id: &str) -> Result<Episode, Error> {
        self.get(&format!("episodes/{id}"), Vec::new()).await
    }
}
