// ── Web API model conversion ──

use serde_json::Value;
use spogo_api::web::models::{
    Album, Artist, ArtistRef, Device as ApiDevice, Episode, ExternalUrls, Playlist,
    PlaybackState, QueueResponse, Show, Track,
};

use crate::error::CoreError;
use crate::model::{Device, Item, ItemKind, PlaybackStatus, Queue};

fn base(kind: ItemKind, id: String, uri: String, name: String, urls: ExternalUrls) -> Item {
    let mut item = Item::new(kind, id, name);
    if !uri.is_empty() {
        item.uri = uri;
    }
    if let Some(url) = urls.spotify.filter(|u| !u.is_empty()) {
        item.url = Some(url);
    }
    item
}

fn artist_names(artists: Vec<ArtistRef>) -> Vec<String> {
    artists
        .into_iter()
        .map(|a| a.name)
        .filter(|n| !n.is_empty())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

fn positive(n: u64) -> Option<u64> {
    (n > 0).then_some(n)
}

impl From<Track> for Item {
    /// Playback and queue responses reuse the track shape for episodes, so
    /// the kind comes from the uri when it has one.
    fn from(t: Track) -> Self {
        let kind = Item::from_uri(&t.uri).map_or(ItemKind::Track, |i| i.kind);
        let mut item = base(kind, t.id, t.uri, t.name, t.external_urls);
        item.artists = artist_names(t.artists);
        item.album = non_empty(t.album.name);
        item.duration_ms = positive(t.duration_ms);
        item.explicit = t.explicit;
        item.is_playable = t.is_playable;
        item
    }
}

impl From<Album> for Item {
    fn from(a: Album) -> Self {
        let mut item = base(ItemKind::Album, a.id, a.uri, a.name, a.external_urls);
        item.artists = artist_names(a.artists);
        item.release_date = non_empty(a.release_date);
        item.total_tracks = positive(a.total_tracks);
        item
    }
}

impl From<Artist> for Item {
    fn from(a: Artist) -> Self {
        let mut item = base(ItemKind::Artist, a.id, a.uri, a.name, a.external_urls);
        item.followers = positive(a.followers.total);
        item.genres = a.genres;
        item
    }
}

impl From<Playlist> for Item {
    fn from(p: Playlist) -> Self {
        let mut item = base(ItemKind::Playlist, p.id, p.uri, p.name, p.external_urls);
        item.description = p.description.and_then(non_empty);
        item.owner = p.owner.display_name.and_then(non_empty).or_else(|| non_empty(p.owner.id));
        item.total_tracks = positive(p.tracks.total);
        item
    }
}

impl From<Show> for Item {
    fn from(s: Show) -> Self {
        let mut item = base(ItemKind::Show, s.id, s.uri, s.name, s.external_urls);
        item.publisher = non_empty(s.publisher);
        item.description = non_empty(s.description);
        item.total_episodes = positive(s.total_episodes);
        item
    }
}

impl From<Episode> for Item {
    fn from(e: Episode) -> Self {
        let mut item = base(ItemKind::Episode, e.id, e.uri, e.name, e.external_urls);
        item.description = non_empty(e.description);
        item.duration_ms = positive(e.duration_ms);
        item
    }
}

/// Decode one untyped search entry; `None` for the nulls the API returns
/// in place of unavailable items.
pub fn search_item(kind: ItemKind, raw: Value) -> Result<Option<Item>, CoreError> {
    if raw.is_null() {
        return Ok(None);
    }
    let item = match kind {
        ItemKind::Track => serde_json::from_value::<Track>(raw)?.into(),
        ItemKind::Album => serde_json::from_value::<Album>(raw)?.into(),
        ItemKind::Artist => serde_json::from_value::<Artist>(raw)?.into(),
        ItemKind::Playlist => serde_json::from_value::<Playlist>(raw)?.into(),
        ItemKind::Show => serde_json::from_value::<Show>(raw)?.into(),
        ItemKind::Episode => serde_json::from_value::<Episode>(raw)?.into(),
    };
    Ok(Some(item))
}

impl From<ApiDevice> for Device {
    fn from(d: ApiDevice) -> Self {
        Self {
            id: d.id.unwrap_or_default(),
            name: d.name,
            device_type: d.device_type,
            volume: d.volume_percent.unwrap_or(0).min(100),
            active: d.is_active,
            restricted: d.is_restricted,
        }
    }
}

impl From<PlaybackState> for PlaybackStatus {
    fn from(s: PlaybackState) -> Self {
        Self {
            is_playing: s.is_playing,
            progress_ms: s.progress_ms.unwrap_or(0),
            item: s.item.map(Item::from),
            device: s.device.map(Device::from).unwrap_or_default(),
            shuffle: s.shuffle_state,
            repeat: s.repeat_state.parse().unwrap_or_default(),
        }
    }
}

impl From<QueueResponse> for Queue {
    fn from(q: QueueResponse) -> Self {
        Self {
            currently_playing: q.currently_playing.map(Item::from),
            queue: q.queue.into_iter().map(Item::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::RepeatMode;

    #[test]
    fn search_track_entry() {
        let raw = json!({
            "id": "t1",
            "uri": "spotify:track:t1",
            "name": "Undone",
            "duration_ms": 305_000,
            "album": {"name": "Blue"},
            "artists": [{"name": "Weezer"}],
            "external_urls": {"spotify": "https://open.spotify.com/track/t1"}
        });
        let item = search_item(ItemKind::Track, raw).expect("decode").expect("item");
        assert_eq!(item.album.as_deref(), Some("Blue"));
        assert_eq!(item.artists, vec!["Weezer"]);
        assert_eq!(item.duration_ms, Some(305_000));
        assert!(search_item(ItemKind::Track, Value::Null).expect("null").is_none());
    }

    #[test]
    fn playlist_owner_falls_back_to_id() {
        let raw = json!({"id": "p", "name": "Mix", "owner": {"id": "bob"}, "tracks": {"total": 3}});
        let item = search_item(ItemKind::Playlist, raw).expect("decode").expect("item");
        assert_eq!(item.uri, "spotify:playlist:p");
        assert_eq!(item.owner.as_deref(), Some("bob"));
        assert_eq!(item.total_tracks, Some(3));
    }

    #[test]
    fn playback_state_with_episode_item() {
        let state = PlaybackState {
            is_playing: true,
            progress_ms: Some(1_000),
            shuffle_state: false,
            repeat_state: "track".into(),
            device: None,
            item: Some(Track {
                id: "e1".into(),
                uri: "spotify:episode:e1".into(),
                name: "Ep".into(),
                ..Track::default()
            }),
        };
        let status = PlaybackStatus::from(state);
        assert_eq!(status.repeat, RepeatMode::Track);
        assert_eq!(status.item.map(|i| i.kind), Some(ItemKind::Episode));
        assert_eq!(status.device, Device::default());
    }
}
