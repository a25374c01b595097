// ── Canonical item ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Media entity kinds addressable by `spotify:<kind>:<id>`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ItemKind {
    Track,
    Album,
    Artist,
    Playlist,
    Show,
    Episode,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Album => "album",
            Self::Artist => "artist",
            Self::Playlist => "playlist",
            Self::Show => "show",
            Self::Episode => "episode",
        }
    }

    pub fn uri(self, id: &str) -> String {
        format!("spotify:{}:{id}", self.as_str())
    }

    pub fn url(self, id: &str) -> String {
        format!("https://open.spotify.com/{}/{id}", self.as_str())
    }

    /// `spotify:<kind>:` prefix used to match URIs of this kind.
    pub(crate) fn uri_prefix(self) -> String {
        format!("spotify:{}:", self.as_str())
    }
}

/// Normalized media entity.
///
/// Identity is the URI; `id` and `kind` are derived from its last two
/// colon-separated segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub uri: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artists: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub explicit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tracks: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_playable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_episodes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
}

impl Item {
    /// Bare item of `kind` with `id`, URI and URL filled in.
    pub fn new(kind: ItemKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            uri: kind.uri(&id),
            url: Some(kind.url(&id)),
            id,
            name: name.into(),
            kind,
            artists: Vec::new(),
            album: None,
            owner: None,
            duration_ms: None,
            explicit: false,
            total_tracks: None,
            release_date: None,
            description: None,
            is_playable: None,
            publisher: None,
            total_episodes: None,
            followers: None,
            genres: Vec::new(),
        }
    }

    /// Item from a `spotify:<kind>:<id>` URI; `None` for unknown kinds.
    pub fn from_uri(uri: &str) -> Option<Self> {
        let (kind, id) = split_uri(uri)?;
        let kind: ItemKind = kind.parse().ok()?;
        let mut item = Self::new(kind, id, "");
        uri.clone_into(&mut item.uri);
        Some(item)
    }
}

/// `(kind, id)` from the last two colon segments of a URI with at least
/// three segments.
pub(crate) fn split_uri(uri: &str) -> Option<(&str, &str)> {
    let mut segments = uri.rsplit(':');
    let id = segments.next()?;
    let kind = segments.next()?;
    segments.next()?;
    Some((kind, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_strum() {
        assert_eq!("Track".parse::<ItemKind>().expect("kind"), ItemKind::Track);
        assert_eq!(ItemKind::Show.to_string(), "show");
        assert!("audiobook".parse::<ItemKind>().is_err());
    }

    #[test]
    fn item_from_uri_derives_id_and_kind() {
        let item = Item::from_uri("spotify:episode:abc").expect("item");
        assert_eq!(item.kind, ItemKind::Episode);
        assert_eq!(item.id, "abc");
        assert_eq!(item.url.as_deref(), Some("https://open.spotify.com/episode/abc"));
        assert!(Item::from_uri("spotify:user").is_none());
        assert!(Item::from_uri("spotify:user:bob").is_none());
    }

    #[test]
    fn item_serializes_kind_as_type() {
        let json = serde_json::to_value(Item::new(ItemKind::Album, "a1", "Blue")).expect("json");
        assert_eq!(json["type"], "album");
        assert!(json.get("artists").is_none());
        assert!(json.get("explicit").is_none());
    }
}
