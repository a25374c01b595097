// ── Pathfinder payload normalization ──
//
// GraphQL responses are walked as untyped trees. An object qualifies as an
// item of a kind when it carries a `spotify:<kind>:` uri (or an `id` the uri
// can be built from); wrappers such as `{"item": {"data": {...}}}` resolve to
// the nested object holding that uri.

use std::collections::HashSet;

use serde_json::Value;

use super::json::{
    Object, bool_field, dedupe, find_in_object, find_map, first_name, first_name_in, object_at,
    str_field, u64_field, walk_object, walk_objects,
};
use crate::model::item::split_uri;
use crate::model::{Item, ItemKind};

/// Container paths tried, in order, before the generic collector.
pub(crate) fn search_paths(kind: ItemKind) -> &'static [&'static [&'static str]] {
    match kind {
        ItemKind::Track => &[&["data", "searchV2", "tracksV2"]],
        ItemKind::Album => &[
            &["data", "searchV2", "albumsV2"],
            &["data", "searchV2", "albums"],
        ],
        ItemKind::Artist => &[&["data", "searchV2", "artists"]],
        ItemKind::Playlist => &[&["data", "searchV2", "playlists"]],
        ItemKind::Show => &[
            &["data", "searchV2", "podcasts"],
            &["data", "searchV2", "shows"],
        ],
        ItemKind::Episode => &[&["data", "searchV2", "episodes"]],
    }
}

/// Items and total for a `searchDesktop` payload. The total falls back to
/// the number of items when the container has no `totalCount`.
pub fn extract_search_items(payload: &Value, kind: ItemKind) -> (Vec<Item>, u64) {
    for path in search_paths(kind) {
        if let Some(container) = object_at(payload, path) {
            let items = items_from_container(container, kind);
            let total = u64_field(container, "totalCount")
                .filter(|total| *total > 0)
                .unwrap_or_else(|| count(&items));
            return (items, total);
        }
    }
    let items = collect_items(payload, kind);
    let total = count(&items);
    (items, total)
}

/// First item of `kind` anywhere in a lookup payload.
pub fn extract_item_from_payload(payload: &Value, kind: ItemKind) -> Option<Item> {
    collect_items(payload, kind).into_iter().next()
}

/// Every distinct item of `kind` in the tree, outermost first.
pub fn collect_items(value: &Value, kind: ItemKind) -> Vec<Item> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    walk_objects(value, &mut |m: &Object| {
        if let Some(item) = item_from_object(m, kind) {
            if seen.insert(item.uri.clone()) {
                items.push(item);
            }
        }
    });
    items
}

/// Normalize one JSON subtree into an item of `kind`.
pub fn extract_item(value: &Value, kind: ItemKind) -> Option<Item> {
    item_from_object(value.as_object()?, kind)
}

fn items_from_container(container: &Object, kind: ItemKind) -> Vec<Item> {
    let items: Vec<Item> = container
        .get("items")
        .and_then(Value::as_array)
        .map(|raw| raw.iter().filter_map(|v| extract_item(v, kind)).collect())
        .unwrap_or_default();
    if items.is_empty() {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();
        for child in container.values() {
            for item in collect_items(child, kind) {
                if seen.insert(item.uri.clone()) {
                    collected.push(item);
                }
            }
        }
        return collected;
    }
    items
}

fn item_from_object(m: &Object, kind: ItemKind) -> Option<Item> {
    let prefix = kind.uri_prefix();
    let (uri, source) = match str_field(m, "uri") {
        Some(uri) => (uri.to_owned(), m),
        None => match str_field(m, "id") {
            Some(id) => (kind.uri(id), m),
            None => nested_uri(m, &prefix)?,
        },
    };
    if !uri.starts_with(&prefix) {
        return None;
    }
    let (_, id) = split_uri(&uri)?;

    let name = str_field(source, "name")
        .or_else(|| str_field(source, "title"))
        .map(str::to_owned)
        .or_else(|| first_name_in(source))
        .unwrap_or_default();

    let mut item = Item::new(kind, id, name);
    item.uri = uri;
    item.artists = artist_names(source);
    item.album = named_child(source, &["album", "albumOfTrack"]);
    item.owner = named_child(source, &["owner", "user", "ownerV2"]);
    item.explicit = bool_field(source, "explicit").unwrap_or(false)
        || object_at_key(source, "contentRating")
            .and_then(|r| str_field(r, "label"))
            .is_some_and(|label| label.eq_ignore_ascii_case("explicit"));
    item.duration_ms = u64_field(source, "duration_ms")
        .or_else(|| u64_field(source, "durationMs"))
        .or_else(|| millis_child(source, "duration"))
        .or_else(|| millis_child(source, "trackDuration"))
        .filter(|ms| *ms > 0);
    item.total_tracks = u64_field(source, "totalTracks")
        .or_else(|| u64_field(source, "total"))
        .filter(|n| *n > 0);
    item.release_date = str_field(source, "releaseDate")
        .map(str::to_owned)
        .or_else(|| {
            object_at_key(source, "date")
                .and_then(|d| str_field(d, "isoString"))
                .map(str::to_owned)
        });
    item.description = str_field(source, "description").map(str::to_owned);
    item.is_playable = bool_field(source, "isPlayable").or_else(|| {
        object_at_key(source, "playability").and_then(|p| bool_field(p, "playable"))
    });
    item.publisher = str_field(source, "publisher")
        .map(str::to_owned)
        .or_else(|| named_child(source, &["publisher"]));
    item.total_episodes = u64_field(source, "totalEpisodes").filter(|n| *n > 0);
    item.followers = object_at_key(source, "stats")
        .and_then(|s| u64_field(s, "followers"))
        .or_else(|| object_at_key(source, "followers").and_then(|f| u64_field(f, "total")));
    Some(item)
}

/// Uri and owning object of the first nested `spotify:<kind>:` uri.
fn nested_uri<'a>(m: &'a Object, prefix: &str) -> Option<(String, &'a Object)> {
    m.values().find_map(|child| {
        find_map(child, &mut |inner: &'a Object| {
            str_field(inner, "uri")
                .filter(|uri| uri.starts_with(prefix))
                .map(|uri| (uri.to_owned(), inner))
        })
    })
}

fn object_at_key<'a>(m: &'a Object, key: &str) -> Option<&'a Object> {
    m.get(key).and_then(Value::as_object)
}

fn millis_child(m: &Object, key: &str) -> Option<u64> {
    object_at_key(m, key).and_then(|d| u64_field(d, "totalMilliseconds"))
}

/// `name` of the first `key` child found in a depth-first walk, also
/// looking through a `data` wrapper.
fn named_child(m: &Object, keys: &[&str]) -> Option<String> {
    find_in_object(m, &mut |obj: &Object| {
        keys.iter().find_map(|key| {
            let inner = object_at_key(obj, key)?;
            str_field(inner, "name")
                .or_else(|| object_at_key(inner, "data").and_then(|d| str_field(d, "name")))
                .or_else(|| {
                    object_at_key(inner, "profile").and_then(|p| str_field(p, "name"))
                })
                .map(str::to_owned)
        })
    })
}

fn artist_names(m: &Object) -> Vec<String> {
    let mut names = Vec::new();
    walk_object(m, &mut |obj: &Object| {
        for key in ["artists", "firstArtist", "otherArtists"] {
            let list = match obj.get(key) {
                Some(Value::Array(list)) => Some(list),
                Some(Value::Object(wrapper)) => wrapper.get("items").and_then(Value::as_array),
                _ => None,
            };
            for entry in list.into_iter().flatten() {
                if let Some(name) = first_name(entry) {
                    names.push(name);
                }
            }
        }
    });
    if names.is_empty() {
        if let Some(name) = str_field(m, "artistName") {
            names.push(name.to_owned());
        }
    }
    dedupe(names)
}

fn count(items: &[Item]) -> u64 {
    u64::try_from(items.len()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn track_node(id: &str, name: &str) -> Value {
        json!({
            "__typename": "Track",
            "uri": format!("spotify:track:{id}"),
            "name": name,
            "duration": {"totalMilliseconds": 201_000},
            "albumOfTrack": {"uri": "spotify:album:al1", "name": "Blue Album"},
            "artists": {"items": [
                {"uri": "spotify:artist:ar1", "profile": {"name": "Weezer"}},
                {"uri": "spotify:artist:ar2", "profile": {"name": "Weezer"}}
            ]},
            "contentRating": {"label": "EXPLICIT"},
            "playability": {"playable": true}
        })
    }

    #[test]
    fn nested_tree_yields_exactly_one_track() {
        let payload = json!({"data": {"deep": {"wrapper": [{"item": track_node("4uLU6h", "Say It")}]}}});
        let items = collect_items(&payload, ItemKind::Track);
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.id, "4uLU6h");
        assert_eq!(item.kind, ItemKind::Track);
        assert_eq!(item.name, "Say It");
        assert_eq!(item.artists, vec!["Weezer"]);
        assert_eq!(item.album.as_deref(), Some("Blue Album"));
        assert_eq!(item.duration_ms, Some(201_000));
        assert!(item.explicit);
        assert_eq!(item.is_playable, Some(true));
        assert_eq!(item.url.as_deref(), Some("https://open.spotify.com/track/4uLU6h"));
    }

    #[test]
    fn wrapped_search_entries_resolve_to_inner_item() {
        let payload = json!({"data": {"searchV2": {"tracksV2": {
            "totalCount": 812,
            "items": [
                {"item": {"data": track_node("t1", "One")}},
                {"item": {"data": track_node("t2", "Two")}}
            ]
        }}}});
        let (items, total) = extract_search_items(&payload, ItemKind::Track);
        assert_eq!(total, 812);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Two"]);
    }

    #[test]
    fn total_defaults_to_item_count() {
        let payload = json!({"data": {"searchV2": {"tracksV2": {
            "items": [{"item": {"data": track_node("t1", "One")}}]
        }}}});
        let (items, total) = extract_search_items(&payload, ItemKind::Track);
        assert_eq!(items.len(), 1);
        assert_eq!(total, 1);
    }

    #[test]
    fn second_container_path_is_tried() {
        let payload = json!({"data": {"searchV2": {"shows": {"items": [
            {"data": {"uri": "spotify:show:s1", "name": "Pod", "publisher": {"name": "Pub"}}}
        ]}}}});
        let (items, _) = extract_search_items(&payload, ItemKind::Show);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].publisher.as_deref(), Some("Pub"));
    }

    #[test]
    fn missing_container_falls_back_to_collector() {
        let payload = json!({"results": [{"uri": "spotify:album:a1", "name": "A"}]});
        let (items, total) = extract_search_items(&payload, ItemKind::Album);
        assert_eq!(items.len(), 1);
        assert_eq!(total, 1);
    }

    #[test]
    fn id_builds_uri_and_other_kinds_are_ignored() {
        let item = extract_item(&json!({"id": "x1", "title": "Ep"}), ItemKind::Episode).expect("item");
        assert_eq!(item.uri, "spotify:episode:x1");
        assert_eq!(item.name, "Ep");

        let payload = json!({"uri": "spotify:album:a1", "name": "Album"});
        assert!(extract_item(&payload, ItemKind::Track).is_none());
    }

    #[test]
    fn playlist_owner_and_artist_name_fallback() {
        let playlist = json!({
            "uri": "spotify:playlist:p1",
            "name": "Mix",
            "ownerV2": {"data": {"name": "spotify"}}
        });
        let item = extract_item(&playlist, ItemKind::Playlist).expect("playlist");
        assert_eq!(item.owner.as_deref(), Some("spotify"));

        let track = json!({"uri": "spotify:track:t", "name": "T", "artistName": " Solo "});
        let item = extract_item(&track, ItemKind::Track).expect("track");
        assert_eq!(item.artists, vec!["Solo"]);
    }

    #[test]
    fn lookup_payload_returns_first_item() {
        let payload = json!({"data": {"trackUnion": track_node("abc", "Buddy Holly")}});
        let item = extract_item_from_payload(&payload, ItemKind::Track).expect("track");
        assert_eq!(item.name, "Buddy Holly");
        assert!(extract_item_from_payload(&payload, ItemKind::Episode).is_none());
    }

    #[test]
    fn normalized_track_json_shape() {
        let payload = json!({"data": {"trackUnion": track_node("abc", "Buddy Holly")}});
        let item = extract_item_from_payload(&payload, ItemKind::Track).expect("track");
        insta::assert_json_snapshot!(item, @r#"
        {
          "id": "abc",
          "uri": "spotify:track:abc",
          "name": "Buddy Holly",
          "type": "track",
          "url": "https://open.spotify.com/track/abc",
          "artists": [
            "Weezer"
          ],
          "album": "Blue Album",
          "duration_ms": 201000,
          "explicit": true,
          "is_playable": true
        }
        "#);
    }
}
