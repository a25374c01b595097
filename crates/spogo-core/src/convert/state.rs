// ── Connect-state mapping ──
//
// Each accessor derives a fresh view from one `ConnectState` snapshot.

use serde_json::Value;
use spogo_api::ConnectState;

use super::extract::extract_item;
use super::json::{Object, bool_field, object_at, str_field, u64_field};
use crate::model::{Device, Item, ItemKind, PlaybackStatus, Queue, RepeatMode};

const RAW_VOLUME_MAX: u64 = 65_535;

pub fn map_devices(state: &ConnectState) -> Vec<Device> {
    state
        .devices
        .iter()
        .filter_map(|(id, raw)| {
            let raw = raw.as_object()?;
            Some(Device {
                id: id.clone(),
                name: str_field(raw, "name")
                    .or_else(|| str_field(raw, "device_name"))
                    .unwrap_or_default()
                    .to_owned(),
                device_type: str_field(raw, "device_type")
                    .unwrap_or_default()
                    .to_owned(),
                volume: device_volume(raw),
                active: state.active_device_id.as_deref() == Some(id.as_str()),
                restricted: raw
                    .get("capabilities")
                    .and_then(Value::as_object)
                    .and_then(|caps| bool_field(caps, "is_controllable"))
                    .is_some_and(|controllable| !controllable),
            })
        })
        .collect()
}

pub fn map_playback(state: &ConnectState) -> PlaybackStatus {
    let Some(player) = state.player_state.as_object() else {
        return PlaybackStatus {
            device: active_device(state),
            ..PlaybackStatus::default()
        };
    };

    let is_playing = match bool_field(player, "is_paused") {
        Some(paused) => !paused,
        None => bool_field(player, "is_playing").unwrap_or(false),
    };
    let progress_ms = u64_field(player, "position_as_of_timestamp")
        .filter(|ms| *ms > 0)
        .or_else(|| u64_field(player, "position_ms"))
        .unwrap_or(0);

    let options = object_at(&state.player_state, &["options"]);
    let shuffle = options
        .and_then(|o| bool_field(o, "shuffling_context"))
        .or_else(|| bool_field(player, "shuffle"))
        .unwrap_or(false);
    let repeat = match options {
        Some(o) if o.contains_key("repeating_track") || o.contains_key("repeating_context") => {
            RepeatMode::from_flags(
                bool_field(o, "repeating_track").unwrap_or(false),
                bool_field(o, "repeating_context").unwrap_or(false),
            )
        }
        _ => str_field(player, "repeat_mode")
            .or_else(|| str_field(player, "repeat"))
            .and_then(|mode| mode.parse().ok())
            .unwrap_or_default(),
    };

    PlaybackStatus {
        is_playing,
        progress_ms,
        item: current_item(player),
        device: active_device(state),
        shuffle,
        repeat,
    }
}

pub fn map_queue(state: &ConnectState) -> Queue {
    let Some(player) = state.player_state.as_object() else {
        return Queue::default();
    };
    let queue = player
        .get("next_tracks")
        .and_then(Value::as_array)
        .map(|next| {
            next.iter()
                .filter_map(|entry| {
                    extract_item(entry, ItemKind::Track)
                        .or_else(|| extract_item(entry, ItemKind::Episode))
                })
                .collect()
        })
        .unwrap_or_default();
    Queue {
        currently_playing: current_item(player),
        queue,
    }
}

fn device_volume(raw: &Object) -> u32 {
    let percent = match u64_field(raw, "volume") {
        Some(raw_volume) => raw_volume.min(RAW_VOLUME_MAX) * 100 / RAW_VOLUME_MAX,
        None => u64_field(raw, "volume_percent").unwrap_or(0).min(100),
    };
    u32::try_from(percent).unwrap_or(100)
}

fn active_device(state: &ConnectState) -> Device {
    map_devices(state)
        .into_iter()
        .find(|device| device.active)
        .unwrap_or_default()
}

/// The loaded track or episode; a context uri is the last resort.
fn current_item(player: &Object) -> Option<Item> {
    for key in ["track", "item", "current_track"] {
        if let Some(raw) = player.get(key) {
            if let Some(item) = extract_item(raw, ItemKind::Track)
                .or_else(|| extract_item(raw, ItemKind::Episode))
            {
                return Some(item);
            }
        }
    }
    ["context_uri", "context_uri_string"]
        .iter()
        .filter_map(|key| str_field(player, key))
        .find(|uri| uri.starts_with("spotify:"))
        .and_then(Item::from_uri)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    use super::*;

    fn snapshot(player: Value) -> ConnectState {
        let devices = json!({
            "speaker-1": {"name": "Kitchen", "device_type": "SPEAKER", "volume": 32_767},
            "laptop-1": {"device_name": "MacBook", "device_type": "COMPUTER", "volume_percent": 80}
        });
        ConnectState {
            devices: devices.as_object().cloned().unwrap_or_else(Map::new),
            player_state: player,
            active_device_id: Some("speaker-1".into()),
            origin_device_id: Some("laptop-1".into()),
        }
    }

    #[test]
    fn devices_scale_raw_volume() {
        let devices = map_devices(&snapshot(Value::Null));
        let kitchen = devices.iter().find(|d| d.id == "speaker-1").expect("kitchen");
        assert_eq!(kitchen.volume, 49);
        assert!(kitchen.active);
        let laptop = devices.iter().find(|d| d.id == "laptop-1").expect("laptop");
        assert_eq!(laptop.name, "MacBook");
        assert_eq!(laptop.volume, 80);
        assert!(!laptop.active);
    }

    #[test]
    fn playback_reads_options_and_track() {
        let state = snapshot(json!({
            "is_playing": true,
            "is_paused": false,
            "position_as_of_timestamp": "61000",
            "options": {"shuffling_context": true, "repeating_context": true, "repeating_track": false},
            "track": {"uri": "spotify:track:t1", "metadata": {"title": "Song"}}
        }));
        let status = map_playback(&state);
        assert!(status.is_playing);
        assert_eq!(status.progress_ms, 61_000);
        assert!(status.shuffle);
        assert_eq!(status.repeat, RepeatMode::Context);
        assert_eq!(status.device.name, "Kitchen");
        let item = status.item.expect("item");
        assert_eq!(item.id, "t1");
        assert_eq!(item.name, "Song");
    }

    #[test]
    fn paused_flag_wins_and_context_is_fallback() {
        let state = snapshot(json!({
            "is_playing": true,
            "is_paused": true,
            "position_ms": 5,
            "context_uri": "spotify:playlist:p1"
        }));
        let status = map_playback(&state);
        assert!(!status.is_playing);
        assert_eq!(status.progress_ms, 5);
        assert_eq!(status.repeat, RepeatMode::Off);
        assert_eq!(status.item.map(|i| i.kind), Some(ItemKind::Playlist));
    }

    #[test]
    fn empty_player_has_no_item() {
        let status = map_playback(&snapshot(Value::Null));
        assert!(!status.is_playing);
        assert!(status.item.is_none());
        assert_eq!(status.device.id, "speaker-1");
    }

    #[test]
    fn queue_from_next_tracks() {
        let state = snapshot(json!({
            "track": {"uri": "spotify:track:now"},
            "next_tracks": [
                {"uri": "spotify:track:n1", "uid": "a"},
                {"uri": "spotify:delimiter", "uid": "b"},
                {"uri": "spotify:episode:e1", "uid": "c"}
            ]
        }));
        let queue = map_queue(&state);
        assert_eq!(queue.currently_playing.map(|i| i.id), Some("now".to_owned()));
        let ids: Vec<_> = queue.queue.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "e1"]);
    }
}
