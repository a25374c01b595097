#![allow(clippy::unwrap_used)]
// Integration tests for the documented Web API client using wiremock.

mod support;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spogo_api::web::library::SavedCollection;
use spogo_api::{Error, WebClient, WebOptions};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(options: WebOptions) -> (MockServer, WebClient) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/token"))
        .respond_with(support::token_response())
        .mount(&server)
        .await;
    let session = support::session(&server).await;
    (server, WebClient::new(session, options))
}

fn track_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "uri": format!("spotify:track:{id}"),
        "name": "Blue in Green",
        "duration_ms": 337_000,
        "explicit": false,
        "album": { "id": "alb1", "name": "Kind of Blue", "uri": "spotify:album:alb1" },
        "artists": [{ "id": "art1", "name": "Miles Davis", "uri": "spotify:artist:art1" }],
        "external_urls": { "spotify": format!("https://open.spotify.com/track/{id}") }
    })
}

// ── Catalog ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_search_reads_plural_container_and_applies_market() {
    let (server, client) = setup(WebOptions {
        market: Some("US".into()),
        ..WebOptions::default()
    })
    .await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "kind of blue"))
        .and(query_param("type", "track"))
        .and(query_param("limit", "5"))
        .and(query_param("offset", "10"))
        .and(query_param("market", "US"))
        .and(header("authorization", "Bearer access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": { "items": [track_json("t1")], "limit": 5, "offset": 10, "total": 42 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let container = client.search("track", "kind of blue", 5, 10).await.unwrap();

    assert_eq!(container.items.len(), 1);
    assert_eq!(container.total, 42);
    assert_eq!(container.offset, 10);
}

#[tokio::test]
async fn test_search_without_container_is_discovery_error() {
    let (server, client) = setup(WebOptions::default()).await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "albums": {} })))
        .mount(&server)
        .await;

    let err = client.search("track", "x", 1, 0).await.unwrap_err();

    assert!(
        matches!(&err, Error::Discovery { what } if what == "missing track result"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_track_lookup_decodes_model() {
    let (server, client) = setup(WebOptions::default()).await;
    Mock::given(method("GET"))
        .and(path("/v1/tracks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(track_json("t1")))
        .mount(&server)
        .await;

    let track = client.track("t1").await.unwrap();

    assert_eq!(track.name, "Blue in Green");
    assert_eq!(track.album.name, "Kind of Blue");
    assert_eq!(track.artists[0].name, "Miles Davis");
}

#[tokio::test]
async fn test_not_found_carries_api_message() {
    let (server, client) = setup(WebOptions::default()).await;
    Mock::given(method("GET"))
        .and(path("/v1/albums/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "status": 404, "message": "Non existing id" }
        })))
        .mount(&server)
        .await;

    let err = client.album("missing").await.unwrap_err();

    assert!(
        matches!(&err, Error::Api { status: 404, message, .. } if message == "Non existing id"),
        "unexpected error: {err:?}"
    );
}

// ── Rate limiting ───────────────────────────────────────────────────

#[tokio::test]
async fn test_rate_limited_request_is_retried() {
    let (server, client) = setup(WebOptions::default()).await;
    Mock::given(method("GET"))
        .and(path("/v1/tracks/t1"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/tracks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(track_json("t1")))
        .mount(&server)
        .await;

    let track = client.track("t1").await.unwrap();

    assert_eq!(track.id, "t1");
}

#[tokio::test]
async fn test_rate_limit_gives_up_after_three_attempts() {
    let (server, client) = setup(WebOptions::default()).await;
    Mock::given(method("GET"))
        .and(path("/v1/tracks/t1"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client.track("t1").await.unwrap_err();

    assert!(err.is_rate_limited(), "unexpected error: {err:?}");
    assert!(
        matches!(&err, Error::Api { message, .. } if message == "rate limit retry exhausted")
    );
}

// ── Player ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_idle_player_is_none() {
    let (server, client) = setup(WebOptions::default()).await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    assert!(client.playback_state().await.unwrap().is_none());
}

#[tokio::test]
async fn test_play_context_sends_context_uri_and_device() {
    let (server, client) = setup(WebOptions {
        device: Some("dev-1".into()),
        ..WebOptions::default()
    })
    .await;
    Mock::given(method("PUT"))
        .and(path("/v1/me/player/play"))
        .and(query_param("device_id", "dev-1"))
        .and(body_json(json!({ "context_uri": "spotify:album:alb1" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.play(Some("spotify:album:alb1")).await.unwrap();
}

#[tokio::test]
async fn test_play_track_sends_uris() {
    let (server, client) = setup(WebOptions::default()).await;
    Mock::given(method("PUT"))
        .and(path("/v1/me/player/play"))
        .and(body_json(json!({ "uris": ["spotify:track:t1"] })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    client.play(Some("spotify:track:t1")).await.unwrap();
}

#[tokio::test]
async fn test_volume_is_clamped() {
    let (server, client) = setup(WebOptions::default()).await;
    Mock::given(method("PUT"))
        .and(path("/v1/me/player/volume"))
        .and(query_param("volume_percent", "100"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.volume(180).await.unwrap();
}

#[tokio::test]
async fn test_devices_are_listed() {
    let (server, client) = setup(WebOptions::default()).await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [
                { "id": "d1", "name": "Kitchen", "type": "Speaker", "volume_percent": 40, "is_active": true },
                { "id": null, "name": "Restricted", "type": "TV", "is_restricted": true }
            ]
        })))
        .mount(&server)
        .await;

    let devices = client.devices().await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].device_type, "Speaker");
    assert!(devices[0].is_active);
    assert!(devices[1].id.is_none());
}

#[tokio::test]
async fn test_empty_queue_on_no_content() {
    let (server, client) = setup(WebOptions::default()).await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/queue"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let queue = client.queue().await.unwrap();

    assert!(queue.currently_playing.is_none());
    assert!(queue.queue.is_empty());
}

// ── Library ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_save_tracks_joins_ids() {
    let (server, client) = setup(WebOptions::default()).await;
    Mock::given(method("PUT"))
        .and(path("/v1/me/tracks"))
        .and(query_param("ids", "a,b"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .modify_saved(SavedCollection::Tracks, &["a".into(), "b".into()], true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_followed_artists_cursor() {
    let (server, client) = setup(WebOptions::default()).await;
    Mock::given(method("GET"))
        .and(path("/v1/me/following"))
        .and(query_param("type", "artist"))
        .and(query_param("after", "art0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artists": {
                "items": [
                    { "id": "art1", "name": "One", "uri": "spotify:artist:art1" },
                    { "id": "art2", "name": "Two", "uri": "spotify:artist:art2" }
                ],
                "total": 7
            }
        })))
        .mount(&server)
        .await;

    let page = client.followed_artists(2, Some("art0")).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 7);
    assert_eq!(page.next_after, "art2");
}

#[tokio::test]
async fn test_create_playlist_uses_profile_id() {
    let (server, client) = setup(WebOptions::default()).await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "user-9" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/users/user-9/playlists"))
        .and(body_json(json!({ "name": "Late", "public": false, "collaborative": false })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "pl1", "uri": "spotify:playlist:pl1", "name": "Late",
            "owner": { "id": "user-9" }, "tracks": { "total": 0 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let playlist = client.create_playlist("Late", false, false).await.unwrap();

    assert_eq!(playlist.id, "pl1");
    assert_eq!(playlist.owner.id, "user-9");
}
