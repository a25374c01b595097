// Web API player endpoints
//
// Playback state, transport controls, devices and the queue. Mutating
// calls pick up the configured `device_id`.

use reqwest::Method;
use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::web::models::{Device, DevicesResponse, PlaybackState, QueueResponse};
use crate::web::{NO_BODY, WebClient};

/// Album, playlist and show URIs start a context; anything else is a
/// list of playable URIs.
pub fn is_context_uri(uri: &str) -> bool {
    [":album:", ":playlist:", ":show:"]
        .iter()
        .any(|marker| uri.contains(marker))
}

impl WebClient {
    /// `GET /me/player`; `None` when nothing is playing (204).
    pub async fn playback_state(&self) -> Result<Option<PlaybackState>, Error> {
        match self.get("me/player", Vec::new()).await {
            Ok(state) => Ok(Some(state)),
            Err(Error::NoContent) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `PUT /me/player/play`, optionally starting `uri`.
    pub async fn play(&self, uri: Option<&str>) -> Result<(), Error> {
        let body = match uri.filter(|u| !u.is_empty()) {
            Some(uri) if is_context_uri(uri) => json!({ "context_uri": uri }),
            Some(uri) => json!({ "uris": [uri] }),
            None => json!({}),
        };
        debug!(?uri, "starting playback");
        self.execute(Method::PUT, "me/player/play", Vec::new(), Some(&body))
            .await
    }

    /// `PUT /me/player/pause`
    pub async fn pause(&self) -> Result<(), Error> {
        self.execute(Method::PUT, "me/player/pause", Vec::new(), NO_BODY)
            .await
    }

    /// `POST /me/player/next`
    pub async fn next(&self) -> Result<(), Error> {
        self.execute(Method::POST, "me/player/next", Vec::new(), NO_BODY)
            .await
    }

    /// `POST /me/player/previous`
    pub async fn previous(&self) -> Result<(), Error> {
        self.execute(Method::POST, "me/player/previous", Vec::new(), NO_BODY)
            .await
    }

    /// `PUT /me/player/seek?position_ms=`
    pub async fn seek(&self, position_ms: i64) -> Result<(), Error> {
        self.execute(
            Method::PUT,
            "me/player/seek",
            vec![("position_ms", position_ms.max(0).to_string())],
            NO_BODY,
        )
        .await
    }

    /// `PUT /me/player/volume?volume_percent=`
    pub async fn volume(&self, percent: i64) -> Result<(), Error> {
        self.execute(
            Method::PUT,
            "me/player/volume",
            vec![("volume_percent", percent.clamp(0, 100).to_string())],
            NO_BODY,
        )
        .await
    }

    /// `PUT /me/player/shuffle?state=`
    pub async fn shuffle(&self, enabled: bool) -> Result<(), Error> {
        self.execute(
            Method::PUT,
            "me/player/shuffle",
            vec![("state", enabled.to_string())],
            NO_BODY,
        )
        .await
    }

    /// `PUT /me/player/repeat?state=` with `off`, `track` or `context`.
    pub async fn repeat(&self, state: &str) -> Result<(), Error> {
        self.execute(
            Method::PUT,
            "me/player/repeat",
            vec![("state", state.to_owned())],
            NO_BODY,
        )
        .await
    }

    /// `GET /me/player/devices`
    pub async fn devices(&self) -> Result<Vec<Device>, Error> {
        let resp: DevicesResponse = self.get("me/player/devices", Vec::new()).await?;
        Ok(resp.devices)
    }

    /// `PUT /me/player` with `{"device_ids": [id]}`
    pub async fn transfer(&self, device_id: &str) -> Result<(), Error> {
        let body = json!({ "device_ids": [device_id] });
        self.execute(Method::PUT, "me/player", Vec::new(), Some(&body))
            .await
    }

    /// `POST /me/player/queue?uri=`
    pub async fn queue_add(&self, uri: &str) -> Result<(), Error> {
        self.execute(
            Method::POST,
            "me/player/queue",
            vec![("uri", uri.to_owned())],
            NO_BODY,
        )
        .await
    }

    /// `GET /me/player/queue`; empty when nothing is playing.
    pub async fn queue(&self) -> Result<QueueResponse, Error> {
        match self.get("me/player/queue", Vec::new()).await {
            Err(Error::NoContent) => Ok(QueueResponse::default()),
            other => other,
        }
    }
}
