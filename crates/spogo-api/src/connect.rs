// Connect-state client.
//
// Spotify Connect has no public API. The web player registers itself as a
// hidden device on track-playback, observes the shared connect state as a
// `hobs_` member and sends player commands addressed from one device id
// to another. This client does the same with a virtual device named
// `spogo`.
//
// Registration lifecycle:
//   Unregistered ──dealer + POST devices──▶ Active ──10 min──▶ Stale
//   Stale (or missing connection id) re-runs registration on next access.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use crate::dealer::{self, HANDSHAKE_TIMEOUT};
use crate::error::Error;
use crate::session::{Credentials, Session};
use crate::token::{self, read_json};
use crate::transport::join;

/// Registration is refreshed after this long.
pub const CONNECTION_TTL: Duration = Duration::from_secs(10 * 60);

const DEVICE_NAME: &str = "spogo";
const DEVICE_MODEL: &str = "web_player";
const MAX_VOLUME: u32 = 65_535;

// ── Snapshot ────────────────────────────────────────────────────────

/// One read of the shared connect state.
#[derive(Debug, Clone, Default)]
pub struct ConnectState {
    /// Device roster keyed by device id.
    pub devices: Map<String, Value>,
    /// `player_state` object, `Null` when nothing is loaded.
    pub player_state: Value,
    pub active_device_id: Option<String>,
    /// Device that started the current playback, if reported.
    pub origin_device_id: Option<String>,
}

impl ConnectState {
    pub(crate) fn from_value(raw: Value) -> Self {
        let Value::Object(mut raw) = raw else {
            return Self::default();
        };
        let devices = match raw.remove("devices") {
            Some(Value::Object(devices)) => devices,
            _ => Map::new(),
        };
        let player_state = match raw.remove("player_state") {
            Some(player @ Value::Object(_)) => player,
            _ => Value::Null,
        };
        let active_device_id = raw
            .get("active_device_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);
        let origin_device_id = player_state
            .pointer("/play_origin/device_identifier")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);

        Self {
            devices,
            player_state,
            active_device_id,
            origin_device_id,
        }
    }

    /// Sender of a command: the play origin, else the active device.
    pub fn from_device(&self) -> Option<&str> {
        self.origin_device_id
            .as_deref()
            .or(self.active_device_id.as_deref())
    }

    fn route(&self) -> Result<(&str, &str), Error> {
        match (self.from_device(), self.active_device_id.as_deref()) {
            (Some(from), Some(to)) => Ok((from, to)),
            _ => Err(Error::discovery("missing device id")),
        }
    }
}

// ── Registration state ──────────────────────────────────────────────

#[derive(Debug)]
enum Registration {
    Unregistered,
    Active {
        connection_id: String,
        registered_at: Instant,
    },
}

#[derive(Debug)]
struct DeviceSlot {
    device_id: String,
    registration: Registration,
}

impl DeviceSlot {
    /// Connection id while the registration is younger than `ttl` at `now`.
    fn live_connection(&self, now: Instant, ttl: Duration) -> Option<&str> {
        match &self.registration {
            Registration::Active {
                connection_id,
                registered_at,
            } if now.saturating_duration_since(*registered_at) < ttl => Some(connection_id),
            _ => None,
        }
    }
}

/// 32 lowercase hex characters.
pub fn random_hex_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Linear 0–100 → 0–65535 with clamping and truncation.
pub fn scale_volume(percent: i64) -> u32 {
    let clamped = u32::try_from(percent.clamp(0, 100)).unwrap_or(0);
    clamped * MAX_VOLUME / 100
}

// ── Client ──────────────────────────────────────────────────────────

/// Device-addressed playback control over connect-state.
#[derive(Debug)]
pub struct ConnectClient {
    session: Arc<Session>,
    slot: Mutex<DeviceSlot>,
    dealer_timeout: Duration,
    connection_ttl: Duration,
}

impl ConnectClient {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            slot: Mutex::new(DeviceSlot {
                device_id: random_hex_id(),
                registration: Registration::Unregistered,
            }),
            dealer_timeout: HANDSHAKE_TIMEOUT,
            connection_ttl: CONNECTION_TTL,
        }
    }

    #[must_use]
    pub fn with_dealer_timeout(mut self, timeout: Duration) -> Self {
        self.dealer_timeout = timeout;
        self
    }

    /// How long a registration stays valid before the device re-registers.
    #[must_use]
    pub fn with_connection_ttl(mut self, ttl: Duration) -> Self {
        self.connection_ttl = ttl;
        self
    }

    /// Register if needed, then fetch a fresh state snapshot.
    #[instrument(skip_all)]
    pub async fn state(&self) -> Result<ConnectState, Error> {
        let creds = self.session.authorize().await?;
        let (device_id, connection_id) = self.ensure_registered(&creds).await?;

        let url = join(
            &self.session.endpoints().connect_state,
            &format!("devices/hobs_{device_id}"),
        )?;
        let body = json!({
            "member_type": "CONNECT_STATE",
            "device": {
                "device_info": {
                    "capabilities": {
                        "can_be_player": false,
                        "hidden": true,
                        "needs_full_player_state": true,
                    }
                }
            }
        });

        debug!(url = %url, "PUT connect state");
        let resp = self
            .request(reqwest::Method::PUT, url, &creds)
            .header("x-spotify-connection-id", connection_id.as_str())
            .json(&body)
            .send()
            .await?;
        let raw: Value = read_json(resp).await?;
        Ok(ConnectState::from_value(raw))
    }

    // ── Commands ────────────────────────────────────────────────────

    /// Resume, or start `uri` when given.
    pub async fn play(&self, uri: Option<&str>) -> Result<(), Error> {
        let state = self.state().await?;
        match uri.filter(|u| !u.is_empty()) {
            None => self.player_command(&state, "resume", Map::new()).await,
            Some(uri) => self.player_command(&state, "play", play_fields(uri)).await,
        }
    }

    pub async fn pause(&self) -> Result<(), Error> {
        let state = self.state().await?;
        self.player_command(&state, "pause", Map::new()).await
    }

    pub async fn next(&self) -> Result<(), Error> {
        let state = self.state().await?;
        self.player_command(&state, "skip_next", Map::new()).await
    }

    pub async fn previous(&self) -> Result<(), Error> {
        let state = self.state().await?;
        self.player_command(&state, "skip_prev", Map::new()).await
    }

    /// Seek to `position_ms`; negative positions clamp to 0.
    pub async fn seek(&self, position_ms: i64) -> Result<(), Error> {
        let state = self.state().await?;
        let mut extra = Map::new();
        extra.insert("value".into(), json!(position_ms.max(0)));
        self.player_command(&state, "seek_to", extra).await
    }

    pub async fn shuffle(&self, enabled: bool) -> Result<(), Error> {
        let state = self.state().await?;
        let mut extra = Map::new();
        extra.insert("value".into(), json!(enabled));
        self.player_command(&state, "set_shuffling_context", extra)
            .await
    }

    /// Set repeat flags; both false turns repeat off.
    pub async fn repeat(&self, track: bool, context: bool) -> Result<(), Error> {
        let state = self.state().await?;
        let mut extra = Map::new();
        extra.insert("repeating_track".into(), json!(track));
        extra.insert("repeating_context".into(), json!(context));
        self.player_command(&state, "set_options", extra).await
    }

    pub async fn queue_add(&self, uri: &str) -> Result<(), Error> {
        let state = self.state().await?;
        let mut extra = Map::new();
        extra.insert("track".into(), json!({ "uri": uri }));
        self.player_command(&state, "add_to_queue", extra).await
    }

    /// Set volume on the active device from a 0–100 percentage.
    pub async fn set_volume(&self, percent: i64) -> Result<(), Error> {
        let state = self.state().await?;
        let (from, to) = state.route()?;
        let url = join(
            &self.session.endpoints().connect_state,
            &format!("connect/volume/from/{from}/to/{to}"),
        )?;
        self.send_command(url, &json!({ "volume": scale_volume(percent) }))
            .await
    }

    /// Move playback to `target`.
    pub async fn transfer(&self, target: &str) -> Result<(), Error> {
        let state = self.state().await?;
        let from = state
            .from_device()
            .ok_or_else(|| Error::discovery("missing origin device id"))?;
        let url = join(
            &self.session.endpoints().connect_state,
            &format!("connect/transfer/from/{from}/to/{target}"),
        )?;
        let body = json!({
            "transfer_options": { "restore_paused": "resume" },
            "command_id": random_hex_id(),
        });
        self.send_command(url, &body).await
    }

    /// POST a player command envelope from the origin to the active device.
    ///
    /// `extra` is merged into the `command` object next to `endpoint`.
    pub async fn player_command(
        &self,
        state: &ConnectState,
        endpoint: &str,
        extra: Map<String, Value>,
    ) -> Result<(), Error> {
        let (from, to) = state.route()?;
        let url = join(
            &self.session.endpoints().connect_state,
            &format!("player/command/from/{from}/to/{to}"),
        )?;
        let body = json!({ "command": command_body(endpoint, extra) });
        self.send_command(url, &body).await
    }

    // ── Plumbing ────────────────────────────────────────────────────

    async fn send_command(&self, url: Url, body: &Value) -> Result<(), Error> {
        let creds = self.session.authorize().await?;
        debug!(url = %url, "POST connect command");
        let resp = self
            .request(reqwest::Method::POST, url, &creds)
            .json(body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(token::api_error(resp).await);
        }
        Ok(())
    }

    /// Returns the device id and a live connection id, registering first
    /// when the slot is unregistered or stale.
    async fn ensure_registered(&self, creds: &Credentials) -> Result<(String, String), Error> {
        let mut slot = self.slot.lock().await;
        if let Some(connection_id) = slot.live_connection(Instant::now(), self.connection_ttl) {
            return Ok((slot.device_id.clone(), connection_id.to_owned()));
        }

        let connection_id = dealer::connection_id(
            &self.session.endpoints().dealer,
            creds.access_token.expose_secret(),
            self.session.user_agent(),
            self.dealer_timeout,
        )
        .await?;
        self.register_device(creds, &slot.device_id, &connection_id)
            .await?;
        debug!(device_id = %slot.device_id, "connect device registered");

        slot.registration = Registration::Active {
            connection_id: connection_id.clone(),
            registered_at: Instant::now(),
        };
        Ok((slot.device_id.clone(), connection_id))
    }

    async fn register_device(
        &self,
        creds: &Credentials,
        device_id: &str,
        connection_id: &str,
    ) -> Result<(), Error> {
        let url = join(&self.session.endpoints().track_playback, "devices")?;
        let body = json!({
            "device": {
                "device_id": device_id,
                "device_type": "computer",
                "brand": "spotify",
                "model": DEVICE_MODEL,
                "name": DEVICE_NAME,
                "is_group": false,
                "metadata": {},
                "platform_identifier": format!("web_player {};spogo", std::env::consts::OS),
                "capabilities": {
                    "change_volume": true,
                    "supports_file_media_type": true,
                    "enable_play_token": true,
                    "play_token_lost_behavior": "pause",
                    "disable_connect": false,
                    "audio_podcasts": true,
                    "video_playback": true,
                    "manifest_formats": [
                        "file_ids_mp3",
                        "file_urls_mp3",
                        "file_ids_mp4",
                        "manifest_ids_video",
                    ],
                },
            },
            "outro_endcontent_snooping": false,
            "connection_id": connection_id,
            "client_version": version_header(creds),
            "volume": MAX_VOLUME,
        });

        debug!(url = %url, "POST register device");
        let resp = self
            .request(reqwest::Method::POST, url, creds)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(token::api_error(resp).await);
        }
        Ok(())
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: Url,
        creds: &Credentials,
    ) -> reqwest::RequestBuilder {
        self.session
            .http()
            .request(method, url)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", creds.access_token.expose_secret()),
            )
            .header("Client-Token", creds.client_token.expose_secret())
            .header("Spotify-App-Version", version_header(creds))
            .header(CONTENT_TYPE, "application/json")
            .header("app-platform", "WebPlayer")
    }
}

fn version_header(creds: &Credentials) -> &str {
    if creds.connect_version.is_empty() {
        &creds.client_version
    } else {
        &creds.connect_version
    }
}

fn command_body(endpoint: &str, extra: Map<String, Value>) -> Value {
    let mut command = Map::new();
    command.insert("endpoint".into(), json!(endpoint));
    command.insert(
        "logging_params".into(),
        json!({ "command_id": random_hex_id() }),
    );
    command.extend(extra);
    Value::Object(command)
}

/// `play` fields: playable items skip to the uri, collections become the
/// context.
fn play_fields(uri: &str) -> Map<String, Value> {
    let mut extra = Map::new();
    if uri.starts_with("spotify:track:") || uri.starts_with("spotify:episode:") {
        extra.insert("options".into(), json!({ "skip_to": { "track_uri": uri } }));
    } else {
        extra.insert(
            "context".into(),
            json!({ "uri": uri, "url": format!("context://{uri}") }),
        );
    }
    extra
}
