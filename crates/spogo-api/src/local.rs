//! Desktop app control through AppleScript.
//!
//! Only meaningful on macOS, where `osascript` can drive the Spotify app.
//! Elsewhere every call fails with [`Error::Unsupported`].

use tracing::debug;

use crate::error::Error;

const FIELD_SEPARATOR: &str = "|||";

const STATUS_SCRIPT: &str = r#"tell application "Spotify"
	set trackName to name of current track
	set trackArtist to artist of current track
	set trackAlbum to album of current track
	set trackID to id of current track
	set trackDuration to duration of current track
	set playerPos to player position
	set playerState to player state as string
	set vol to sound volume
	set isShuffling to shuffling
	set isRepeating to repeating
	return trackName & "|||" & trackArtist & "|||" & trackAlbum & "|||" & trackID & "|||" & trackDuration & "|||" & playerPos & "|||" & playerState & "|||" & vol & "|||" & isShuffling & "|||" & isRepeating
end tell"#;

/// Player state as reported by the desktop app.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalStatus {
    pub track_name: String,
    pub artist: String,
    pub album: String,
    pub track_uri: String,
    pub duration_ms: u64,
    pub position_ms: u64,
    pub playing: bool,
    pub volume: u32,
    pub shuffling: bool,
    pub repeating: bool,
}

impl LocalStatus {
    /// Parse the `|||`-joined status line.
    pub fn parse(output: &str) -> Result<Self, Error> {
        let parts: Vec<&str> = output.trim().split(FIELD_SEPARATOR).collect();
        let [name, artist, album, uri, duration, position, state, volume, shuffling, repeating, ..] =
            parts.as_slice()
        else {
            return Err(Error::Script {
                message: format!("unexpected applescript output: {output}"),
            });
        };

        // AppleScript formats reals with the user's locale decimal mark.
        let position_secs: f64 = position.trim().replace(',', ".").parse().unwrap_or(0.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
        let position_ms = (position_secs.max(0.0) * 1000.0) as u64;

        Ok(Self {
            track_name: (*name).to_owned(),
            artist: (*artist).to_owned(),
            album: (*album).to_owned(),
            track_uri: (*uri).to_owned(),
            duration_ms: duration.trim().parse().unwrap_or(0),
            position_ms,
            playing: state.trim() == "playing",
            volume: volume.trim().parse().unwrap_or(0),
            shuffling: shuffling.trim() == "true",
            repeating: repeating.trim() == "true",
        })
    }
}

/// Runs AppleScript commands against the local Spotify app.
#[derive(Debug, Clone, Default)]
pub struct LocalPlayer;

impl LocalPlayer {
    pub fn new() -> Self {
        Self
    }

    /// `true` when this platform can run AppleScript.
    pub fn available() -> bool {
        cfg!(target_os = "macos")
    }

    pub async fn status(&self) -> Result<LocalStatus, Error> {
        let out = self.run(STATUS_SCRIPT).await?;
        LocalStatus::parse(&out)
    }

    pub async fn play(&self, uri: Option<&str>) -> Result<(), Error> {
        let script = match uri.filter(|u| !u.is_empty()) {
            Some(uri) => tell(&format!("play track \"{}\"", escape(uri))),
            None => tell("play"),
        };
        self.run(&script).await.map(drop)
    }

    pub async fn pause(&self) -> Result<(), Error> {
        self.run(&tell("pause")).await.map(drop)
    }

    pub async fn next(&self) -> Result<(), Error> {
        self.run(&tell("next track")).await.map(drop)
    }

    pub async fn previous(&self) -> Result<(), Error> {
        self.run(&tell("previous track")).await.map(drop)
    }

    pub async fn seek(&self, position_ms: i64) -> Result<(), Error> {
        let secs = position_ms.max(0) / 1000;
        self.run(&tell(&format!("set player position to {secs}")))
            .await
            .map(drop)
    }

    pub async fn set_volume(&self, percent: i64) -> Result<(), Error> {
        let percent = percent.clamp(0, 100);
        self.run(&tell(&format!("set sound volume to {percent}")))
            .await
            .map(drop)
    }

    pub async fn set_shuffling(&self, enabled: bool) -> Result<(), Error> {
        self.run(&tell(&format!("set shuffling to {enabled}")))
            .await
            .map(drop)
    }

    /// The app only knows repeat on or off.
    pub async fn set_repeating(&self, enabled: bool) -> Result<(), Error> {
        self.run(&tell(&format!("set repeating to {enabled}")))
            .await
            .map(drop)
    }

    #[cfg(target_os = "macos")]
    #[allow(clippy::unused_self)]
    async fn run(&self, script: &str) -> Result<String, Error> {
        debug!("running osascript");
        let output = tokio::process::Command::new("osascript")
            .arg("-e")
            .arg(script)
            .output()
            .await?;
        if !output.status.success() {
            return Err(Error::Script {
                message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }

    #[cfg(not(target_os = "macos"))]
    #[allow(clippy::unused_async, clippy::unused_self)]
    async fn run(&self, _script: &str) -> Result<String, Error> {
        debug!("applescript requested on unsupported platform");
        Err(Error::Unsupported("applescript"))
    }
}

fn tell(command: &str) -> String {
    format!("tell application \"Spotify\" to {command}")
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_line() {
        let status = LocalStatus::parse(
            "Song|||Artist|||Album|||spotify:track:abc|||215000|||12.5|||playing|||64|||true|||false\n",
        )
        .expect("status");
        assert_eq!(status.track_uri, "spotify:track:abc");
        assert_eq!(status.duration_ms, 215_000);
        assert_eq!(status.position_ms, 12_500);
        assert!(status.playing);
        assert_eq!(status.volume, 64);
        assert!(status.shuffling);
        assert!(!status.repeating);
    }

    #[test]
    fn comma_decimal_position() {
        let status =
            LocalStatus::parse("a|||b|||c|||spotify:track:x|||1|||3,25|||paused|||0|||false|||true")
                .expect("status");
        assert_eq!(status.position_ms, 3_250);
        assert!(!status.playing);
        assert!(status.repeating);
    }

    #[test]
    fn short_output_is_an_error() {
        assert!(matches!(
            LocalStatus::parse("only|||three|||fields"),
            Err(Error::Script { .. })
        ));
    }

    #[test]
    fn uri_is_escaped_in_script() {
        assert_eq!(
            tell(&format!("play track \"{}\"", escape("a\"b"))),
            r#"tell application "Spotify" to play track "a\"b""#
        );
    }

    #[cfg(not(target_os = "macos"))]
    #[tokio::test]
    async fn other_platforms_are_unsupported() {
        let err = LocalPlayer::new().pause().await.expect_err("unsupported");
        assert!(err.is_unsupported());
    }
}
