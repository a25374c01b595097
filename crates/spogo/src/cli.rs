//! Clap derive structures for the `spogo` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use spogo_core::{Engine, ItemKind, RepeatMode};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// spogo -- Spotify from the terminal, authenticated with browser cookies
#[derive(Debug, Parser)]
#[command(
    name = "spogo",
    version,
    about = "Control Spotify from the command line",
    long_about = "Search the catalog, drive playback and manage your library using the\n\
        cookies of a logged-in open.spotify.com session.\n\n\
        Playback goes through Spotify Connect by default, with the documented\n\
        Web API as fallback.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "SPOGO_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Market (ISO country code) for catalog requests
    #[arg(long, env = "SPOGO_MARKET", global = true)]
    pub market: Option<String>,

    /// Response language
    #[arg(long, env = "SPOGO_LANGUAGE", global = true)]
    pub language: Option<String>,

    /// Device id for playback commands
    #[arg(long, env = "SPOGO_DEVICE", global = true)]
    pub device: Option<String>,

    /// Backend engine
    #[arg(long, short = 'e', env = "SPOGO_ENGINE", global = true)]
    pub engine: Option<EngineArg>,

    /// Cookie file (overrides the profile's cookie path)
    #[arg(long, env = "SPOGO_COOKIES", global = true)]
    pub cookies: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "SPOGO_TIMEOUT", global = true,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', env = "SPOGO_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Value Enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Plain text, one URI or id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EngineArg {
    /// Connect first, Web API when connect cannot serve a call
    Auto,
    /// Web API first, connect on rate limits
    Web,
    /// Private connect protocol only
    Connect,
    /// Desktop app via AppleScript (macOS)
    Applescript,
}

impl From<EngineArg> for Engine {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Auto => Self::Auto,
            EngineArg::Web => Self::Web,
            EngineArg::Connect => Self::Connect,
            EngineArg::Applescript => Self::Applescript,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Track,
    Album,
    Artist,
    Playlist,
    Show,
    Episode,
}

impl From<KindArg> for ItemKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Track => Self::Track,
            KindArg::Album => Self::Album,
            KindArg::Artist => Self::Artist,
            KindArg::Playlist => Self::Playlist,
            KindArg::Show => Self::Show,
            KindArg::Episode => Self::Episode,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        matches!(self, Self::On)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RepeatArg {
    Off,
    Track,
    Context,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Off => Self::Off,
            RepeatArg::Track => Self::Track,
            RepeatArg::Context => Self::Context,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the catalog
    #[command(alias = "s")]
    Search(SearchArgs),

    /// Show details for a URI or open.spotify.com link
    Info {
        /// spotify:<kind>:<id> URI or share link
        resource: String,
    },

    /// Show what is playing
    #[command(alias = "st")]
    Status,

    /// Resume playback, or start a track, album, playlist or episode
    Play {
        /// URI or share link to start
        resource: Option<String>,
    },

    /// Pause playback
    Pause,

    /// Skip to the next track
    Next,

    /// Go back to the previous track
    #[command(alias = "previous")]
    Prev,

    /// Seek within the current track
    Seek {
        /// Position in milliseconds
        #[arg(value_parser = clap::value_parser!(i64).range(0..))]
        position_ms: i64,
    },

    /// Set the volume
    #[command(alias = "vol")]
    Volume {
        /// Percent (0-100)
        #[arg(value_parser = clap::value_parser!(i64).range(0..=100))]
        percent: i64,
    },

    /// Turn shuffle on or off
    Shuffle {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Set the repeat mode
    Repeat {
        #[arg(value_enum)]
        mode: RepeatArg,
    },

    /// List devices or transfer playback
    #[command(alias = "devices")]
    Device(DeviceArgs),

    /// Inspect or extend the play queue
    Queue(QueueArgs),

    /// Saved tracks, saved albums and followed artists
    #[command(alias = "lib")]
    Library(LibraryArgs),

    /// Manage playlists
    #[command(alias = "pl")]
    Playlist(PlaylistArgs),

    /// Manage browser cookies
    Auth(AuthArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Pagination for offset-based list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Max results (1-50)
    #[arg(long, short = 'l', default_value = "20",
          value_parser = clap::value_parser!(u32).range(1..=50))]
    pub limit: u32,

    /// Pagination offset
    #[arg(long, default_value = "0")]
    pub offset: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SEARCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// What to search for
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Search terms
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Max results (1-50)
    #[arg(long, short = 'l', default_value = "10",
          value_parser = clap::value_parser!(u32).range(1..=50))]
    pub limit: u32,

    /// Pagination offset
    #[arg(long, default_value = "0")]
    pub offset: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES & QUEUE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// List available playback devices
    #[command(alias = "ls")]
    List,

    /// Transfer playback to a device
    Set {
        /// Device id (see `spogo device list`)
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub command: QueueCommand,
}

#[derive(Debug, Subcommand)]
pub enum QueueCommand {
    /// Append a track or episode to the queue
    Add {
        /// URI, share link, or track id
        resource: String,
    },

    /// Show the current queue
    Show,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LIBRARY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LibraryArgs {
    #[command(subcommand)]
    pub command: LibraryCommand,
}

#[derive(Debug, Subcommand)]
pub enum LibraryCommand {
    /// Saved tracks
    Tracks(SavedArgs),

    /// Saved albums
    Albums(SavedArgs),

    /// Followed artists
    Artists(ArtistsArgs),
}

#[derive(Debug, Args)]
pub struct SavedArgs {
    #[command(subcommand)]
    pub command: SavedCommand,
}

#[derive(Debug, Subcommand)]
pub enum SavedCommand {
    /// List saved items
    #[command(alias = "ls")]
    List(ListArgs),

    /// Save items to the library
    Add {
        /// URIs, share links, or ids
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },

    /// Remove items from the library
    #[command(alias = "rm")]
    Remove {
        /// URIs, share links, or ids
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },
}

#[derive(Debug, Args)]
pub struct ArtistsArgs {
    #[command(subcommand)]
    pub command: ArtistsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ArtistsCommand {
    /// List followed artists
    #[command(alias = "ls")]
    List {
        /// Max results (1-50)
        #[arg(long, short = 'l', default_value = "20",
              value_parser = clap::value_parser!(u32).range(1..=50))]
        limit: u32,

        /// Cursor from a previous page
        #[arg(long)]
        after: Option<String>,
    },

    /// Follow artists
    Follow {
        #[arg(required = true, num_args = 1..)]
        artists: Vec<String>,
    },

    /// Unfollow artists
    Unfollow {
        #[arg(required = true, num_args = 1..)]
        artists: Vec<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PLAYLISTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PlaylistArgs {
    #[command(subcommand)]
    pub command: PlaylistCommand,
}

#[derive(Debug, Subcommand)]
pub enum PlaylistCommand {
    /// List your playlists
    #[command(alias = "ls")]
    List(ListArgs),

    /// Create a playlist
    Create {
        /// Playlist name
        name: String,

        /// Make the playlist public
        #[arg(long)]
        public: bool,

        /// Allow collaborators
        #[arg(long)]
        collaborative: bool,
    },

    /// List the tracks of a playlist
    Tracks {
        /// Playlist URI, link, or id
        playlist: String,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Add tracks or episodes to a playlist
    Add {
        /// Playlist URI, link, or id
        playlist: String,

        /// Track or episode URIs, links, or track ids
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },

    /// Remove tracks or episodes from a playlist
    #[command(alias = "rm")]
    Remove {
        /// Playlist URI, link, or id
        playlist: String,

        /// Track or episode URIs, links, or track ids
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH & COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Copy an exported cookie JSON file into the profile's cookie path
    Import {
        /// JSON array of cookies exported from open.spotify.com
        file: PathBuf,
    },

    /// Show where the active profile reads cookies from
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_joins_multiple_words() {
        let cli = Cli::try_parse_from(["spogo", "search", "track", "say", "it", "ain't", "so"])
            .expect("parse");
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.query.join(" "), "say it ain't so");
        assert_eq!(args.limit, 10);
    }

    #[test]
    fn volume_is_range_checked() {
        assert!(Cli::try_parse_from(["spogo", "volume", "101"]).is_err());
        assert!(Cli::try_parse_from(["spogo", "volume", "0"]).is_ok());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["spogo", "status", "--engine", "web", "-o", "json"])
            .expect("parse");
        assert!(matches!(cli.global.engine, Some(EngineArg::Web)));
        assert_eq!(cli.global.output, Some(OutputFormat::Json));
    }
}
