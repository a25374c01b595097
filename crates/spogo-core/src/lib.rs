//! Engines, routing and the canonical model between `spogo-api` and the CLI.
//!
//! - **[`SpotifyBackend`]**: the capability surface every engine and router
//!   implements. Operations an engine cannot serve report
//!   [`CoreError::Unsupported`].
//!
//! - **Engines** ([`engine`]): [`ConnectEngine`] speaks the private
//!   pathfinder/connect-state protocol, [`WebEngine`] the documented Web
//!   API, [`LocalEngine`] the desktop app through AppleScript.
//!
//! - **Routers** ([`router`]): [`AutoRouter`] retries unsupported or
//!   rate-limited calls on a secondary engine; [`FallbackRouter`] keeps the
//!   web engine in charge and only moves playback calls on HTTP 429.
//!
//! - **Normalization** ([`convert`]): untyped GraphQL payloads, connect-state
//!   snapshots and Web API models all become [`Item`], [`PlaybackStatus`],
//!   [`Device`] and [`Queue`].
//!
//! [`build_backend`] assembles the stack a [`ClientConfig`] asks for.

pub mod backend;
pub mod cancel;
pub mod client;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod model;
pub mod resource;
pub mod router;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::SpotifyBackend;
pub use cancel::cancellable;
pub use client::build_backend;
pub use config::{ClientConfig, Engine};
pub use engine::{ConnectEngine, LocalEngine, WebEngine};
pub use error::CoreError;
pub use resource::Resource;
pub use router::{AutoRouter, FallbackPolicy, FallbackRouter};

pub use model::{
    CursorPage, Device, Item, ItemKind, LibraryKind, Page, PlaybackStatus, Queue, RepeatMode,
    SearchResult,
};
