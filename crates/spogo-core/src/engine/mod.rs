// ── Engines ──
//
// One `SpotifyBackend` per transport: the private connect/pathfinder
// protocol, the documented Web API and the desktop app via AppleScript.

pub mod connect;
pub mod local;
pub mod web;

pub use connect::ConnectEngine;
pub use local::LocalEngine;
pub use web::WebEngine;

/// Page size used when a caller passes zero.
pub const DEFAULT_LIMIT: u32 = 10;

pub(crate) fn effective_limit(limit: u32) -> u32 {
    if limit == 0 { DEFAULT_LIMIT } else { limit }
}
