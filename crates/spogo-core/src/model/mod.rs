// ── Domain model ──
//
// Canonical types every engine returns, whatever protocol produced them.

pub mod item;
pub mod page;
pub mod playback;

pub use item::{Item, ItemKind};
pub use page::{CursorPage, LibraryKind, Page, SearchResult};
pub use playback::{Device, PlaybackStatus, Queue, RepeatMode};
