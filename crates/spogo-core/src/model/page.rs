// ── Paged results ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::item::{Item, ItemKind};

/// One page of search results for a single kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub limit: u32,
    pub offset: u32,
    pub total: u64,
    pub items: Vec<Item>,
}

/// Offset-paged listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Cursor-paged listing; `next_after` is empty on the last page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub next_after: String,
}

/// Saved-item collections in the user's library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LibraryKind {
    Tracks,
    Albums,
}
