// ── Response normalization ──
//
// Turns private GraphQL payloads, connect-state snapshots and documented
// Web API models into the canonical model.

pub(crate) mod json;

pub mod extract;
pub mod state;
pub mod web;

pub use extract::{collect_items, extract_item, extract_item_from_payload, extract_search_items};
pub use state::{map_devices, map_playback, map_queue};
pub use web::search_item;
