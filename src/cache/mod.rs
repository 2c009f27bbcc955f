//! Revision-aware cache of rendered documents.
//!
//! At most one entry is kept per document id. An entry is only served while
//! the source still reports the revision it was rendered from, so a cached
//! page never outlives an edit.

mod config;
mod store;

pub use config::CacheConfig;
pub use store::{CacheEntry, RenderCache};
