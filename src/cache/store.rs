use std::sync::{Mutex, MutexGuard};

use lru::LruCache;
use metrics::counter;
use time::OffsetDateTime;
use tracing::warn;

use crate::application::metrics::{RENDER_CACHE_HIT, RENDER_CACHE_MISS};

use super::config::CacheConfig;

const SOURCE: &str = "docweave::cache::store";

/// Rendered HTML for one document at one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub revision_id: Option<String>,
    pub html: String,
    pub rendered_at: OffsetDateTime,
}

/// LRU-bounded map from document id to its latest rendering.
pub struct RenderCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl RenderCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    /// Cached HTML for `document_id`, if it was rendered from `revision_id`.
    /// A document without a revision id never hits.
    pub fn get(&self, document_id: &str, revision_id: Option<&str>) -> Option<String> {
        let html = revision_id.and_then(|revision_id| {
            self.entries("get")
                .get(document_id)
                .filter(|entry| entry.revision_id.as_deref() == Some(revision_id))
                .map(|entry| entry.html.clone())
        });

        let name = if html.is_some() {
            RENDER_CACHE_HIT
        } else {
            RENDER_CACHE_MISS
        };
        counter!(name).increment(1);
        html
    }

    /// Insert or replace the entry for `document_id`.
    pub fn put(&self, document_id: &str, revision_id: Option<String>, html: String) {
        let entry = CacheEntry {
            revision_id,
            html,
            rendered_at: OffsetDateTime::now_utc(),
        };
        self.entries("put").put(document_id.to_string(), entry);
    }

    /// Current entry without touching recency.
    pub fn entry(&self, document_id: &str) -> Option<CacheEntry> {
        self.entries("entry").peek(document_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries("len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A panic while the lock was held may have left a half-written entry,
    /// so a poisoned cache is emptied before it is used again.
    fn entries(&self, op: &'static str) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                warn!(
                    target = SOURCE,
                    op,
                    dropped = guard.len(),
                    "render cache lock poisoned; discarding cached documents"
                );
                guard.clear();
                self.entries.clear_poison();
                guard
            }
        }
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
