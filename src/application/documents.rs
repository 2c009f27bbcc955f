//! Document rendering service: fetch, render, resolve images, cache.

use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use tracing::{debug, info, warn};

use crate::application::assets::{AssetReconciler, VariantGenerator};
use crate::application::error::RenderError;
use crate::application::locks::DocumentLocks;
use crate::application::render::{MarkupRenderer, PlaceholderResolver, finalize};
use crate::application::metrics::RENDER_MS;
use crate::application::repos::{AssetStore, DocumentSource, ImageFetcher, SourceError};
use crate::cache::RenderCache;
use crate::domain::document::{Document, DocumentId};

const SOURCE: &str = "docweave::application::documents";

/// How a render was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// The caller asked for a fresh render; the cache was written but not read.
    Bypass,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Bypass => "bypass",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub html: String,
    pub cache: CacheStatus,
}

#[derive(Clone)]
pub struct DocumentRenderer {
    source: Arc<dyn DocumentSource>,
    cache: Arc<RenderCache>,
    markup: Arc<MarkupRenderer>,
    reconciler: AssetReconciler,
    resolver: PlaceholderResolver,
    locks: DocumentLocks,
    share_with: Option<String>,
}

impl DocumentRenderer {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        store: Arc<dyn AssetStore>,
        fetcher: Arc<dyn ImageFetcher>,
        cache: Arc<RenderCache>,
    ) -> Self {
        Self {
            source,
            cache,
            markup: Arc::new(MarkupRenderer::new()),
            reconciler: AssetReconciler::new(Arc::clone(&store)),
            resolver: PlaceholderResolver::new(VariantGenerator::new(store, fetcher)),
            locks: DocumentLocks::new(),
            share_with: None,
        }
    }

    pub fn with_locks(mut self, locks: DocumentLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Principal that documents must be shared with; quoted in error guidance.
    pub fn with_share_principal(mut self, principal: Option<String>) -> Self {
        self.share_with = principal;
        self
    }

    /// Render a document by raw id. Unless `force_fresh` is set, a cached
    /// rendering of the current revision is returned as-is; a fresh render is
    /// always written back.
    pub async fn render(
        &self,
        raw_id: &str,
        force_fresh: bool,
    ) -> Result<RenderOutcome, RenderError> {
        let id = DocumentId::parse(raw_id)?;
        let document = self.source.fetch(&id).await.map_err(|err| {
            warn!(
                target = SOURCE,
                document_id = %id,
                error = %err,
                "failed to fetch document"
            );
            let guidance = self.guidance(&err);
            RenderError::source_unavailable(err, guidance)
        })?;

        if !force_fresh
            && let Some(html) = self.cache.get(id.as_str(), document.revision_id.as_deref())
        {
            debug!(
                target = SOURCE,
                document_id = %id,
                revision_id = document.revision_id.as_deref(),
                "serving cached render"
            );
            return Ok(RenderOutcome {
                html,
                cache: CacheStatus::Hit,
            });
        }

        let html = self.render_document(&document).await;
        self.cache
            .put(id.as_str(), document.revision_id.clone(), html.clone());

        Ok(RenderOutcome {
            html,
            cache: if force_fresh {
                CacheStatus::Bypass
            } else {
                CacheStatus::Miss
            },
        })
    }

    /// Full pipeline for an already fetched document, bypassing the cache.
    pub async fn render_document(&self, document: &Document) -> String {
        let started = Instant::now();
        let markup = self.markup.render_document(document);

        let resolved = {
            let _guard = self.locks.acquire(document.id.as_str()).await;
            let reconciliation = self
                .reconciler
                .reconcile(&document.id, &document.inline_objects)
                .await;
            self.resolver
                .resolve_all(
                    &document.id,
                    &markup,
                    &document.inline_objects,
                    &reconciliation.known,
                )
                .await
        };

        let html = finalize(&resolved);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        histogram!(RENDER_MS).record(elapsed_ms);
        info!(
            target = SOURCE,
            document_id = %document.id,
            revision_id = document.revision_id.as_deref(),
            inline_objects = document.inline_objects.len(),
            bytes = html.len(),
            elapsed_ms,
            "rendered document"
        );
        html
    }

    fn guidance(&self, error: &SourceError) -> String {
        match (error.is_permanent(), self.share_with.as_deref()) {
            (true, Some(principal)) => format!(
                "No data found. Share the document with <b>{principal}</b> if you haven't already!"
            ),
            (true, None) => {
                "No data found. Make sure the document exists and is shared with this service."
                    .to_string()
            }
            (false, _) => format!("The document source could not be reached: {error}"),
        }
    }
}
