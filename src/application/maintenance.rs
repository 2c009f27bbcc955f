use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::application::assets::AssetReconciler;
use crate::application::locks::DocumentLocks;
use crate::application::repos::{AssetStore, DocumentSource, SourceError};
use crate::domain::assets;
use crate::domain::document::DocumentId;

const SOURCE: &str = "docweave::application::maintenance";

/// Outcome of one sweep over the asset store.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub documents_checked: usize,
    /// Documents skipped because the source failed transiently.
    pub documents_skipped: usize,
    pub removed: Vec<String>,
}

/// Deletes stored variants that no current inline object claims.
#[derive(Clone)]
pub struct SweepService {
    source: Arc<dyn DocumentSource>,
    store: Arc<dyn AssetStore>,
    reconciler: AssetReconciler,
    locks: DocumentLocks,
}

impl SweepService {
    pub fn new(source: Arc<dyn DocumentSource>, store: Arc<dyn AssetStore>) -> Self {
        Self {
            source,
            reconciler: AssetReconciler::new(Arc::clone(&store)),
            store,
            locks: DocumentLocks::new(),
        }
    }

    /// Share document locks with the renderer so a sweep never races a render.
    pub fn with_locks(mut self, locks: DocumentLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Sweep every document known to the source.
    ///
    /// Assets owned by documents the source no longer lists, or whose fetch
    /// reports not-found or access-denied, are deleted wholesale. Live
    /// documents are reconciled against their inline objects. A failing
    /// listing aborts the sweep before anything is deleted.
    pub async fn sweep_orphans(&self) -> Result<SweepReport, SourceError> {
        let documents = self.source.list().await?;
        let known: BTreeSet<&str> = documents.iter().map(|doc| doc.id.as_str()).collect();
        let mut report = SweepReport::default();

        match self.store.list("").await {
            Ok(paths) => {
                let owners: BTreeSet<&str> =
                    paths.iter().map(|path| assets::owner_of(path)).collect();
                for owner in owners.into_iter().filter(|owner| !known.contains(owner)) {
                    info!(
                        target = SOURCE,
                        owner,
                        "found assets of a document that no longer exists"
                    );
                    if paths.iter().any(|path| path == owner)
                        && self.reconciler.remove(owner).await.is_ok()
                    {
                        report.removed.push(owner.to_string());
                    }
                    self.purge(owner, &mut report).await;
                }
            }
            Err(err) => warn!(
                target = SOURCE,
                error = %err,
                "failed to list asset store; skipping unknown-owner pass"
            ),
        }

        for summary in &documents {
            let Ok(id) = DocumentId::parse(&summary.id) else {
                warn!(
                    target = SOURCE,
                    document_id = summary.id.as_str(),
                    "source listed an invalid document id"
                );
                report.documents_skipped += 1;
                continue;
            };

            match self.source.fetch(&id).await {
                Ok(document) => {
                    let _guard = self.locks.acquire(id.as_str()).await;
                    let reconciliation = self
                        .reconciler
                        .reconcile(&id, &document.inline_objects)
                        .await;
                    report.removed.extend(reconciliation.removed);
                    report.documents_checked += 1;
                }
                Err(err) if err.is_permanent() => {
                    warn!(
                        target = SOURCE,
                        document_id = %id,
                        error = %err,
                        "document unreachable; removing all of its assets"
                    );
                    let _guard = self.locks.acquire(id.as_str()).await;
                    self.purge(id.as_str(), &mut report).await;
                    report.documents_checked += 1;
                }
                Err(err) => {
                    warn!(
                        target = SOURCE,
                        document_id = %id,
                        error = %err,
                        "transient source failure; leaving assets untouched"
                    );
                    report.documents_skipped += 1;
                }
            }
        }

        info!(
            target = SOURCE,
            checked = report.documents_checked,
            skipped = report.documents_skipped,
            removed = report.removed.len(),
            "asset sweep finished"
        );
        Ok(report)
    }

    async fn purge(&self, document_id: &str, report: &mut SweepReport) {
        match self.reconciler.purge(document_id).await {
            Ok(removed) => report.removed.extend(removed),
            Err(err) => warn!(
                target = SOURCE,
                document_id,
                error = %err,
                "failed to list assets for purge"
            ),
        }
    }
}
