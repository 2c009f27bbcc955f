use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use metrics::counter;
use tracing::{info, warn};

use crate::application::metrics::ORPHAN_DELETED;
use crate::application::repos::{AssetStore, AssetStoreError};
use crate::domain::assets::{self, AssetName, Variant};
use crate::domain::document::{DocumentId, InlineObject};

const SOURCE: &str = "docweave::application::assets::reconcile";

/// Variants already present in the store, keyed by inline object id.
pub type KnownVariants = HashMap<String, Vec<Variant>>;

/// Result of reconciling one document's stored assets.
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub known: KnownVariants,
    /// Paths deleted because no inline object claims them.
    pub removed: Vec<String>,
}

/// Aligns the asset store with a document's current inline objects.
#[derive(Clone)]
pub struct AssetReconciler {
    store: Arc<dyn AssetStore>,
}

impl AssetReconciler {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self { store }
    }

    /// Delete assets under the document's prefix that no inline object claims
    /// and group the remainder by object id. A listing failure is logged and
    /// reported as an empty result so rendering can proceed.
    pub async fn reconcile(
        &self,
        document_id: &DocumentId,
        inline_objects: &BTreeMap<String, InlineObject>,
    ) -> Reconciliation {
        let paths = match self.store.list(&assets::document_prefix(document_id)).await {
            Ok(paths) => paths,
            Err(err) => {
                warn!(
                    target = SOURCE,
                    document_id = %document_id,
                    error = %err,
                    "failed to list stored assets; treating as none"
                );
                return Reconciliation::default();
            }
        };

        let mut reconciliation = Reconciliation::default();
        for path in paths {
            let claimed = AssetName::parse(&path)
                .ok()
                .filter(|name| inline_objects.contains_key(name.object_id()));

            match claimed {
                Some(name) => {
                    let url = self.store.public_url(&path);
                    reconciliation
                        .known
                        .entry(name.object_id().to_string())
                        .or_default()
                        .push(Variant {
                            width: name.width(),
                            url,
                        });
                }
                None => {
                    if self.remove(&path).await.is_ok() {
                        reconciliation.removed.push(path);
                    }
                }
            }
        }

        if !reconciliation.removed.is_empty() {
            info!(
                target = SOURCE,
                document_id = %document_id,
                removed = reconciliation.removed.len(),
                "deleted orphaned assets"
            );
        }
        reconciliation
    }

    /// Delete every asset stored for `document_id`.
    pub async fn purge(&self, document_id: &str) -> Result<Vec<String>, AssetStoreError> {
        let paths = self.store.list(&format!("{document_id}/")).await?;
        let mut removed = Vec::with_capacity(paths.len());
        for path in paths {
            if self.remove(&path).await.is_ok() {
                removed.push(path);
            }
        }
        Ok(removed)
    }

    pub(crate) async fn remove(&self, path: &str) -> Result<(), AssetStoreError> {
        match self.store.delete(path).await {
            Ok(()) => {
                counter!(ORPHAN_DELETED).increment(1);
                Ok(())
            }
            Err(err) => {
                warn!(
                    target = SOURCE,
                    path,
                    error = %err,
                    "failed to delete orphaned asset"
                );
                Err(err)
            }
        }
    }
}
