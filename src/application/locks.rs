use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-document async mutexes serialising asset reconciliation and variant
/// generation for the same document.
#[derive(Default, Clone)]
pub struct DocumentLocks {
    documents: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl DocumentLocks {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(DashMap::new()),
        }
    }

    pub async fn acquire(&self, document_id: &str) -> DocumentGuard {
        let lock = self
            .documents
            .entry(document_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;
        DocumentGuard {
            document_id: document_id.to_string(),
            documents: Arc::clone(&self.documents),
            guard: Some(guard),
        }
    }
}

pub struct DocumentGuard {
    document_id: String,
    documents: Arc<DashMap<String, Arc<Mutex<()>>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DocumentGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map itself still references an idle lock.
        self.documents
            .remove_if(&self.document_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
