use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::application::repos::{AssetStore, AssetStoreError, StoredAsset};

use super::join_public_url;

/// Ephemeral in-process asset store for development and tests.
#[derive(Debug)]
pub struct MemoryAssetStore {
    public_base: String,
    assets: RwLock<BTreeMap<String, StoredAsset>>,
    puts: AtomicUsize,
}

impl MemoryAssetStore {
    pub fn new(public_base: impl Into<String>) -> Self {
        Self {
            public_base: public_base.into(),
            assets: RwLock::new(BTreeMap::new()),
            puts: AtomicUsize::new(0),
        }
    }

    /// Number of successful `put` calls since creation.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::Relaxed)
    }

    pub async fn paths(&self) -> Vec<String> {
        self.assets.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, AssetStoreError> {
        Ok(self
            .assets
            .read()
            .await
            .range(prefix.to_string()..)
            .map(|(path, _)| path)
            .take_while(|path| path.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn exists(&self, path: &str) -> Result<bool, AssetStoreError> {
        Ok(self.assets.read().await.contains_key(path))
    }

    async fn put(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, AssetStoreError> {
        if path.is_empty() {
            return Err(AssetStoreError::InvalidPath(path.to_string()));
        }
        self.assets.write().await.insert(
            path.to_string(),
            StoredAsset {
                data,
                content_type: content_type.to_string(),
            },
        );
        self.puts.fetch_add(1, Ordering::Relaxed);
        Ok(self.public_url(path))
    }

    async fn delete(&self, path: &str) -> Result<(), AssetStoreError> {
        self.assets.write().await.remove(path);
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<StoredAsset, AssetStoreError> {
        self.assets
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| AssetStoreError::NotFound(path.to_string()))
    }

    fn public_url(&self, path: &str) -> String {
        join_public_url(&self.public_base, path)
    }
}
