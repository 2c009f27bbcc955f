//! Traits describing the external collaborators of the render pipeline.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::domain::document::{Document, DocumentId};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("document not found")]
    NotFound,
    #[error("access to document denied: {message}")]
    AccessDenied { message: String },
    #[error("document source unavailable: {0}")]
    Unavailable(String),
    #[error("document payload malformed: {0}")]
    Malformed(String),
}

impl SourceError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }

    /// True when the document is definitively gone or unshared, as opposed
    /// to a transient failure.
    pub fn is_permanent(&self) -> bool {
        matches!(self, SourceError::NotFound | SourceError::AccessDenied { .. })
    }
}

/// Entry of the source's document listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub name: Option<String>,
}

#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, id: &DocumentId) -> Result<Document, SourceError>;

    /// Every document this deployment knows about.
    async fn list(&self) -> Result<Vec<DocumentSummary>, SourceError>;
}

#[derive(Debug, Error)]
pub enum AssetStoreError {
    #[error("invalid asset path `{0}`")]
    InvalidPath(String),
    #[error("asset `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("asset backend error: {0}")]
    Backend(String),
}

/// Stored payload returned by [`AssetStore::read`].
#[derive(Debug, Clone)]
pub struct StoredAsset {
    pub data: Bytes,
    pub content_type: String,
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Paths of every asset whose path starts with `prefix`, sorted.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, AssetStoreError>;

    async fn exists(&self, path: &str) -> Result<bool, AssetStoreError>;

    /// Store the payload and return its public URL.
    async fn put(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, AssetStoreError>;

    /// Remove an asset. Missing assets are treated as success.
    async fn delete(&self, path: &str) -> Result<(), AssetStoreError>;

    async fn read(&self, path: &str) -> Result<StoredAsset, AssetStoreError>;

    /// Deterministic public URL of a path, whether or not it exists.
    fn public_url(&self, path: &str) -> String;
}

#[derive(Debug, Error)]
pub enum ImageFetchError {
    #[error("image request failed: {0}")]
    Request(String),
    #[error("image request returned status {0}")]
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub data: Bytes,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<FetchedImage, ImageFetchError>;
}
