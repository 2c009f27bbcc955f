#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use docweave::application::documents::DocumentRenderer;
use docweave::application::locks::DocumentLocks;
use docweave::application::maintenance::SweepService;
use docweave::application::repos::{
    AssetStore, AssetStoreError, DocumentSource, DocumentSummary, FetchedImage, ImageFetchError,
    ImageFetcher, SourceError, StoredAsset,
};
use docweave::cache::{CacheConfig, RenderCache};
use docweave::domain::document::{Document, DocumentId};
use docweave::infra::assets::MemoryAssetStore;
use docweave::infra::source::wire;

pub const PUBLIC_BASE: &str = "https://assets.test";

/// How a listed document answers a fetch.
pub enum Entry {
    Live(Value),
    Gone,
    Flaky,
}

#[derive(Default)]
pub struct StubSource {
    entries: Mutex<BTreeMap<String, Entry>>,
    fetches: AtomicUsize,
    listing_fails: bool,
}

impl StubSource {
    pub fn failing_listing() -> Self {
        Self {
            listing_fails: true,
            ..Default::default()
        }
    }

    pub async fn insert(&self, id: &str, entry: Entry) {
        self.entries.lock().await.insert(id.to_string(), entry);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for StubSource {
    async fn fetch(&self, id: &DocumentId) -> Result<Document, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.entries.lock().await.get(id.as_str()) {
            Some(Entry::Live(payload)) => wire::parse_document(id, payload.to_string().as_bytes()),
            Some(Entry::Gone) | None => Err(SourceError::NotFound),
            Some(Entry::Flaky) => Err(SourceError::Unavailable("connection reset".to_string())),
        }
    }

    async fn list(&self) -> Result<Vec<DocumentSummary>, SourceError> {
        if self.listing_fails {
            return Err(SourceError::Unavailable("listing timed out".to_string()));
        }
        Ok(self
            .entries
            .lock()
            .await
            .keys()
            .map(|id| DocumentSummary {
                id: id.clone(),
                name: None,
            })
            .collect())
    }
}

/// Serves the same PNG for every URI and counts requests.
pub struct StubFetcher {
    image: Bytes,
    fetches: AtomicUsize,
}

impl StubFetcher {
    pub fn png(width: u32, height: u32) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb([30u8, 120, 200]));
        let mut data = Vec::new();
        DynamicImage::ImageRgb8(buffer)
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .expect("png encodes");
        Self {
            image: Bytes::from(data),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for StubFetcher {
    async fn fetch(&self, _uri: &str) -> Result<FetchedImage, ImageFetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(FetchedImage {
            data: self.image.clone(),
            content_type: Some("image/png".to_string()),
        })
    }
}

/// Answers every request with an upstream 404.
#[derive(Default)]
pub struct FailingFetcher {
    fetches: AtomicUsize,
}

impl FailingFetcher {
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for FailingFetcher {
    async fn fetch(&self, _uri: &str) -> Result<FetchedImage, ImageFetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Err(ImageFetchError::Status(404))
    }
}

/// Memory store that can be told to fail specific operations.
pub struct FlakyStore {
    pub inner: MemoryAssetStore,
    failing_put_suffix: Option<&'static str>,
    failing_deletes: bool,
    failing_listing: bool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryAssetStore::new(PUBLIC_BASE),
            failing_put_suffix: None,
            failing_deletes: false,
            failing_listing: false,
        }
    }

    /// Reject uploads whose path ends with `suffix`.
    pub fn failing_puts(mut self, suffix: &'static str) -> Self {
        self.failing_put_suffix = Some(suffix);
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.failing_deletes = true;
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.failing_listing = true;
        self
    }

    pub async fn seed(&self, paths: &[&str]) {
        for path in paths {
            self.inner
                .put(path, Bytes::from_static(b"bytes"), "image/jpeg")
                .await
                .expect("seed asset");
        }
    }
}

#[async_trait]
impl AssetStore for FlakyStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, AssetStoreError> {
        if self.failing_listing {
            return Err(AssetStoreError::Backend("listing throttled".to_string()));
        }
        self.inner.list(prefix).await
    }

    async fn exists(&self, path: &str) -> Result<bool, AssetStoreError> {
        self.inner.exists(path).await
    }

    async fn put(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, AssetStoreError> {
        if self
            .failing_put_suffix
            .is_some_and(|suffix| path.ends_with(suffix))
        {
            return Err(AssetStoreError::Backend(format!("upload of {path} rejected")));
        }
        self.inner.put(path, data, content_type).await
    }

    async fn delete(&self, path: &str) -> Result<(), AssetStoreError> {
        if self.failing_deletes {
            return Err(AssetStoreError::Backend(format!("delete of {path} rejected")));
        }
        self.inner.delete(path).await
    }

    async fn read(&self, path: &str) -> Result<StoredAsset, AssetStoreError> {
        self.inner.read(path).await
    }

    fn public_url(&self, path: &str) -> String {
        self.inner.public_url(path)
    }
}

/// Renderer over arbitrary store and fetcher doubles.
pub fn renderer_with(
    source: Arc<StubSource>,
    store: Arc<dyn AssetStore>,
    fetcher: Arc<dyn ImageFetcher>,
) -> DocumentRenderer {
    DocumentRenderer::new(
        source,
        store,
        fetcher,
        Arc::new(RenderCache::new(&CacheConfig::default())),
    )
}

pub struct Harness {
    pub source: Arc<StubSource>,
    pub store: Arc<MemoryAssetStore>,
    pub fetcher: Arc<StubFetcher>,
    pub renderer: DocumentRenderer,
    pub sweeper: SweepService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_source(StubSource::default())
    }

    pub fn with_source(source: StubSource) -> Self {
        let source = Arc::new(source);
        let store = Arc::new(MemoryAssetStore::new(PUBLIC_BASE));
        let fetcher = Arc::new(StubFetcher::png(1600, 800));
        let cache = Arc::new(RenderCache::new(&CacheConfig::default()));
        let locks = DocumentLocks::new();

        let renderer = DocumentRenderer::new(
            source.clone(),
            store.clone(),
            fetcher.clone(),
            cache,
        )
        .with_locks(locks.clone())
        .with_share_principal(Some("renderer@docweave.test".to_string()));
        let sweeper = SweepService::new(source.clone(), store.clone()).with_locks(locks);

        Self {
            source,
            store,
            fetcher,
            renderer,
            sweeper,
        }
    }
}

pub fn paragraph(text: &str) -> Value {
    json!({"paragraph": {"elements": [{"textRun": {"content": format!("{text}\n")}}]}})
}

pub fn image_paragraph(object_id: &str) -> Value {
    json!({"paragraph": {"elements": [
        {"inlineObjectElement": {"inlineObjectId": object_id}}
    ]}})
}

/// Docs API payload with the given body elements and image objects.
pub fn document(revision: &str, content: Vec<Value>, images: &[(&str, &str)]) -> Value {
    let inline_objects: serde_json::Map<String, Value> = images
        .iter()
        .map(|(id, uri)| {
            (
                id.to_string(),
                json!({"inlineObjectProperties": {"embeddedObject": {
                    "imageProperties": {"contentUri": uri}
                }}}),
            )
        })
        .collect();

    json!({
        "revisionId": revision,
        "body": {"content": content},
        "inlineObjects": inline_objects,
    })
}
