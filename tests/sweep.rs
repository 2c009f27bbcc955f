mod support;

use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;

use docweave::application::assets::VariantGenerator;
use docweave::application::repos::AssetStore;
use docweave::domain::document::DocumentId;
use docweave::infra::assets::MemoryAssetStore;
use support::{Entry, Harness, StubFetcher, StubSource, document, image_paragraph};

async fn seed(store: &MemoryAssetStore, paths: &[&str]) {
    for path in paths {
        store
            .put(path, Bytes::from_static(b"bytes"), "image/jpeg")
            .await
            .expect("seed asset");
    }
}

#[tokio::test]
async fn sweep_deletes_exactly_the_orphans() {
    let harness = Harness::new();
    harness
        .source
        .insert(
            "live",
            Entry::Live(document(
                "r1",
                vec![image_paragraph("kix.1")],
                &[("kix.1", "https://images.test/1.png")],
            )),
        )
        .await;
    harness.source.insert("gone", Entry::Gone).await;
    harness.source.insert("flaky", Entry::Flaky).await;

    seed(
        &harness.store,
        &[
            "live/kix.1-large.jpg",
            "live/kix.1-tiny.jpg",
            "live/kix.old-tiny.jpg",
            "live/notes.txt",
            "gone/kix.2-small.jpg",
            "flaky/kix.3-tiny.gif",
            "deleted/kix.4-large.jpg",
        ],
    )
    .await;

    let report = harness.sweeper.sweep_orphans().await.expect("sweep");

    assert_eq!(
        harness.store.paths().await,
        vec![
            "flaky/kix.3-tiny.gif",
            "live/kix.1-large.jpg",
            "live/kix.1-tiny.jpg"
        ]
    );
    let removed: BTreeSet<&str> = report.removed.iter().map(String::as_str).collect();
    assert_eq!(
        removed,
        BTreeSet::from([
            "deleted/kix.4-large.jpg",
            "gone/kix.2-small.jpg",
            "live/kix.old-tiny.jpg",
            "live/notes.txt",
        ])
    );
    assert_eq!(report.documents_checked, 2);
    assert_eq!(report.documents_skipped, 1);
    assert_eq!(harness.fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn failed_listing_deletes_nothing() {
    let harness = Harness::with_source(StubSource::failing_listing());
    seed(&harness.store, &["doc1/kix.1-tiny.jpg"]).await;

    harness
        .sweeper
        .sweep_orphans()
        .await
        .expect_err("listing fails");

    assert_eq!(harness.store.paths().await, vec!["doc1/kix.1-tiny.jpg"]);
}

#[tokio::test]
async fn generator_short_circuits_on_terminal_variant() {
    let store = Arc::new(MemoryAssetStore::new(support::PUBLIC_BASE));
    let fetcher = Arc::new(StubFetcher::png(640, 480));
    seed(&store, &["doc1/kix.5-tiny.jpg"]).await;

    let generator = VariantGenerator::new(store.clone(), fetcher.clone());
    let id = DocumentId::parse("doc1").expect("id");
    let variants = generator
        .generate(&id, "kix.5", "https://images.test/5.png")
        .await;

    let widths: Vec<u32> = variants.iter().map(|variant| variant.width).collect();
    assert_eq!(widths, vec![1200, 500, 100]);
    assert_eq!(
        variants[0].url,
        "https://assets.test/doc1/kix.5-large.jpg"
    );
    assert_eq!(store.put_count(), 1);
    assert_eq!(fetcher.fetch_count(), 1);
}

#[tokio::test]
async fn generator_never_upscales_small_sources() {
    let store = Arc::new(MemoryAssetStore::new(support::PUBLIC_BASE));
    let fetcher = Arc::new(StubFetcher::png(300, 200));

    let generator = VariantGenerator::new(store.clone(), fetcher);
    let id = DocumentId::parse("doc1").expect("id");
    let variants = generator
        .generate(&id, "kix.6", "https://images.test/6.png")
        .await;

    assert_eq!(variants.len(), 3);
    let large = store.read("doc1/kix.6-large.jpg").await.expect("stored");
    let decoded = image::load_from_memory(&large.data).expect("decodes");
    assert_eq!((decoded.width(), decoded.height()), (300, 200));

    let tiny = store.read("doc1/kix.6-tiny.jpg").await.expect("stored");
    let decoded = image::load_from_memory(&tiny.data).expect("decodes");
    assert_eq!((decoded.width(), decoded.height()), (100, 67));
}
