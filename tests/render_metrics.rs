mod support;

use std::collections::HashSet;

use metrics_util::debugging::DebuggingRecorder;

use support::{Entry, Harness, document, image_paragraph, paragraph};

#[tokio::test]
async fn render_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let harness = Harness::new();
    harness
        .source
        .insert(
            "doc1",
            Entry::Live(document(
                "r1",
                vec![paragraph("Intro"), image_paragraph("kix.1")],
                &[("kix.1", "https://images.test/1.png")],
            )),
        )
        .await;

    harness.renderer.render("doc1", false).await.expect("render");
    harness.renderer.render("doc1", false).await.expect("render");

    harness
        .source
        .insert(
            "doc1",
            Entry::Live(document("r2", vec![paragraph("Intro")], &[])),
        )
        .await;
    harness.renderer.render("doc1", false).await.expect("render");

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(key, _, _, _)| key.key().name().to_string())
        .collect();

    for expected in [
        "docweave_render_cache_hit_total",
        "docweave_render_cache_miss_total",
        "docweave_variant_uploaded_total",
        "docweave_orphan_deleted_total",
        "docweave_render_ms",
    ] {
        assert!(names.contains(expected), "missing metric {expected}");
    }
}
