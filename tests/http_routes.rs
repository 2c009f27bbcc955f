mod support;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
    response::Response,
};
use bytes::Bytes;
use tower::ServiceExt;

use docweave::application::repos::AssetStore;
use docweave::infra::http::{HttpState, REQUEST_ID_HEADER, build_router};
use support::{Entry, Harness, document, paragraph};

fn router(harness: &Harness) -> Router {
    build_router(HttpState {
        renderer: Arc::new(harness.renderer.clone()),
        sweeper: Arc::new(harness.sweeper.clone()),
        source: harness.source.clone(),
        store: harness.store.clone(),
    })
}

async fn send(app: &Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    app.clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

#[tokio::test]
async fn index_greets() {
    let harness = Harness::new();
    let response = send(&router(&harness), Method::GET, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Hello World");
}

#[tokio::test]
async fn health_is_no_content() {
    let harness = Harness::new();
    let response = send(&router(&harness), Method::GET, "/_health").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn documents_render_as_html_with_cache_status() {
    let harness = Harness::new();
    harness
        .source
        .insert(
            "doc1",
            Entry::Live(document("r1", vec![paragraph("Hello")], &[])),
        )
        .await;
    let app = router(&harness);

    let first = send(&app, Method::GET, "/doc/doc1").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()["x-docweave-cache"], "miss");
    assert!(
        first.headers()[CONTENT_TYPE]
            .to_str()
            .expect("header")
            .starts_with("text/html")
    );
    assert_eq!(body_text(first).await, "<p>Hello</p>");

    let second = send(&app, Method::GET, "/doc/doc1").await;
    assert_eq!(second.headers()["x-docweave-cache"], "hit");

    let fresh = send(&app, Method::GET, "/doc/doc1?fresh=true").await;
    assert_eq!(fresh.headers()["x-docweave-cache"], "bypass");
}

#[tokio::test]
async fn invalid_ids_are_bad_requests() {
    let harness = Harness::new();
    let response = send(&router(&harness), Method::GET, "/doc/notes.txt").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(harness.source.fetch_count(), 0);
}

#[tokio::test]
async fn unreachable_documents_return_guidance() {
    let harness = Harness::new();
    let response = send(&router(&harness), Method::GET, "/doc/missing").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("renderer@docweave.test"));
}

#[tokio::test]
async fn prune_sweeps_and_reports_done() {
    let harness = Harness::new();
    harness
        .store
        .put("ghost/kix.1-tiny.jpg", Bytes::from_static(b"x"), "image/jpeg")
        .await
        .expect("seed");

    let response = send(&router(&harness), Method::POST, "/prune").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Done");
    assert!(harness.store.paths().await.is_empty());
}

#[tokio::test]
async fn documents_are_listed_as_json() {
    let harness = Harness::new();
    harness.source.insert("alpha", Entry::Gone).await;
    harness.source.insert("beta", Entry::Flaky).await;

    let response = send(&router(&harness), Method::GET, "/documents").await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed: serde_json::Value =
        serde_json::from_str(&body_text(response).await).expect("json body");
    assert_eq!(
        listed,
        serde_json::json!([
            {"id": "alpha", "name": null},
            {"id": "beta", "name": null}
        ])
    );
}

#[tokio::test]
async fn stored_assets_are_served() {
    let harness = Harness::new();
    harness
        .store
        .put(
            "doc1/kix.1-small.jpg",
            Bytes::from_static(b"jpeg-bytes"),
            "image/jpeg",
        )
        .await
        .expect("seed");
    let app = router(&harness);

    let response = send(&app, Method::GET, "/assets/doc1/kix.1-small.jpg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "image/jpeg");
    assert_eq!(body_text(response).await, "jpeg-bytes");

    let missing = send(&app, Method::GET, "/assets/doc1/absent-tiny.jpg").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_renders_still_carry_a_request_id() {
    let harness = Harness::new();
    let response = send(&router(&harness), Method::GET, "/doc/missing").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}
