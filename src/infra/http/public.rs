use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE},
    },
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::application::{
    documents::DocumentRenderer,
    error::HttpError,
    maintenance::SweepService,
    repos::{AssetStore, DocumentSource, StoredAsset},
};

use super::{
    asset_error_to_http,
    middleware::{log_responses, set_request_context},
};

pub(super) const CACHE_STATUS_HEADER: &str = "x-docweave-cache";

#[derive(Clone)]
pub struct HttpState {
    pub renderer: Arc<DocumentRenderer>,
    pub sweeper: Arc<SweepService>,
    pub source: Arc<dyn DocumentSource>,
    pub store: Arc<dyn AssetStore>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/doc/{id}", get(render_document))
        .route("/prune", post(prune))
        .route("/documents", get(list_documents))
        .route("/assets/{*path}", get(serve_asset))
        .route("/_health", get(health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RenderQuery {
    fresh: bool,
}

async fn index() -> &'static str {
    "Hello World"
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn render_document(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    Query(query): Query<RenderQuery>,
) -> Response {
    match state.renderer.render(&id, query.fresh).await {
        Ok(outcome) => {
            let mut response = Html(outcome.html).into_response();
            response.headers_mut().insert(
                CACHE_STATUS_HEADER,
                HeaderValue::from_static(outcome.cache.as_str()),
            );
            response
                .headers_mut()
                .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
            response
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn prune(State(state): State<HttpState>) -> Response {
    match state.sweeper.sweep_orphans().await {
        Ok(_) => "Done".into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn list_documents(State(state): State<HttpState>) -> Response {
    match state.source.list().await {
        Ok(documents) => Json(documents).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn serve_asset(State(state): State<HttpState>, Path(path): Path<String>) -> Response {
    const SOURCE: &str = "infra::http::public::serve_asset";

    match state.store.read(&path).await {
        Ok(asset) => build_asset_response(asset),
        Err(err) => asset_error_to_http(SOURCE, err).into_response(),
    }
}

fn build_asset_response(asset: StoredAsset) -> Response {
    let length = asset.data.len();
    let mut response = Response::new(Body::from(asset.data));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&asset.content_type) {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&length.to_string()) {
        headers.insert(CONTENT_LENGTH, value);
    }
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );

    response
}
