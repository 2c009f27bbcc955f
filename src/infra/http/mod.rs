//! HTTP surface: document rendering, maintenance and asset serving.

mod middleware;
mod public;

pub use middleware::{REQUEST_ID_HEADER, RequestContext};
pub use public::{HttpState, build_router};

use axum::http::StatusCode;

use crate::application::error::HttpError;
use crate::application::repos::AssetStoreError;

/// Map an asset store error to the HTTP error served for `/assets`.
pub fn asset_error_to_http(source: &'static str, err: AssetStoreError) -> HttpError {
    match err {
        AssetStoreError::InvalidPath(_) | AssetStoreError::NotFound(_) => HttpError::from_error(
            source,
            StatusCode::NOT_FOUND,
            "Asset not found",
            &err,
        ),
        AssetStoreError::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
            HttpError::from_error(source, StatusCode::NOT_FOUND, "Asset not found", &err)
        }
        _ => HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to read asset",
            &err,
        ),
    }
}
