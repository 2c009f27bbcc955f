use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

use super::public::CACHE_STATUS_HEADER;

const SOURCE: &str = "docweave::http::response";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request facts shared by handlers and the response log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
    /// Raw id of the document addressed by `/doc/{id}`, if any.
    pub document_id: Option<String>,
}

impl RequestContext {
    fn from_request(request: &Request<Body>) -> Self {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty() && value.len() <= 128)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            request_id,
            document_id: document_id(request.uri().path()).map(str::to_string),
        }
    }
}

fn document_id(path: &str) -> Option<&str> {
    path.strip_prefix("/doc/")
        .filter(|rest| !rest.is_empty() && !rest.contains('/'))
}

/// Attach a [`RequestContext`] and echo its request id back to the client.
pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::from_request(&request);
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response.extensions_mut().insert(ctx);
    response
}

/// Log every document render and every failed request.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let ctx = request.extensions().get::<RequestContext>().cloned();
    let started = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();
    let report = response.extensions_mut().remove::<ErrorReport>();

    let line = ResponseLine {
        status,
        method: method.as_str(),
        path: &path,
        request_id: ctx.as_ref().map_or("", |ctx| ctx.request_id.as_str()),
        document_id: ctx.as_ref().and_then(|ctx| ctx.document_id.as_deref()),
        cache: cache_status(response.headers()),
        elapsed_ms: started.elapsed().as_millis(),
    };

    if status.is_client_error() || status.is_server_error() {
        line.failure(report);
    } else if line.document_id.is_some() {
        line.served();
    }
    response
}

fn cache_status(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CACHE_STATUS_HEADER)
        .and_then(|value| value.to_str().ok())
}

struct ResponseLine<'a> {
    status: StatusCode,
    method: &'a str,
    path: &'a str,
    request_id: &'a str,
    document_id: Option<&'a str>,
    cache: Option<&'a str>,
    elapsed_ms: u128,
}

impl ResponseLine<'_> {
    fn served(&self) {
        info!(
            target = SOURCE,
            status = self.status.as_u16(),
            document_id = self.document_id,
            cache = self.cache,
            elapsed_ms = self.elapsed_ms,
            request_id = self.request_id,
            "document served"
        );
    }

    fn failure(&self, report: Option<ErrorReport>) {
        let (source, messages) = report
            .map(|report| (report.source, report.messages))
            .unwrap_or(("unknown", Vec::new()));
        let detail = messages
            .first()
            .map_or("no diagnostic available", String::as_str);

        if self.status.is_server_error() {
            error!(
                target = SOURCE,
                status = self.status.as_u16(),
                method = self.method,
                path = self.path,
                document_id = self.document_id,
                elapsed_ms = self.elapsed_ms,
                source,
                detail,
                chain = ?messages,
                request_id = self.request_id,
                "request failed"
            );
        } else {
            warn!(
                target = SOURCE,
                status = self.status.as_u16(),
                method = self.method,
                path = self.path,
                document_id = self.document_id,
                elapsed_ms = self.elapsed_ms,
                source,
                detail,
                request_id = self.request_id,
                "request rejected"
            );
        }
    }
}
