use std::borrow::Cow;
use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::repos::{AssetStoreError, SourceError},
    domain::error::DomainError,
    infra::error::InfraError,
};

/// Failure of a single document render.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    InvalidIdentifier(#[from] DomainError),
    #[error("{guidance}")]
    SourceUnavailable {
        guidance: String,
        #[source]
        source: SourceError,
    },
}

impl RenderError {
    pub fn source_unavailable(source: SourceError, guidance: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            guidance: guidance.into(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: Cow<'static, str>,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<Cow<'static, str>>,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            public_message: public_message.into(),
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<Cow<'static, str>>,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message: public_message.into(),
            report,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message.into_owned()).into_response();
        self.report.attach(&mut response);
        response
    }
}

impl From<RenderError> for HttpError {
    fn from(error: RenderError) -> Self {
        match &error {
            RenderError::InvalidIdentifier(_) => HttpError::from_error(
                "infra::http::render_error_to_http_error",
                StatusCode::BAD_REQUEST,
                "Invalid document id",
                &error,
            ),
            RenderError::SourceUnavailable { guidance, .. } => HttpError::from_error(
                "infra::http::render_error_to_http_error",
                StatusCode::INTERNAL_SERVER_ERROR,
                guidance.clone(),
                &error,
            ),
        }
    }
}

impl From<SourceError> for HttpError {
    fn from(error: SourceError) -> Self {
        HttpError::from_error(
            "infra::http::source_error_to_http_error",
            StatusCode::BAD_GATEWAY,
            "Document source unavailable",
            &error,
        )
    }
}

/// Top-level failure of a command or the server process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Store(#[from] AssetStoreError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
