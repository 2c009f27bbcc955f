use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::application::repos::{DocumentSource, DocumentSummary, SourceError};
use crate::domain::document::{Document, DocumentId};
use crate::infra::images::user_agent;

use super::wire;

const SOURCE: &str = "docweave::infra::source::google";
const DOCUMENT_FIELDS: &str = "title,body,revisionId,documentId,inlineObjects";
const LIST_FIELDS: &str = "nextPageToken,files(id,name)";

/// Document source backed by the Docs and Drive REST APIs.
#[derive(Clone, Debug)]
pub struct GoogleDocsSource {
    client: Client,
    docs_base: Url,
    drive_base: Url,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    id: String,
    name: Option<String>,
}

impl GoogleDocsSource {
    pub fn new(
        docs_base: Url,
        drive_base: Url,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            docs_base,
            drive_base,
            access_token,
        })
    }

    fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::Unavailable(format!("`{base}` cannot be a base URL")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.access_token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, SourceError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(SourceError::unavailable)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => SourceError::NotFound,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SourceError::AccessDenied {
                message: format!("status {status} body {body}"),
            },
            _ => SourceError::Unavailable(format!("status {status} body {body}")),
        })
    }
}

#[async_trait]
impl DocumentSource for GoogleDocsSource {
    async fn fetch(&self, id: &DocumentId) -> Result<Document, SourceError> {
        let mut url = Self::endpoint(&self.docs_base, &["v1", "documents", id.as_str()])?;
        url.query_pairs_mut().append_pair("fields", DOCUMENT_FIELDS);
        debug!(target = SOURCE, document_id = %id, "fetching document");

        let response = self.send(self.client.get(url)).await?;
        let payload = response.bytes().await.map_err(SourceError::unavailable)?;
        wire::parse_document(id, &payload)
    }

    async fn list(&self) -> Result<Vec<DocumentSummary>, SourceError> {
        let base = Self::endpoint(&self.drive_base, &["drive", "v3", "files"])?;
        let mut summaries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = base.clone();
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("fields", LIST_FIELDS);
                if let Some(token) = page_token.as_deref() {
                    query.append_pair("pageToken", token);
                }
            }

            let page: FileList = self
                .send(self.client.get(url))
                .await?
                .json()
                .await
                .map_err(|err| SourceError::Malformed(err.to_string()))?;

            summaries.extend(page.files.into_iter().map(|file| DocumentSummary {
                id: file.id,
                name: file.name,
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(target = SOURCE, documents = summaries.len(), "listed documents");
        Ok(summaries)
    }
}
