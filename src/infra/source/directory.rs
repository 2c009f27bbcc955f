use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::repos::{DocumentSource, DocumentSummary, SourceError};
use crate::domain::document::{Document, DocumentId};

use super::wire;

const EXTENSION: &str = "json";

/// Reads document API payloads from `{root}/{id}.json`.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl DocumentSource for DirectorySource {
    async fn fetch(&self, id: &DocumentId) -> Result<Document, SourceError> {
        let path = self.root.join(format!("{id}.{EXTENSION}"));
        let payload = match fs::read(&path).await {
            Ok(payload) => payload,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound);
            }
            Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(SourceError::AccessDenied {
                    message: err.to_string(),
                });
            }
            Err(err) => return Err(SourceError::unavailable(err)),
        };
        wire::parse_document(id, &payload)
    }

    async fn list(&self) -> Result<Vec<DocumentSummary>, SourceError> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(SourceError::unavailable)?;
        let mut summaries = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(SourceError::unavailable)? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                summaries.push(DocumentSummary {
                    id: stem.to_string(),
                    name: None,
                });
            }
        }

        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }
}
