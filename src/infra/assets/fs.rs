//! Filesystem-backed asset store.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::{fs, io::AsyncWriteExt};

use crate::application::repos::{AssetStore, AssetStoreError, StoredAsset};
use crate::domain::assets::ImageEncoding;

use super::join_public_url;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Stores variants as plain files below `root`, served back over HTTP from
/// `public_base`.
#[derive(Debug)]
pub struct FilesystemAssetStore {
    root: PathBuf,
    public_base: String,
}

impl FilesystemAssetStore {
    /// Initialise storage rooted at the provided directory, creating it if necessary.
    pub fn new(root: PathBuf, public_base: impl Into<String>) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            public_base: public_base.into(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, stored_path: &str) -> Result<PathBuf, AssetStoreError> {
        let relative = Path::new(stored_path);
        if stored_path.is_empty()
            || relative.is_absolute()
            || relative.components().any(|component| {
                matches!(
                    component,
                    Component::ParentDir | Component::Prefix(_) | Component::RootDir
                )
            })
        {
            return Err(AssetStoreError::InvalidPath(stored_path.to_string()));
        }

        Ok(self.root.join(relative))
    }

    async fn collect(
        &self,
        directory: PathBuf,
        out: &mut Vec<String>,
    ) -> Result<(), AssetStoreError> {
        let mut pending = vec![directory];
        while let Some(directory) = pending.pop() {
            let mut entries = match fs::read_dir(&directory).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Some(relative) = self.relative(&path) {
                    out.push(relative);
                }
            }
        }
        Ok(())
    }

    fn relative(&self, absolute: &Path) -> Option<String> {
        let relative = absolute.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

#[async_trait]
impl AssetStore for FilesystemAssetStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, AssetStoreError> {
        // Only descend into the directory named by the prefix when it has one.
        let start = match prefix.rsplit_once('/') {
            Some((directory, _)) if !directory.is_empty() => self.resolve(directory)?,
            _ => self.root.clone(),
        };

        let mut paths = Vec::new();
        self.collect(start, &mut paths).await?;
        paths.retain(|path| path.starts_with(prefix));
        paths.sort();
        Ok(paths)
    }

    async fn exists(&self, path: &str) -> Result<bool, AssetStoreError> {
        let absolute = self.resolve(path)?;
        Ok(fs::try_exists(absolute).await?)
    }

    async fn put(
        &self,
        path: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<String, AssetStoreError> {
        let absolute = self.resolve(path)?;
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&absolute).await?;
        if let Err(err) = file.write_all(&data).await {
            drop(file);
            let _ = fs::remove_file(&absolute).await;
            return Err(err.into());
        }
        file.flush().await?;

        Ok(self.public_url(path))
    }

    /// Missing files are treated as success.
    async fn delete(&self, path: &str) -> Result<(), AssetStoreError> {
        let absolute = self.resolve(path)?;
        match fs::remove_file(&absolute).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AssetStoreError::Io(err)),
        }
    }

    async fn read(&self, path: &str) -> Result<StoredAsset, AssetStoreError> {
        let absolute = self.resolve(path)?;
        let data = match fs::read(&absolute).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AssetStoreError::NotFound(path.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        let content_type = Path::new(path)
            .extension()
            .and_then(|extension| extension.to_str())
            .and_then(ImageEncoding::from_extension)
            .map_or(FALLBACK_CONTENT_TYPE, ImageEncoding::content_type);

        Ok(StoredAsset {
            data: Bytes::from(data),
            content_type: content_type.to_string(),
        })
    }

    fn public_url(&self, path: &str) -> String {
        join_public_url(&self.public_base, path)
    }
}
