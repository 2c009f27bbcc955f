//! Naming convention for generated image variants.
//!
//! Every stored variant lives at `{documentId}/{objectId}-{suffix}.{ext}`.
//! The name is the only link between an inline object and its variants, so
//! both directions of the mapping are defined here and nowhere else.

use std::fmt;

use serde::Serialize;

use super::document::DocumentId;
use super::error::DomainError;

/// Fixed target sizes, widest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantSize {
    Large,
    Small,
    Tiny,
}

impl VariantSize {
    pub const ALL: [VariantSize; 3] = [VariantSize::Large, VariantSize::Small, VariantSize::Tiny];

    /// Bounding box edge in pixels.
    pub const fn width(self) -> u32 {
        match self {
            VariantSize::Large => 1200,
            VariantSize::Small => 500,
            VariantSize::Tiny => 100,
        }
    }

    pub const fn suffix(self) -> &'static str {
        match self {
            VariantSize::Large => "large",
            VariantSize::Small => "small",
            VariantSize::Tiny => "tiny",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.suffix() == suffix)
    }

    /// The variant generated last; its presence marks a complete set.
    pub const fn terminal() -> Self {
        VariantSize::Tiny
    }
}

/// Output encoding of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    Gif,
    Jpeg,
}

impl ImageEncoding {
    pub const fn extension(self) -> &'static str {
        match self {
            ImageEncoding::Gif => "gif",
            ImageEncoding::Jpeg => "jpg",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            ImageEncoding::Gif => "image/gif",
            ImageEncoding::Jpeg => "image/jpeg",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "gif" => Some(ImageEncoding::Gif),
            "jpg" | "jpeg" => Some(ImageEncoding::Jpeg),
            _ => None,
        }
    }
}

/// Decoded form of a stored variant path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetName {
    document_id: String,
    object_id: String,
    suffix: String,
    extension: String,
}

impl AssetName {
    pub fn new(
        document_id: &DocumentId,
        object_id: &str,
        size: VariantSize,
        encoding: ImageEncoding,
    ) -> Self {
        Self {
            document_id: document_id.as_str().to_string(),
            object_id: object_id.to_string(),
            suffix: size.suffix().to_string(),
            extension: encoding.extension().to_string(),
        }
    }

    /// Parse a store path. Object ids may themselves contain `-` and `.`, so
    /// the extension and suffix are split from the right.
    pub fn parse(path: &str) -> Result<Self, DomainError> {
        let (document_id, file) = path
            .split_once('/')
            .ok_or_else(|| DomainError::invalid_asset_name(path, "missing document prefix"))?;
        if document_id.is_empty() || file.contains('/') {
            return Err(DomainError::invalid_asset_name(
                path,
                "expected exactly one path separator",
            ));
        }
        let (stem, extension) = file
            .rsplit_once('.')
            .ok_or_else(|| DomainError::invalid_asset_name(path, "missing extension"))?;
        let (object_id, suffix) = stem
            .rsplit_once('-')
            .ok_or_else(|| DomainError::invalid_asset_name(path, "missing size suffix"))?;
        if object_id.is_empty() {
            return Err(DomainError::invalid_asset_name(path, "empty object id"));
        }

        Ok(Self {
            document_id: document_id.to_string(),
            object_id: object_id.to_string(),
            suffix: suffix.to_string(),
            extension: extension.to_string(),
        })
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Pixel width encoded by the suffix; unknown suffixes map to 0.
    pub fn width(&self) -> u32 {
        VariantSize::from_suffix(&self.suffix).map_or(0, VariantSize::width)
    }

    pub fn path(&self) -> String {
        format!(
            "{}/{}-{}.{}",
            self.document_id, self.object_id, self.suffix, self.extension
        )
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Store prefix under which all variants of a document live.
pub fn document_prefix(document_id: &DocumentId) -> String {
    format!("{document_id}/")
}

/// First path segment of a stored asset: the document it belongs to.
pub fn owner_of(path: &str) -> &str {
    path.split_once('/').map_or(path, |(owner, _)| owner)
}

/// One hosted encoding of an inline image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub width: u32,
    pub url: String,
}
