//! Structured document model as delivered by a document source.
//!
//! A document is a tree: top-level structural elements hold paragraphs and
//! tables, table cells hold further structural elements. Inline objects are
//! addressed by an id that is unique within one document and is the only key
//! correlating a placeholder, its source image and its stored variants.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::error::DomainError;

/// Validated document identifier.
///
/// Identifiers double as asset-store prefixes, so they must not contain a dot
/// (guards against file names being passed as ids) or a path separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_identifier(raw, "id must not be empty"));
        }
        if trimmed.contains('.') {
            return Err(DomainError::invalid_identifier(
                raw,
                "id must not contain `.`",
            ));
        }
        if trimmed.contains('/') || trimmed.contains('\\') {
            return Err(DomainError::invalid_identifier(
                raw,
                "id must not contain a path separator",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fetched document, owned for the duration of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    /// Opaque token that changes whenever the content changes.
    pub revision_id: Option<String>,
    pub title: Option<String>,
    pub content: Vec<StructuralElement>,
    pub inline_objects: BTreeMap<String, InlineObject>,
}

impl Document {
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            revision_id: None,
            title: None,
            content: Vec::new(),
            inline_objects: BTreeMap::new(),
        }
    }

    pub fn with_revision(mut self, revision_id: impl Into<String>) -> Self {
        self.revision_id = Some(revision_id.into());
        self
    }

    pub fn with_element(mut self, element: StructuralElement) -> Self {
        self.content.push(element);
        self
    }

    pub fn with_inline_object(mut self, object: InlineObject) -> Self {
        self.inline_objects.insert(object.id.clone(), object);
        self
    }
}

/// One node of the content tree.
///
/// A node may carry more than one active kind; renderers visit all of them in
/// order and concatenate their output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralElement {
    kinds: Vec<ElementKind>,
}

impl StructuralElement {
    pub fn new(kinds: Vec<ElementKind>) -> Self {
        Self { kinds }
    }

    pub fn paragraph(paragraph: Paragraph) -> Self {
        Self::new(vec![ElementKind::Paragraph(paragraph)])
    }

    pub fn table(table: Table) -> Self {
        Self::new(vec![ElementKind::Table(table)])
    }

    pub fn kinds(&self) -> &[ElementKind] {
        &self.kinds
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Paragraph(Paragraph),
    Table(Table),
    /// A kind this renderer does not know (section breaks, tables of contents,
    /// anything the source adds later). Carries the source's name for logging.
    Unsupported(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub elements: Vec<ParagraphElement>,
}

impl Paragraph {
    pub fn new(elements: Vec<ParagraphElement>) -> Self {
        Self { elements }
    }

    /// Paragraph holding a single text run.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(vec![ParagraphElement::text(content)])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphElement {
    pub content: InlineContent,
    pub link: Option<String>,
}

impl ParagraphElement {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: InlineContent::Text(content.into()),
            link: None,
        }
    }

    pub fn object(object_id: impl Into<String>) -> Self {
        Self {
            content: InlineContent::Object(object_id.into()),
            link: None,
        }
    }

    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.link = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineContent {
    Text(String),
    /// Reference to an entry of [`Document::inline_objects`].
    Object(String),
    /// Page breaks, auto text and other runs without renderable content.
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCell {
    pub content: Vec<StructuralElement>,
    pub column_span: Option<u32>,
}

impl TableCell {
    pub fn new(content: Vec<StructuralElement>) -> Self {
        Self {
            content,
            column_span: None,
        }
    }

    /// Single-paragraph cell, the common shape for authored tables.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(vec![StructuralElement::paragraph(Paragraph::text(content))])
    }

    pub fn with_column_span(mut self, span: u32) -> Self {
        self.column_span = Some(span);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineObject {
    pub id: String,
    /// Location of the embedded image, when the object is an image.
    pub source_uri: Option<String>,
}

impl InlineObject {
    pub fn image(id: impl Into<String>, source_uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_uri: Some(source_uri.into()),
        }
    }
}
