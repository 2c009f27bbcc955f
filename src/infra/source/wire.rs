//! Document API JSON payloads and their conversion into the domain model.
//!
//! A structural element arrives as an object whose keys name its active
//! kinds (`paragraph`, `table`, `sectionBreak`, ...) next to index metadata.
//! Key order is preserved so kinds render in the order the source sent them.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::application::repos::SourceError;
use crate::domain::document::{
    Document, DocumentId, ElementKind, InlineContent, InlineObject, Paragraph, ParagraphElement,
    StructuralElement, Table, TableCell, TableRow,
};

const INDEX_KEYS: [&str; 2] = ["startIndex", "endIndex"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDocument {
    pub document_id: Option<String>,
    pub title: Option<String>,
    pub revision_id: Option<String>,
    #[serde(default)]
    pub body: WireBody,
    #[serde(default)]
    pub inline_objects: BTreeMap<String, WireInlineObject>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireBody {
    #[serde(default)]
    pub content: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireInlineObject {
    #[serde(default)]
    pub inline_object_properties: Option<WireInlineObjectProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireInlineObjectProperties {
    #[serde(default)]
    pub embedded_object: Option<WireEmbeddedObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEmbeddedObject {
    #[serde(default)]
    pub image_properties: Option<WireImageProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireImageProperties {
    pub content_uri: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireParagraph {
    #[serde(default)]
    elements: Vec<WireParagraphElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireParagraphElement {
    text_run: Option<WireTextRun>,
    inline_object_element: Option<WireInlineObjectElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTextRun {
    #[serde(default)]
    content: String,
    text_style: Option<WireTextStyle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineObjectElement {
    inline_object_id: Option<String>,
    text_style: Option<WireTextStyle>,
}

#[derive(Debug, Deserialize)]
struct WireTextStyle {
    link: Option<WireLink>,
}

#[derive(Debug, Deserialize)]
struct WireLink {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTable {
    #[serde(default)]
    table_rows: Vec<WireTableRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTableRow {
    #[serde(default)]
    table_cells: Vec<WireTableCell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTableCell {
    #[serde(default)]
    content: Vec<Map<String, Value>>,
    table_cell_style: Option<WireTableCellStyle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTableCellStyle {
    column_span: Option<u32>,
}

/// Parse a raw document payload fetched for `requested`.
pub fn parse_document(requested: &DocumentId, payload: &[u8]) -> Result<Document, SourceError> {
    let wire: WireDocument =
        serde_json::from_slice(payload).map_err(|err| SourceError::Malformed(err.to_string()))?;
    wire.into_document(requested)
}

impl WireDocument {
    pub fn into_document(self, requested: &DocumentId) -> Result<Document, SourceError> {
        let id = match self.document_id.as_deref() {
            Some(raw) => DocumentId::parse(raw)
                .map_err(|err| SourceError::Malformed(err.to_string()))?,
            None => requested.clone(),
        };

        let content = self
            .body
            .content
            .into_iter()
            .map(structural_element)
            .collect::<Result<Vec<_>, _>>()?;

        let inline_objects = self
            .inline_objects
            .into_iter()
            .map(|(object_id, object)| {
                let source_uri = object
                    .inline_object_properties
                    .and_then(|properties| properties.embedded_object)
                    .and_then(|embedded| embedded.image_properties)
                    .and_then(|image| image.content_uri);
                (
                    object_id.clone(),
                    InlineObject {
                        id: object_id,
                        source_uri,
                    },
                )
            })
            .collect();

        Ok(Document {
            id,
            revision_id: self.revision_id,
            title: self.title,
            content,
            inline_objects,
        })
    }
}

fn structural_element(raw: Map<String, Value>) -> Result<StructuralElement, SourceError> {
    let mut kinds = Vec::new();
    for (key, value) in raw {
        if INDEX_KEYS.contains(&key.as_str()) {
            continue;
        }
        let kind = match key.as_str() {
            "paragraph" => ElementKind::Paragraph(paragraph(decode(&key, value)?)),
            "table" => ElementKind::Table(table(decode(&key, value)?)?),
            _ => ElementKind::Unsupported(key),
        };
        kinds.push(kind);
    }
    Ok(StructuralElement::new(kinds))
}

fn decode<T: for<'de> Deserialize<'de>>(key: &str, value: Value) -> Result<T, SourceError> {
    serde_json::from_value(value)
        .map_err(|err| SourceError::Malformed(format!("invalid `{key}` element: {err}")))
}

fn paragraph(wire: WireParagraph) -> Paragraph {
    Paragraph::new(wire.elements.into_iter().map(paragraph_element).collect())
}

fn paragraph_element(wire: WireParagraphElement) -> ParagraphElement {
    let (content, style) = match (wire.text_run, wire.inline_object_element) {
        (Some(run), _) => (InlineContent::Text(run.content), run.text_style),
        (None, Some(object)) => match object.inline_object_id {
            Some(id) => (InlineContent::Object(id), object.text_style),
            None => (InlineContent::Empty, object.text_style),
        },
        (None, None) => (InlineContent::Empty, None),
    };

    ParagraphElement {
        content,
        link: style.and_then(|style| style.link).and_then(|link| link.url),
    }
}

fn table(wire: WireTable) -> Result<Table, SourceError> {
    let rows = wire
        .table_rows
        .into_iter()
        .map(|row| {
            let cells = row
                .table_cells
                .into_iter()
                .map(|cell| {
                    let content = cell
                        .content
                        .into_iter()
                        .map(structural_element)
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(TableCell {
                        content,
                        column_span: cell.table_cell_style.and_then(|style| style.column_span),
                    })
                })
                .collect::<Result<Vec<_>, SourceError>>()?;
            Ok(TableRow { cells })
        })
        .collect::<Result<Vec<_>, SourceError>>()?;
    Ok(Table { rows })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: Value) -> Document {
        let id = DocumentId::parse("fallback").expect("id");
        parse_document(&id, value.to_string().as_bytes()).expect("parses")
    }

    #[test]
    fn converts_paragraphs_links_and_objects() {
        let document = parse(json!({
            "documentId": "doc1",
            "revisionId": "rev-7",
            "title": "Notes",
            "body": {"content": [
                {"startIndex": 1, "endIndex": 2, "sectionBreak": {}},
                {"paragraph": {"elements": [
                    {"textRun": {"content": "Hi ", "textStyle": {}}},
                    {"textRun": {"content": "there", "textStyle": {"link": {"url": "https://x.test"}}}},
                    {"inlineObjectElement": {"inlineObjectId": "kix.1"}},
                    {"pageBreak": {}}
                ]}}
            ]},
            "inlineObjects": {
                "kix.1": {"inlineObjectProperties": {"embeddedObject": {
                    "imageProperties": {"contentUri": "https://img.test/1"}
                }}},
                "kix.2": {"inlineObjectProperties": {"embeddedObject": {}}}
            }
        }));

        assert_eq!(document.id.as_str(), "doc1");
        assert_eq!(document.revision_id.as_deref(), Some("rev-7"));
        assert_eq!(
            document.content[0].kinds(),
            &[ElementKind::Unsupported("sectionBreak".into())]
        );
        assert_eq!(
            document.content[1].kinds(),
            &[ElementKind::Paragraph(Paragraph::new(vec![
                ParagraphElement::text("Hi "),
                ParagraphElement::text("there").with_link("https://x.test"),
                ParagraphElement::object("kix.1"),
                ParagraphElement {
                    content: InlineContent::Empty,
                    link: None
                },
            ]))]
        );
        assert_eq!(
            document.inline_objects["kix.1"].source_uri.as_deref(),
            Some("https://img.test/1")
        );
        assert_eq!(document.inline_objects["kix.2"].source_uri, None);
    }

    #[test]
    fn converts_nested_tables_with_spans() {
        let document = parse(json!({
            "body": {"content": [{"table": {"rows": 1, "columns": 2, "tableRows": [
                {"tableCells": [
                    {"content": [{"paragraph": {"elements": [{"textRun": {"content": "Team data\n"}}]}}],
                     "tableCellStyle": {"columnSpan": 2}},
                    {"content": [], "tableCellStyle": {"columnSpan": 1}}
                ]}
            ]}}]}
        }));

        assert_eq!(document.id.as_str(), "fallback");
        let ElementKind::Table(table) = &document.content[0].kinds()[0] else {
            panic!("expected table");
        };
        assert_eq!(table.rows[0].cells[0].column_span, Some(2));
        assert_eq!(table.rows[0].cells[0].content.len(), 1);
    }

    #[test]
    fn kinds_keep_source_order() {
        let document = parse(json!({
            "body": {"content": [
                {"tableOfContents": {}, "paragraph": {"elements": []}}
            ]}
        }));
        let kinds = document.content[0].kinds();
        assert!(matches!(kinds[0], ElementKind::Unsupported(ref name) if name == "tableOfContents"));
        assert!(matches!(kinds[1], ElementKind::Paragraph(_)));
    }

    #[test]
    fn malformed_payload_is_reported() {
        let id = DocumentId::parse("doc").expect("id");
        assert!(matches!(
            parse_document(&id, b"{not json"),
            Err(SourceError::Malformed(_))
        ));
        assert!(matches!(
            parse_document(&id, br#"{"body": {"content": [{"table": {"tableRows": 3}}]}}"#),
            Err(SourceError::Malformed(_))
        ));
    }
}
