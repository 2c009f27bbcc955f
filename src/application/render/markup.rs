use tracing::trace;

use crate::domain::document::{Document, ElementKind, Paragraph, StructuralElement};

use super::inline::render_element;
use super::markdown::MarkdownConverter;
use super::table;

const HORIZONTAL_RULE_MARKERS: [&str; 2] = ["\u{2014}", "---"];

/// Per-call rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Wrap paragraph output in `<p>`. Disabled wherever a block wrapper would
    /// be invalid, such as table cells or label extraction.
    pub wrap_paragraphs: bool,
}

impl RenderOptions {
    pub const BARE: Self = Self {
        wrap_paragraphs: false,
    };
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wrap_paragraphs: true,
        }
    }
}

/// Converts a document's structural tree into HTML containing placeholder
/// tokens for inline objects. Pure: no store or network access.
pub struct MarkupRenderer {
    markdown: MarkdownConverter,
}

impl MarkupRenderer {
    pub fn new() -> Self {
        Self {
            markdown: MarkdownConverter::new(),
        }
    }

    pub fn render_document(&self, document: &Document) -> String {
        document
            .content
            .iter()
            .map(|element| self.render(element, RenderOptions::default()))
            .collect()
    }

    pub fn render(&self, element: &StructuralElement, options: RenderOptions) -> String {
        let mut html = String::new();
        for kind in element.kinds() {
            match kind {
                ElementKind::Paragraph(paragraph) => {
                    html.push_str(&self.render_paragraph(paragraph, options))
                }
                ElementKind::Table(table) => html.push_str(&table::render_table(self, table)),
                ElementKind::Unsupported(kind) => {
                    trace!(
                        target = "docweave::render::markup",
                        kind = kind.as_str(),
                        "skipping unsupported structural element"
                    );
                }
            }
        }
        html
    }

    fn render_paragraph(&self, paragraph: &Paragraph, options: RenderOptions) -> String {
        let text: String = paragraph
            .elements
            .iter()
            .map(|element| render_element(&self.markdown, element))
            .collect();

        if text.is_empty() {
            return text;
        }
        if HORIZONTAL_RULE_MARKERS.contains(&text.as_str()) {
            return "<hr />".to_string();
        }
        if !options.wrap_paragraphs || text.starts_with('<') {
            return text;
        }
        format!("<p>{text}</p>")
    }
}

impl Default for MarkupRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{DocumentId, ParagraphElement};

    fn doc(paragraphs: &[&str]) -> Document {
        paragraphs.iter().fold(
            Document::new(DocumentId::parse("doc").unwrap()),
            |doc, text| doc.with_element(StructuralElement::paragraph(Paragraph::text(*text))),
        )
    }

    #[test]
    fn em_dash_paragraph_becomes_rule() {
        let html = MarkupRenderer::new().render_document(&doc(&["Hello\n", "\u{2014}\n", "World\n"]));
        assert_eq!(html, "<p>Hello</p><hr /><p>World</p>");
    }

    #[test]
    fn empty_paragraphs_collapse() {
        let html = MarkupRenderer::new().render_document(&doc(&["\n", "Text", ""]));
        assert_eq!(html, "<p>Text</p>");
    }

    #[test]
    fn content_starting_with_markup_is_not_wrapped() {
        let html = MarkupRenderer::new().render_document(&doc(&["<section>raw</section>"]));
        assert_eq!(html, "<section>raw</section>");
    }

    #[test]
    fn runs_concatenate_within_paragraph() {
        let paragraph = Paragraph::new(vec![
            ParagraphElement::text("Read "),
            ParagraphElement::text("this").with_link("https://example.com"),
        ]);
        let renderer = MarkupRenderer::new();
        let html = renderer.render(
            &StructuralElement::paragraph(paragraph),
            RenderOptions::default(),
        );
        assert_eq!(html, "<p>Read<a href=\"https://example.com\">this</a></p>");
    }

    #[test]
    fn every_active_kind_is_rendered() {
        let element = StructuralElement::new(vec![
            ElementKind::Unsupported("sectionBreak".into()),
            ElementKind::Paragraph(Paragraph::text("one")),
            ElementKind::Paragraph(Paragraph::text("two")),
        ]);
        let html = MarkupRenderer::new().render(&element, RenderOptions::BARE);
        assert_eq!(html, "onetwo");
    }
}
