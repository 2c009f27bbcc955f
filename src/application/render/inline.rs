use crate::domain::document::{InlineContent, ParagraphElement};

use super::escape_attribute;
use super::markdown::MarkdownConverter;
use super::placeholder;

/// Render one paragraph element: text runs through markdown, inline objects
/// as placeholder tokens, either wrapped in an anchor when linked.
pub(crate) fn render_element(markdown: &MarkdownConverter, element: &ParagraphElement) -> String {
    let html = match &element.content {
        InlineContent::Text(text) => markdown.render_inline(&placeholder::scrub(text)),
        InlineContent::Object(object_id) => placeholder::token(object_id),
        InlineContent::Empty => String::new(),
    };

    match element.link.as_deref() {
        Some(url) => format!(
            "<a href=\"{}\">{html}</a>",
            escape_attribute(&placeholder::scrub(url))
        ),
        None => html,
    }
}
