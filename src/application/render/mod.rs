//! Document-to-markup rendering.
//!
//! Rendering happens in two phases. The structural phase ([`MarkupRenderer`])
//! is pure: it walks the document tree and leaves a placeholder token wherever
//! an inline object appears. The resolution phase ([`PlaceholderResolver`])
//! swaps those tokens for `<picture>` markup, generating image variants on
//! demand. [`finalize`] normalises line breaks last.

mod finalize;
mod inline;
mod markdown;
mod markup;
pub mod placeholder;
mod resolve;
mod table;

use once_cell::sync::Lazy;
use regex::Regex;

pub use finalize::finalize;
pub use markdown::MarkdownConverter;
pub use markup::{MarkupRenderer, RenderOptions};
pub use resolve::{PlaceholderResolver, picture_markup};

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern must compile"));

pub(crate) fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

pub(crate) fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' | '\r' | '\t' => escaped.push(' '),
            _ => escaped.push(ch),
        }
    }
    escaped
}
