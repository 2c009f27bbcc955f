use std::collections::BTreeMap;

use tracing::debug;

use crate::application::assets::{KnownVariants, VariantGenerator};
use crate::domain::assets::Variant;
use crate::domain::document::{DocumentId, InlineObject};

use super::escape_attribute;
use super::placeholder::{self, Quote, Segment};

const SOURCE: &str = "docweave::application::render::resolve";
const BREAKPOINT_RATIO: f64 = 0.8;

/// Rewrites placeholder tokens into `<picture>` markup.
#[derive(Clone)]
pub struct PlaceholderResolver {
    generator: VariantGenerator,
}

impl PlaceholderResolver {
    pub fn new(generator: VariantGenerator) -> Self {
        Self { generator }
    }

    /// Resolve every token in `html`, one object at a time. Objects with
    /// stored variants use them; objects with a source URI are generated;
    /// anything else resolves to nothing.
    pub async fn resolve_all(
        &self,
        document_id: &DocumentId,
        html: &str,
        inline_objects: &BTreeMap<String, InlineObject>,
        known: &KnownVariants,
    ) -> String {
        let mut out = String::with_capacity(html.len());
        for segment in placeholder::segments(html) {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Object { id, quote } => {
                    let variants = match known.get(id) {
                        Some(variants) if !variants.is_empty() => variants.clone(),
                        _ => {
                            self.generate(document_id, id, inline_objects.get(id))
                                .await
                        }
                    };
                    out.push_str(&picture_markup(&variants, quote));
                }
            }
        }
        out
    }

    async fn generate(
        &self,
        document_id: &DocumentId,
        object_id: &str,
        object: Option<&InlineObject>,
    ) -> Vec<Variant> {
        match object.and_then(|object| object.source_uri.as_deref()) {
            Some(uri) => self.generator.generate(document_id, object_id, uri).await,
            None => {
                debug!(
                    target = SOURCE,
                    document_id = %document_id,
                    object_id,
                    "inline object has no image source; dropping placeholder"
                );
                Vec::new()
            }
        }
    }
}

/// `<picture>` markup for a set of variants: the widest is the `<img>`
/// fallback, every narrower one a `<source>` bounded by a max-width query.
pub fn picture_markup(variants: &[Variant], quote: Quote) -> String {
    let mut sorted: Vec<&Variant> = variants.iter().collect();
    sorted.sort_by(|a, b| b.width.cmp(&a.width));
    let Some((widest, rest)) = sorted.split_first() else {
        return String::new();
    };

    let q = quote.as_char();
    let mut html = String::from("<picture>");
    for variant in rest {
        let breakpoint = f64::from(variant.width) * BREAKPOINT_RATIO;
        html.push_str(&format!(
            "<source srcset={q}{}{q} media={q}(max-width: {breakpoint}px){q} />",
            attribute(&variant.url, quote)
        ));
    }
    html.push_str(&format!("<img src={q}{}{q} />", attribute(&widest.url, quote)));
    html.push_str("</picture>");
    html
}

fn attribute(value: &str, quote: Quote) -> String {
    let escaped = escape_attribute(value);
    match quote {
        Quote::Double => escaped,
        Quote::Single => escaped.replace('\'', "&#39;"),
    }
}
