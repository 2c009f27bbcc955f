//! Inline-object placeholder tokens.
//!
//! Structural rendering cannot resolve images (that needs the asset store), so
//! it leaves a token per inline object. A token is `INLINE_OBJECT(<id>)`
//! framed by private-use code points; those code points are scrubbed from all
//! author text, so a token can only ever originate here.

use std::borrow::Cow;

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';
/// Closes a token that sits inside single-quote-only content (data-mode cells).
const CLOSE_QUOTED: char = '\u{E002}';
const PREFIX: &str = "INLINE_OBJECT(";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Single => '\'',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Object { id: &'a str, quote: Quote },
}

pub fn token(object_id: &str) -> String {
    format!("{OPEN}{PREFIX}{}){CLOSE}", scrub(object_id))
}

/// Remove sentinel code points from author-controlled text.
pub fn scrub(text: &str) -> Cow<'_, str> {
    if text.contains(is_sentinel) {
        Cow::Owned(text.chars().filter(|ch| !is_sentinel(*ch)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// Swap double quotes for single quotes, marking contained tokens so their
/// eventual markup uses single-quoted attributes as well.
pub fn requote(html: &str) -> String {
    html.chars()
        .map(|ch| match ch {
            '"' => '\'',
            CLOSE => CLOSE_QUOTED,
            other => other,
        })
        .collect()
}

/// Split rendered HTML into literal runs and placeholder tokens, in order.
pub fn segments(html: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = html;

    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len_utf8()..];
        let Some(end) = after.find(|ch| ch == CLOSE || ch == CLOSE_QUOTED) else {
            break;
        };
        let close = after[end..].chars().next().unwrap_or(CLOSE);
        let quote = if close == CLOSE_QUOTED {
            Quote::Single
        } else {
            Quote::Double
        };

        if start > 0 {
            out.push(Segment::Literal(&rest[..start]));
        }
        let inner = &after[..end];
        if let Some(id) = inner
            .strip_prefix(PREFIX)
            .and_then(|value| value.strip_suffix(')'))
        {
            out.push(Segment::Object { id, quote });
        }
        rest = &after[end + close.len_utf8()..];
    }

    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }
    out
}

/// Literal text of `html` with every token removed, for contexts such as
/// attribute values where an image cannot appear.
pub fn strip_tokens(html: &str) -> String {
    segments(html)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Literal(text) => Some(text),
            Segment::Object { .. } => None,
        })
        .collect()
}

fn is_sentinel(ch: char) -> bool {
    matches!(ch, OPEN | CLOSE | CLOSE_QUOTED)
}
