use comrak::{Options, markdown_to_html};

/// Converts the text of a single run into inline HTML.
///
/// Raw HTML typed into the source document passes through untouched, single
/// newlines become hard breaks, bare URLs are linked and quotes/dashes are
/// typographically replaced.
pub struct MarkdownConverter {
    options: Options<'static>,
}

impl MarkdownConverter {
    pub fn new() -> Self {
        Self {
            options: default_options(),
        }
    }

    /// Render `text` and strip the block-level paragraph the converter wraps
    /// single lines in, so the result composes into any surrounding context.
    pub fn render_inline(&self, text: &str) -> String {
        let normalized = text.trim().replace('\u{000B}', "\n");
        if normalized.is_empty() {
            return String::new();
        }

        let html = markdown_to_html(&normalized, &self.options);
        let html = html.trim();
        let html = html.strip_prefix("<p>").unwrap_or(html);
        let html = html.strip_suffix("</p>").unwrap_or(html);
        html.to_string()
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

fn default_options() -> Options<'static> {
    let mut options = Options::default();

    let ext = &mut options.extension;
    ext.autolink = true;
    ext.strikethrough = true;
    ext.tagfilter = false;

    options.parse.smart = true;

    let render = &mut options.render;
    render.hardbreaks = true;
    render.r#unsafe = true;
    render.sourcepos = false;

    options
}
