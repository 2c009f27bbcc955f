use once_cell::sync::Lazy;
use regex::Regex;

static NEWLINE_BEFORE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n</").expect("newline-before-close pattern must compile"));
static BREAK_AFTER_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r">\s*<br ?/?>").expect("break-after-tag pattern must compile"));

/// Normalise stray newlines into `<br />` and drop breaks that directly follow
/// another tag (including a preceding break).
pub fn finalize(html: &str) -> String {
    let html = NEWLINE_BEFORE_CLOSE.replace_all(html, "</");
    let html = html.replace('\n', "<br />");
    BREAK_AFTER_TAG.replace_all(&html, ">").into_owned()
}
