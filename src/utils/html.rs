//! Light-markup stripping for collection text fields.

use std::sync::LazyLock;

use regex::Regex;

/// Italic/bold tags and stray carets used by cataloguers as inline markup.
static LIGHT_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?\s*[ib]\s*>|\^").unwrap());

/// Strip `<i>`, `<b>` (and their closing forms) and `^` from a text field.
///
/// Removal repeats until nothing matches, so markup that only forms once
/// an inner tag is gone (`<i^>`, `<<i>i>`) is stripped too. The result is
/// trimmed.
pub fn strip_light_markup(s: &str) -> String {
    let mut text = s.to_string();
    while LIGHT_MARKUP.is_match(&text) {
        text = LIGHT_MARKUP.replace_all(&text, "").into_owned();
    }
    text.trim().to_string()
}
