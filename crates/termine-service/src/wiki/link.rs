//! Wiki links written at the top of event notes.

use std::sync::LazyLock;

use regex::Regex;

use super::escape::escape_wiki;

#[expect(clippy::expect_used, reason = "pattern is a literal")]
static INTERNAL_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\[([^\]]+)\]\]$").expect("internal link pattern compiles"));

#[expect(clippy::expect_used, reason = "pattern is a literal")]
static EXTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(https?://[^\s\]]+)(?:\s+([^\]]+))?\]$").expect("external link pattern compiles")
});

/// ## Summary
/// Returns the link on the first line of the notes, if that line is nothing
/// but a link.
///
/// Accepted forms are `[[Page]]`, `[[Page|Label]]`, `[https://url]` and
/// `[https://url Label]`.
#[must_use]
pub fn extract_link(notes: &str) -> Option<String> {
    let first_line = notes.trim().lines().next()?.trim();
    (INTERNAL_LINK.is_match(first_line) || EXTERNAL_LINK.is_match(first_line))
        .then(|| first_line.to_string())
}

/// ## Summary
/// Renders the event name cell.
///
/// A link with its own label is used as is. A link without a label gets the
/// escaped title as label. Without a link the escaped title is returned.
#[must_use]
pub fn display_name(title: &str, link: Option<&str>) -> String {
    let escaped = escape_wiki(title);
    let Some(link) = link else {
        return escaped;
    };

    if let Some(page) = link.strip_prefix("[[").and_then(|l| l.strip_suffix("]]")) {
        if page.contains('|') {
            return link.to_string();
        }
        return format!("[[{page}|{escaped}]]");
    }

    if let Some(target) = link.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
        if target.contains(char::is_whitespace) {
            return link.to_string();
        }
        return format!("[{target} {escaped}]");
    }

    escaped
}
