//! Escaping of free text for table cells.

/// ## Summary
/// Makes free text safe inside a table cell.
///
/// `|` becomes `&#124;` and line breaks are removed. Applying it twice gives
/// the same result as applying it once.
#[must_use]
pub fn escape_wiki(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\n' | '\r'))
        .fold(String::with_capacity(text.len()), |mut out, c| {
            if c == '|' {
                out.push_str("&#124;");
            } else {
                out.push(c);
            }
            out
        })
}
