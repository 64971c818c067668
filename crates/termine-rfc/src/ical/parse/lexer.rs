//! Unfolding and content line lexing (RFC 5545 §3.1).

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::ical::core::{Parameter, Property, Value};

/// ## Summary
/// Joins folded lines. Each logical line comes with the 1-based number of
/// the physical line it starts on.
///
/// A line starting with a space or tab continues the previous one, minus
/// that first character. So does a line without any `:`, which some
/// producers emit when they fold without indenting. An unindented piece that
/// contains a colon cannot be told apart from a property and stays a line of
/// its own; the parser skips it if it does not lex.
#[must_use]
pub fn unfold(input: &str) -> Vec<(usize, String)> {
    let mut logical: Vec<(usize, String)> = Vec::new();

    for (index, physical) in input.lines().enumerate() {
        let physical = physical.strip_suffix('\r').unwrap_or(physical);
        if physical.is_empty() {
            continue;
        }

        let piece = physical
            .strip_prefix([' ', '\t'])
            .or_else(|| (!physical.contains(':')).then_some(physical));

        match (piece, logical.last_mut()) {
            (Some(piece), Some((_, line))) => line.push_str(piece),
            (Some(piece), None) => logical.push((index + 1, piece.to_string())),
            (None, _) => logical.push((index + 1, physical.to_string())),
        }
    }

    logical
}

/// ## Summary
/// Splits one logical line into a property whose value is still
/// [`Value::Raw`].
///
/// ## Errors
/// Returns an error if the name, a parameter or the `:` separator is
/// malformed.
pub fn lex_line(line: &str, number: usize) -> ParseResult<Property> {
    let name_end = line
        .find([';', ':'])
        .ok_or_else(|| ParseError::at(ParseErrorKind::MissingColon, number, line.len()))?;
    let name = &line[..name_end];

    if name.is_empty() {
        return Err(ParseError::at(ParseErrorKind::MissingPropertyName, number, 1));
    }
    if let Some(bad) = name.find(|c: char| !is_name_char(c)) {
        return Err(ParseError::at(
            ParseErrorKind::InvalidPropertyName,
            number,
            bad + 1,
        ));
    }

    let mut rest = &line[name_end..];
    let mut params = Vec::new();
    while let Some(text) = rest.strip_prefix(';') {
        let column = line.len() - text.len() + 1;
        let (param, remaining) = lex_parameter(text, number, column)?;
        params.push(param);
        rest = remaining;
    }

    let raw_value = rest
        .strip_prefix(':')
        .ok_or_else(|| ParseError::at(ParseErrorKind::MissingColon, number, line.len()))?;

    Ok(Property {
        name: name.to_ascii_uppercase(),
        params,
        value: Value::Raw(raw_value.to_string()),
        raw_value: raw_value.to_string(),
    })
}

/// Lexes `NAME=value[,value...]` and returns the text after it, which starts
/// with `;` or `:`.
fn lex_parameter(text: &str, number: usize, column: usize) -> ParseResult<(Parameter, &str)> {
    let invalid = || ParseError::at(ParseErrorKind::InvalidParameter, number, column);

    let (name, mut rest) = text.split_once('=').ok_or_else(invalid)?;
    if name.is_empty() || !name.chars().all(is_name_char) {
        return Err(invalid());
    }

    let mut values = Vec::new();
    loop {
        let (value, remaining) = match rest.strip_prefix('"') {
            Some(quoted) => {
                let close = quoted.find('"').ok_or_else(|| {
                    ParseError::at(ParseErrorKind::UnclosedQuote, number, column)
                })?;
                (decode_caret(&quoted[..close]), &quoted[close + 1..])
            }
            None => {
                let end = rest.find([',', ';', ':']).unwrap_or(rest.len());
                (rest[..end].to_string(), &rest[end..])
            }
        };
        values.push(value);

        match remaining.strip_prefix(',') {
            Some(next) => rest = next,
            None => {
                rest = remaining;
                break;
            }
        }
    }

    if rest.is_empty() {
        return Err(ParseError::at(
            ParseErrorKind::MissingColon,
            number,
            column + text.len(),
        ));
    }
    if !rest.starts_with([';', ':']) {
        return Err(invalid().with_detail(format!("unexpected {rest:?} after {name}")));
    }

    Ok((
        Parameter {
            name: name.to_ascii_uppercase(),
            values,
        },
        rest,
    ))
}

/// Decodes RFC 6868 caret escapes.
fn decode_caret(value: &str) -> String {
    let mut decoded = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '^' {
            decoded.push(c);
            continue;
        }
        let replacement = match chars.peek() {
            Some('^') => '^',
            Some('n') => '\n',
            Some('\'') => '"',
            _ => {
                decoded.push('^');
                continue;
            }
        };
        decoded.push(replacement);
        chars.next();
    }

    decoded
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indented_lines_continue() {
        let lines = unfold("DESCRIPTION:First\r\n Second\r\n\tThird\r\nSUMMARY:Next\r\n");
        assert_eq!(
            lines,
            vec![
                (1, "DESCRIPTION:FirstSecondThird".to_string()),
                (4, "SUMMARY:Next".to_string())
            ]
        );
    }

    #[test]
    fn bare_lf_and_blank_lines() {
        let lines = unfold("BEGIN:VCALENDAR\n\nVERSION:2.0\nEND:VCALENDAR");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].0, 3);
    }

    #[test]
    fn unindented_piece_without_colon_continues() {
        assert_eq!(
            unfold("DESCRIPTION:broken\r\nfold\r\n"),
            vec![(1, "DESCRIPTION:brokenfold".to_string())]
        );
    }

    #[test]
    fn unindented_piece_with_colon_stays_separate() {
        let lines = unfold("DESCRIPTION:Treffen\r\nsiehe auch: Wiki\r\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lex_line(&lines[1].1, lines[1].0).unwrap_err().kind,
            ParseErrorKind::InvalidPropertyName
        );
    }

    #[test]
    fn plain_line() {
        let prop = lex_line("SUMMARY:Plenum", 1).unwrap();
        assert_eq!(prop.name, "SUMMARY");
        assert!(prop.params.is_empty());
        assert_eq!(prop.raw_value, "Plenum");
        assert_eq!(prop.value, Value::Raw("Plenum".to_string()));
    }

    #[test]
    fn parameters_and_colons_in_value() {
        let prop = lex_line("dtstart;TZID=Europe/Berlin;VALUE=DATE-TIME:20260105T190000", 1).unwrap();
        assert_eq!(prop.name, "DTSTART");
        assert_eq!(prop.param("TZID"), Some("Europe/Berlin"));
        assert_eq!(prop.param("value"), Some("DATE-TIME"));
        assert_eq!(prop.raw_value, "20260105T190000");

        let prop = lex_line("URL;VALUE=URI:https://example.org/a:b", 1).unwrap();
        assert_eq!(prop.raw_value, "https://example.org/a:b");
    }

    #[test]
    fn empty_value() {
        assert_eq!(lex_line("LOCATION;LANGUAGE=de:", 1).unwrap().raw_value, "");
        assert_eq!(lex_line("LOCATION:", 1).unwrap().raw_value, "");
    }

    #[test]
    fn quoted_and_multiple_values() {
        let prop = lex_line("ORGANIZER;CN=\"Doe, Jane: Chair\":mailto:jane@example.com", 1).unwrap();
        assert_eq!(prop.param("CN"), Some("Doe, Jane: Chair"));
        assert_eq!(prop.raw_value, "mailto:jane@example.com");

        let prop = lex_line("ATTENDEE;ROLE=REQ-PARTICIPANT,\"OPT\";RSVP=TRUE:mailto:a@b", 1).unwrap();
        assert_eq!(prop.params[0].values, vec!["REQ-PARTICIPANT", "OPT"]);
        assert_eq!(prop.param("RSVP"), Some("TRUE"));
    }

    #[test]
    fn caret_escapes_in_quoted_values() {
        let prop = lex_line("ATTENDEE;CN=\"A^nB ^'C^' ^^ ^x\":mailto:a@b", 1).unwrap();
        assert_eq!(prop.param("CN"), Some("A\nB \"C\" ^ ^x"));
    }

    #[test]
    fn malformed_lines() {
        let kind = |line: &str| lex_line(line, 3).unwrap_err().kind;
        assert_eq!(kind("INVALID"), ParseErrorKind::MissingColon);
        assert_eq!(kind(":value"), ParseErrorKind::MissingPropertyName);
        assert_eq!(kind("BAD NAME:value"), ParseErrorKind::InvalidPropertyName);
        assert_eq!(kind("X;CN=\"open:value"), ParseErrorKind::UnclosedQuote);
        assert_eq!(kind("X;NOEQUALS:value"), ParseErrorKind::InvalidParameter);
        assert_eq!(kind("X;CN=\"a\"b:value"), ParseErrorKind::InvalidParameter);
        assert_eq!(kind("X;CN=a"), ParseErrorKind::MissingColon);
    }
}
