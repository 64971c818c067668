//! Component tree construction.
//!
//! BEGIN/END structure errors fail the whole document. A content line that
//! does not lex is skipped with a warning, and a value that does not read as
//! its type stays [`Value::Raw`] so callers can decide whether it matters.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{lex_line, unfold};
use super::values::{parse_date, parse_datetime, parse_duration, parse_period_start, unescape_text};
use crate::ical::core::{Component, ICalendar, Property, Value};

/// ## Summary
/// Parses an iCalendar document.
///
/// ## Errors
/// Returns an error if the document does not open with `BEGIN:VCALENDAR`, an
/// `END` does not match its `BEGIN`, or a component is never closed.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<ICalendar> {
    let mut stack: Vec<(usize, Component)> = Vec::new();
    let mut last_line = 1;

    for (number, line) in unfold(input) {
        last_line = number;

        let prop = match lex_line(&line, number) {
            Ok(prop) => prop,
            Err(error) if stack.is_empty() => {
                return Err(ParseError::at(ParseErrorKind::MissingBegin, number, 1)
                    .with_detail(error.to_string()));
            }
            Err(error) => {
                tracing::warn!(%error, line = %line, "Skipping malformed content line");
                continue;
            }
        };

        if stack.is_empty()
            && !(prop.name == "BEGIN" && prop.raw_value.eq_ignore_ascii_case("VCALENDAR"))
        {
            return Err(ParseError::at(ParseErrorKind::MissingBegin, number, 1)
                .with_detail("expected BEGIN:VCALENDAR"));
        }

        match prop.name.as_str() {
            "BEGIN" => stack.push((number, Component::new(prop.raw_value.trim()))),
            "END" => {
                let name = prop.raw_value.trim().to_ascii_uppercase();
                let Some((_, component)) = stack.pop() else {
                    return Err(ParseError::at(ParseErrorKind::MismatchedComponent, number, 1));
                };
                if component.name != name {
                    return Err(ParseError::at(ParseErrorKind::MismatchedComponent, number, 1)
                        .with_detail(format!("expected END:{}, got END:{name}", component.name)));
                }

                match stack.last_mut() {
                    Some((_, parent)) => parent.children.push(component),
                    None => {
                        tracing::debug!(
                            events = component
                                .children
                                .iter()
                                .filter(|child| child.name == "VEVENT")
                                .count(),
                            "Parsed calendar, ignoring anything after END:VCALENDAR"
                        );
                        return Ok(ICalendar { root: component });
                    }
                }
            }
            _ => {
                if let Some((_, current)) = stack.last_mut() {
                    current.properties.push(interpret(prop, number));
                }
            }
        }
    }

    match stack.last() {
        Some((begin, component)) => Err(ParseError::at(ParseErrorKind::MissingEnd, last_line, 1)
            .with_detail(format!("END:{} for BEGIN on line {begin}", component.name))),
        None => Err(ParseError::at(ParseErrorKind::MissingBegin, 1, 1)
            .with_detail("empty document")),
    }
}

/// The value shapes the read path distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Date,
    DateTime,
    Period,
    Duration,
    Recur,
    Text,
    Raw,
}

impl Kind {
    fn of(prop: &Property) -> Self {
        if let Some(declared) = prop.param("VALUE") {
            return match declared.to_ascii_uppercase().as_str() {
                "DATE" => Self::Date,
                "DATE-TIME" => Self::DateTime,
                "PERIOD" => Self::Period,
                "DURATION" => Self::Duration,
                "RECUR" => Self::Recur,
                "TEXT" => Self::Text,
                _ => Self::Raw,
            };
        }

        let first = prop.raw_value.split(',').next().unwrap_or_default().trim();
        let bare_date = first.len() == 8 && !first.contains(['T', 't']);

        match prop.name.as_str() {
            "DTSTART" | "DTEND" | "DUE" | "RECURRENCE-ID" | "EXDATE" | "RDATE" if bare_date => {
                Self::Date
            }
            "RDATE" if first.contains('/') => Self::Period,
            "DTSTART" | "DTEND" | "DUE" | "RECURRENCE-ID" | "EXDATE" | "RDATE" | "DTSTAMP"
            | "CREATED" | "LAST-MODIFIED" => Self::DateTime,
            "DURATION" => Self::Duration,
            "RRULE" => Self::Recur,
            "URL" | "ATTENDEE" | "ORGANIZER" | "TZURL" | "UID" => Self::Raw,
            _ => Self::Text,
        }
    }
}

fn interpret(mut prop: Property, number: usize) -> Property {
    let kind = Kind::of(&prop);
    let list = matches!(prop.name.as_str(), "EXDATE" | "RDATE");

    match read_value(&prop, kind, list, number) {
        Ok(value) => prop.value = value,
        Err(error) => {
            tracing::debug!(property = %prop.name, %error, "Keeping unreadable value as raw");
        }
    }
    prop
}

fn read_value(prop: &Property, kind: Kind, list: bool, number: usize) -> ParseResult<Value> {
    let raw = prop.raw_value.trim();
    let tzid = prop.param("TZID");
    let items = || raw.split(',').map(str::trim);

    let value = match (kind, list) {
        (Kind::Date, false) => Value::Date(parse_date(raw, number, 1)?),
        (Kind::Date, true) => Value::Dates(
            items()
                .map(|item| parse_date(item, number, 1))
                .collect::<ParseResult<_>>()?,
        ),
        (Kind::DateTime, false) => Value::DateTime(parse_datetime(raw, tzid, number, 1)?),
        (Kind::DateTime, true) => Value::DateTimes(
            items()
                .map(|item| parse_datetime(item, tzid, number, 1))
                .collect::<ParseResult<_>>()?,
        ),
        (Kind::Period, _) => Value::PeriodStarts(
            items()
                .map(|item| parse_period_start(item, tzid, number, 1))
                .collect::<ParseResult<_>>()?,
        ),
        (Kind::Duration, _) => Value::Duration(parse_duration(raw, number, 1)?),
        (Kind::Recur, _) => Value::Recur(raw.to_string()),
        (Kind::Text, _) => Value::Text(unescape_text(&prop.raw_value)),
        (Kind::Raw, _) => Value::Raw(prop.raw_value.clone()),
    };
    Ok(value)
}
