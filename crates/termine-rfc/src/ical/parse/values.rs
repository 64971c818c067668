//! Typed value readers (RFC 5545 §3.3).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::ical::core::{TimeBasis, Timestamp};

/// ## Summary
/// Reads a DATE (`YYYYMMDD`).
///
/// ## Errors
/// Returns [`ParseErrorKind::InvalidDate`] unless `s` is eight digits naming a
/// real calendar day.
pub fn parse_date(s: &str, line: usize, column: usize) -> ParseResult<NaiveDate> {
    calendar_date(s).ok_or_else(|| {
        ParseError::at(ParseErrorKind::InvalidDate, line, column).with_detail(s.to_string())
    })
}

/// ## Summary
/// Reads a DATE-TIME (`YYYYMMDDTHHMMSS[Z]`). A trailing `Z` wins over `tzid`.
///
/// ## Errors
/// Returns [`ParseErrorKind::InvalidDateTime`] if either half is malformed.
pub fn parse_datetime(
    s: &str,
    tzid: Option<&str>,
    line: usize,
    column: usize,
) -> ParseResult<Timestamp> {
    let invalid = || {
        ParseError::at(ParseErrorKind::InvalidDateTime, line, column).with_detail(s.to_string())
    };

    let (date, time) = s.split_once(['T', 't']).ok_or_else(invalid)?;
    let (time, utc) = match time.strip_suffix(['Z', 'z']) {
        Some(time) => (time, true),
        None => (time, false),
    };

    let date = calendar_date(date).ok_or_else(invalid)?;
    let time = clock_time(time).ok_or_else(invalid)?;

    let basis = match (utc, tzid) {
        (true, _) => TimeBasis::Utc,
        (false, Some(tzid)) => TimeBasis::Tzid(tzid.to_string()),
        (false, None) => TimeBasis::Floating,
    };

    Ok(Timestamp {
        wall: NaiveDateTime::new(date, time),
        basis,
    })
}

/// ## Summary
/// Reads a DURATION such as `P1W`, `-PT15M` or `P1DT2H30M`.
///
/// ## Errors
/// Returns [`ParseErrorKind::InvalidDuration`] for anything else, including
/// the empty forms `P` and `PT`.
pub fn parse_duration(s: &str, line: usize, column: usize) -> ParseResult<TimeDelta> {
    signed_duration(s).ok_or_else(|| {
        ParseError::at(ParseErrorKind::InvalidDuration, line, column).with_detail(s.to_string())
    })
}

/// ## Summary
/// Reads a PERIOD (`start/end` or `start/duration`) and returns its start.
///
/// ## Errors
/// Returns [`ParseErrorKind::InvalidPeriod`] if there is no `/` or either
/// side does not parse.
pub fn parse_period_start(
    s: &str,
    tzid: Option<&str>,
    line: usize,
    column: usize,
) -> ParseResult<Timestamp> {
    let invalid = || {
        ParseError::at(ParseErrorKind::InvalidPeriod, line, column).with_detail(s.to_string())
    };

    let (start, end) = s.split_once('/').ok_or_else(invalid)?;
    let Ok(start) = parse_datetime(start, tzid, line, column) else {
        return Err(invalid());
    };

    let end_ok = if end.starts_with(['P', '+', '-']) {
        signed_duration(end).is_some()
    } else {
        parse_datetime(end, tzid, line, column).is_ok()
    };

    if end_ok { Ok(start) } else { Err(invalid()) }
}

/// Undoes TEXT escaping (`\\`, `\,`, `\;`, `\n`, `\N`).
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut text = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => text.push('\n'),
            Some(escaped @ (',' | ';' | '\\')) => text.push(escaped),
            Some(other) => {
                text.push('\\');
                text.push(other);
            }
            None => text.push('\\'),
        }
    }

    text
}

fn calendar_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = s[0..4].parse().ok()?;
    let month = s[4..6].parse().ok()?;
    let day = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `HHMMSS`. A leap second is read as the second before it.
fn clock_time(s: &str) -> Option<NaiveTime> {
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour = s[0..2].parse().ok()?;
    let minute = s[2..4].parse().ok()?;
    let second: u32 = s[4..6].parse().ok()?;
    if second > 60 {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, second.min(59))
}

fn signed_duration(s: &str) -> Option<TimeDelta> {
    let (negative, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let body = body.strip_prefix('P')?;

    let mut total = TimeDelta::zero();
    let mut digits = String::new();
    let mut in_time = false;
    let mut seen_part = false;

    for c in body.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if c == 'T' {
            if in_time || !digits.is_empty() {
                return None;
            }
            in_time = true;
            continue;
        }

        let amount: i64 = digits.parse().ok()?;
        digits.clear();
        let part = match (in_time, c) {
            (false, 'W') => TimeDelta::try_weeks(amount)?,
            (false, 'D') => TimeDelta::try_days(amount)?,
            (true, 'H') => TimeDelta::try_hours(amount)?,
            (true, 'M') => TimeDelta::try_minutes(amount)?,
            (true, 'S') => TimeDelta::try_seconds(amount)?,
            _ => return None,
        };
        total = total.checked_add(&part)?;
        seen_part = true;
    }

    if !digits.is_empty() || !seen_part {
        return None;
    }
    Some(if negative { -total } else { total })
}
