//! iCalendar content (RFC 5545).
//!
//! Only the read path is implemented: feeds are parsed into a component tree
//! whose properties carry typed values alongside the raw text.

pub mod core;
pub mod parse;

use crate::error::RfcResult;
use self::core::ICalendar;

/// ## Summary
/// Parses raw feed bytes (UTF-8, optionally with a byte-order mark).
///
/// ## Errors
/// Returns an error if the bytes are not UTF-8 or not a valid iCalendar document.
pub fn parse_bytes(bytes: &[u8]) -> RfcResult<ICalendar> {
    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Ok(parse::parse(text)?)
}
