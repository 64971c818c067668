//! Positioned parse errors.

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// What went wrong while reading a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("empty property name")]
    MissingPropertyName,
    #[error("property name outside A-Z, 0-9 and '-'")]
    InvalidPropertyName,
    #[error("no ':' before the value")]
    MissingColon,
    #[error("malformed parameter")]
    InvalidParameter,
    #[error("unclosed quoted parameter value")]
    UnclosedQuote,
    #[error("malformed DATE")]
    InvalidDate,
    #[error("malformed DATE-TIME")]
    InvalidDateTime,
    #[error("malformed DURATION")]
    InvalidDuration,
    #[error("malformed PERIOD")]
    InvalidPeriod,
    #[error("document does not open with BEGIN:VCALENDAR")]
    MissingBegin,
    #[error("component left open")]
    MissingEnd,
    #[error("END does not match the open component")]
    MismatchedComponent,
}

/// A parse failure at a 1-based position of the unfolded input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column}{}", suffix(.detail.as_deref()))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
    pub detail: Option<String>,
}

impl ParseError {
    #[must_use]
    pub const fn at(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

fn suffix(detail: Option<&str>) -> String {
    detail.map(|detail| format!(": {detail}")).unwrap_or_default()
}
