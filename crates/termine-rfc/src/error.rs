use thiserror::Error;

use crate::ical::parse::ParseError;

/// RFC parsing errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Invalid feed encoding: {0}")]
    EncodingError(#[from] std::str::Utf8Error),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
