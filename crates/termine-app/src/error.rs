use std::path::PathBuf;

use thiserror::Error;

/// Application-level errors (feed download and wiki publishing)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] termine_service::error::ServiceError),

    #[error(transparent)]
    CoreError(#[from] termine_core::error::CoreError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to read feed file {path}: {source}")]
    FeedFileError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Wiki login rejected: {0}")]
    LoginRejected(String),

    #[error("Wiki API error during {action}: {code}: {info}")]
    WikiApiError {
        action: &'static str,
        code: String,
        info: String,
    },

    #[error("Unexpected wiki response during {action}: missing {field}")]
    UnexpectedResponse {
        action: &'static str,
        field: &'static str,
    },
}

pub type AppResult<T> = std::result::Result<T, AppError>;
