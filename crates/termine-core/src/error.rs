use thiserror::Error;

/// Core-level errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidSetting { key: &'static str, message: String },
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
