use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    RfcError(#[from] termine_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] termine_core::error::CoreError),

    /// A date or date-time property holds a value of another type.
    #[error("Type mismatch in {property}: expected a date or date-time, found {found:?}")]
    TypeMismatch { property: String, found: String },

    #[error("Invalid recurrence rule {rule:?}: {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
