use thiserror::Error;

/// Unified error type for the domain and store layers.
#[derive(Error, Debug)]
pub(crate) enum DomainError {
    #[error("No user selected. Pass --user <email> or set HAVIKIADAS_USER")]
    NotAuthenticated,
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("{0}")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Storage error: {0}")]
    Store(String),
}

pub(crate) type Result<T> = std::result::Result<T, DomainError>;

impl DomainError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for DomainError {
    fn from(err: rusqlite::Error) -> Self {
        DomainError::Store(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Store(err.to_string())
    }
}

impl From<csv::Error> for DomainError {
    fn from(err: csv::Error) -> Self {
        DomainError::Store(err.to_string())
    }
}
