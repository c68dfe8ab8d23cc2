use thiserror::Error;

use crate::errors::{DomainError, ErrorCode};

/// Application-level error for binaries and bootstrap code.
///
/// Core operations return [`DomainError`]; this wraps it together with the
/// failures that only happen around the core (config, output).
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Domain(err) => err.code(),
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Serialization(_) | AppError::Io(_) => ErrorCode::Internal,
        }
    }
}
