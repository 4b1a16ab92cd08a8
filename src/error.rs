//! Error taxonomy shared by every engine operation.

use std::fmt;

use serde::Serialize;

/// Machine-readable error code surfaced to tool callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    GpsRequired,
    ExecutionError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::GpsRequired => "GPS_REQUIRED",
            ErrorCode::ExecutionError => "EXECUTION_ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed input, regressions, mismatched vehicles.
    Validation(String),
    /// A referenced record could not be resolved by the record store.
    NotFound(String),
    /// Coordinate comparison requested without coordinates.
    GpsRequired(String),
    /// Unexpected internal failure.
    Execution(String),
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Validation(_) => ErrorCode::ValidationError,
            EngineError::NotFound(_) => ErrorCode::NotFound,
            EngineError::GpsRequired(_) => ErrorCode::GpsRequired,
            EngineError::Execution(_) => ErrorCode::ExecutionError,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            EngineError::Validation(message)
            | EngineError::NotFound(message)
            | EngineError::GpsRequired(message)
            | EngineError::Execution(message) => message,
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code().as_str(), self.message())
    }
}

impl std::error::Error for EngineError {}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Validation(format!("invalid input: {}", err))
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(reqwest::StatusCode::NOT_FOUND) => EngineError::NotFound(err.to_string()),
            _ => EngineError::Execution(format!("record store request failed: {}", err)),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
