//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Local record errors
    SchemaViolation,
    InvalidJson,

    // Submission errors
    NoInput,
    Transport,
    Remote,
}

impl ErrorCode {
    /// Returns true if re-invoking the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::Transport)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::SchemaViolation => "SCHEMA_VIOLATION",
            ErrorCode::InvalidJson => "INVALID_JSON",
            ErrorCode::NoInput => "NO_INPUT",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::Remote => "REMOTE",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a schema violation error for a specific field path.
    pub fn schema_violation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SchemaViolation, message).with_detail("path", path.into())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("path");
        assert_eq!(format!("{}", err), "Field 'path' cannot be empty");
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("path", "empty segment");
        assert_eq!(
            format!("{}", err),
            "Field 'path' has invalid format: empty segment"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::NoInput, "No documents selected");
        assert_eq!(format!("{}", err), "[NO_INPUT] No documents selected");
    }

    #[test]
    fn schema_violation_records_path_detail() {
        let err = DomainError::schema_violation("employees.bogus", "unknown field");
        assert_eq!(err.code, ErrorCode::SchemaViolation);
        assert_eq!(err.details.get("path"), Some(&"employees.bogus".to_string()));
    }

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(ErrorCode::Transport.is_retryable());
        assert!(!ErrorCode::Remote.is_retryable());
        assert!(!ErrorCode::NoInput.is_retryable());
        assert!(!ErrorCode::SchemaViolation.is_retryable());
    }
}
