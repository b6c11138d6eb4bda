//! # Errors
//!
//! [`calc_all`](crate::calculations::calc_all) never fails. Everything that
//! can go wrong happens around it: parsing form text, checking settings or
//! an input before a run, and reading or writing `.sfp` project files.
//!
//! Errors serialize as `{"type": ..., "details": {...}}` so a front end can
//! show them next to a result.
//!
//! ```rust
//! use scaffold_core::errors::CalcError;
//!
//! let err = CalcError::invalid_input("widthNS", "-5", "Must be positive");
//! assert_eq!(err.error_code(), "INVALID_INPUT");
//! assert_eq!(err.to_string(), "Invalid widthNS '-5': Must be positive");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type CalcResult<T> = Result<T, CalcError>;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A field could not be parsed or is out of range
    #[error("Invalid {field} '{value}': {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing {field}")]
    MissingField { field: String },

    /// Reading or writing an input, settings or project file failed
    #[error("Could not {operation} '{path}': {reason}")]
    Io {
        operation: String,
        path: String,
        reason: String,
    },

    #[error("Malformed JSON: {reason}")]
    Serialization { reason: String },

    /// Another process is adding jobs to the same project
    #[error("Project '{path}' is being edited by another process")]
    ProjectLocked { path: String },

    /// Project written by a newer release
    #[error("Project format {found} is newer than supported format {supported}")]
    UnsupportedFormat { found: u32, supported: u32 },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField { field: field.into() }
    }

    pub fn io(operation: impl Into<String>, path: impl Into<String>, cause: impl ToString) -> Self {
        CalcError::Io {
            operation: operation.into(),
            path: path.into(),
            reason: cause.to_string(),
        }
    }

    pub fn serialization(cause: impl ToString) -> Self {
        CalcError::Serialization {
            reason: cause.to_string(),
        }
    }

    /// Worth retrying the same command later
    pub fn is_retryable(&self) -> bool {
        matches!(self, CalcError::ProjectLocked { .. })
    }

    /// Stable code for scripts and front ends
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::Io { .. } => "IO_ERROR",
            CalcError::Serialization { .. } => "SERIALIZATION_ERROR",
            CalcError::ProjectLocked { .. } => "PROJECT_LOCKED",
            CalcError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_json() {
        let error = CalcError::invalid_input("widthNS", "abc", "Not a number");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        assert!(json.contains("\"field\":\"widthNS\""));
        let back: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, error);
    }

    #[test]
    fn test_codes_and_retry() {
        assert_eq!(CalcError::missing_field("label").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::serialization("eof").error_code(), "SERIALIZATION_ERROR");
        assert!(CalcError::ProjectLocked { path: "a.sfp".into() }.is_retryable());
        assert!(!CalcError::io("open", "a.sfp", "missing").is_retryable());
    }

    #[test]
    fn test_messages() {
        let error = CalcError::invalid_input("railingCount", "5", "Must be between 0 and 3");
        assert_eq!(error.to_string(), "Invalid railingCount '5': Must be between 0 and 3");

        let error = CalcError::UnsupportedFormat { found: 3, supported: 1 };
        assert_eq!(error.to_string(), "Project format 3 is newer than supported format 1");
    }
}
