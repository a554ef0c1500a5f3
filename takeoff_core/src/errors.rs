//! # Error Types
//!
//! Structured error types for takeoff_core.
//!
//! The formula layer never fails: blank or garbage input is coerced to 0 and
//! unknown preset keys fall back to documented defaults. Errors only appear at
//! the edges of the engine, where rows are persisted or sessions are loaded,
//! and in the strict `try_*` preset lookups.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::errors::{TakeoffError, TakeoffResult};
//!
//! fn require_positive(field: &str, value: f64) -> TakeoffResult<f64> {
//!     if value <= 0.0 {
//!         return Err(TakeoffError::invalid_input(field, value.to_string(), "must be positive"));
//!     }
//!     Ok(value)
//! }
//!
//! assert!(require_positive("area", -1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for takeoff_core operations
pub type TakeoffResult<T> = Result<T, TakeoffError>;

/// Structured error type for persistence and lookup operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum TakeoffError {
    /// An input value is invalid (only raised outside the formula layer)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A strict preset lookup found no entry for the key
    #[error("Unknown {table} preset: '{key}'")]
    UnknownPreset { table: String, key: String },

    /// A snapshot or session referenced a calculator that does not exist
    #[error("Unknown calculator: {id}")]
    UnknownCalculator { id: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl TakeoffError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        TakeoffError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownPreset error
    pub fn unknown_preset(table: impl Into<String>, key: impl Into<String>) -> Self {
        TakeoffError::UnknownPreset {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Create an UnknownCalculator error
    pub fn unknown_calculator(id: impl Into<String>) -> Self {
        TakeoffError::UnknownCalculator { id: id.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        TakeoffError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        TakeoffError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Wrap a serde_json error
    pub fn serialization(err: impl std::fmt::Display) -> Self {
        TakeoffError::SerializationError {
            reason: err.to_string(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            TakeoffError::InvalidInput { .. } => "INVALID_INPUT",
            TakeoffError::UnknownPreset { .. } => "UNKNOWN_PRESET",
            TakeoffError::UnknownCalculator { .. } => "UNKNOWN_CALCULATOR",
            TakeoffError::FileError { .. } => "FILE_ERROR",
            TakeoffError::FileLocked { .. } => "FILE_LOCKED",
            TakeoffError::SerializationError { .. } => "SERIALIZATION_ERROR",
            TakeoffError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = TakeoffError::unknown_preset("rebar", "#99");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("UnknownPreset"));
        let roundtrip: TakeoffError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(TakeoffError::unknown_calculator("x").error_code(), "UNKNOWN_CALCULATOR");
        assert_eq!(TakeoffError::serialization("bad").error_code(), "SERIALIZATION_ERROR");
        assert_eq!(TakeoffError::file_locked("a", "b", "c").error_code(), "FILE_LOCKED");
        assert_eq!(TakeoffError::file_error("open", "a", "b").error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_display_message() {
        let error = TakeoffError::unknown_preset("tile", "99x99");
        assert_eq!(error.to_string(), "Unknown tile preset: '99x99'");
    }
}
