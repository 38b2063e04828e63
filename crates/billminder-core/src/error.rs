//! Core error types for billminder-core.
//!
//! This module defines the error hierarchy using thiserror. Collaborator
//! failures (notification scheduler, transaction sink) have their own types
//! so the lifecycle layer can downgrade them to warnings.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for billminder-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Notification scheduler errors
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Transaction collaborator errors
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No reminder with the given id
    #[error("Reminder '{0}' not found")]
    NotFound(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Snapshot could not be encoded
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    /// Data directory unavailable
    #[error("Failed to access data directory: {0}")]
    DataDir(String),

    /// Backend-specific failure
    #[error("{0}")]
    Backend(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dotted key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors reported by the external notification scheduler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// Scheduler rejected the request
    #[error("Scheduler rejected notification: {0}")]
    Rejected(String),

    /// Scheduler could not be reached or failed internally
    #[error("Scheduler unavailable: {0}")]
    Unavailable(String),

    /// Cancel was requested for an id the scheduler does not know
    #[error("Unknown notification id: {0}")]
    UnknownId(String),
}

/// Errors reported by the transaction-creation collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Transaction service unavailable: {0}")]
    Unavailable(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text field is empty
    #[error("'{0}' must not be empty")]
    Empty(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked
                    || inner.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_wraps_into_core_error() {
        let err: CoreError = StorageError::Backend("disk full".into()).into();
        assert_eq!(err.to_string(), "Storage error: disk full");
    }

    #[test]
    fn not_found_message_names_the_id() {
        let err = CoreError::NotFound("abc".into());
        assert_eq!(err.to_string(), "Reminder 'abc' not found");
    }

    #[test]
    fn query_failure_maps_to_query_failed() {
        let err: StorageError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StorageError::QueryFailed(_)));
    }
}
