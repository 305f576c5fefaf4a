//! Error types for breakdown-assist.
//!
//! This module defines all error types used throughout the crate, separating
//! hard validation failures from store-access failures so callers can react
//! to each appropriately.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for breakdown-assist operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors ===
    /// Required form fields were missing or blank; nothing was written.
    #[error("missing required fields: {}", fields.join(", "))]
    MissingFields {
        /// Names of the fields that were missing.
        fields: Vec<String>,
    },

    /// A record was asked to enter Resolved without a resolver name while the
    /// `enforce_resolver_required` policy is active.
    #[error("a resolver name is required to mark {id} as Resolved")]
    ResolverRequired {
        /// Identifier of the record being resolved.
        id: String,
    },

    /// No stored record carries the requested identifier.
    #[error("record not found: {0}")]
    RecordNotFound(String),

    // === Store Errors ===
    /// Failed to open or create the backing database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// The tabular store could not be reached or refused the operation.
    #[error("store access failed: {message}")]
    Store {
        /// Description of what went wrong.
        message: String,
    },

    /// A row overwrite targeted a position the store does not have.
    #[error("row {index} is out of range for table with {len} rows")]
    RowOutOfRange {
        /// The 0-based data row index that was requested.
        index: usize,
        /// Number of data rows the table actually holds.
        len: usize,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for breakdown-assist operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation error from the missing field names.
    #[must_use]
    pub fn missing_fields(fields: Vec<String>) -> Self {
        Self::MissingFields { fields }
    }

    /// Create a generic store access error.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Check if this error is a validation failure (no write occurred).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingFields { .. } | Self::ResolverRequired { .. }
        )
    }

    /// Check if this error means the requested record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound(_))
    }
}
