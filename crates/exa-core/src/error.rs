//! Error types for asset extraction and query operations.
//!
//! Most parse failures in this workspace are recovered locally into null data, so this
//! type mostly travels between internal helpers and the few fatal boundaries: loading a
//! topology document, writing an inventory document, and loading one for queries.

use serde::Serialize;
use thiserror::Error;

/// Main error type for asset inventory operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Filesystem access failed
    #[error("I/O error: {0}")]
    Io(String),

    /// Compressed archive could not be decoded
    #[error("Archive error: {0}")]
    Archive(String),

    /// Expected archive member was absent
    #[error("Archive member not found: {0}")]
    MissingMember(String),

    /// JSON payload could not be decoded
    #[error("JSON decode error: {0}")]
    Json(String),

    /// Topology document could not be decoded
    #[error("Topology error: {0}")]
    Topology(String),

    /// Inventory document could not be decoded or encoded
    #[error("Document error: {0}")]
    Document(String),

    /// Capacity token was malformed or used an unknown unit
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),

    /// Date string matched none of the accepted formats
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Report identifier outside the supported range
    #[error("Invalid report type: {0}")]
    InvalidReport(i64),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Filters removed every cluster
    #[error("No matching clusters")]
    NoMatchingClusters,
}

/// Specialized result type for asset inventory operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured error detail for serialization.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorDetail {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::Archive(_) => "ARCHIVE_ERROR",
            Self::MissingMember(_) => "MISSING_MEMBER",
            Self::Json(_) => "JSON_ERROR",
            Self::Topology(_) => "TOPOLOGY_ERROR",
            Self::Document(_) => "DOCUMENT_ERROR",
            Self::InvalidCapacity(_) => "INVALID_CAPACITY",
            Self::InvalidDate(_) => "INVALID_DATE",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidReport(_) => "INVALID_REPORT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::NoMatchingClusters => "NO_MATCHING_CLUSTERS",
        }
    }

    /// Converts the error into an [`ErrorDetail`].
    #[must_use]
    pub fn into_detail(self) -> ErrorDetail {
        ErrorDetail {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }

    /// Returns true if the error describes a single field or member rather than a whole input.
    #[must_use]
    pub const fn is_field_level(&self) -> bool {
        matches!(
            self,
            Self::MissingMember(_) | Self::InvalidCapacity(_) | Self::InvalidDate(_)
        )
    }
}

// Conversions from external error types
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(err.to_string())
        } else {
            Self::Io(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
