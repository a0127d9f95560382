//! Unified application error types for FolderTree.
//!
//! Every crate maps its internal errors into [`AppError`] so that callers
//! only ever match on an [`ErrorKind`]. Storage errors never leak raw; the
//! database crate translates them before they cross the store boundary.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The request was malformed or incomplete.
    Validation,
    /// The referenced folder does not exist.
    NotFound,
    /// The parent referenced by a create does not exist.
    ParentNotFound,
    /// A uniqueness constraint or concurrent write was violated.
    Conflict,
    /// The operation would nest a folder deeper than allowed.
    MaxDepthExceeded,
    /// A cycle, or a forbidden ancestor, was found during traversal.
    CircularReference,
    /// The backing store failed.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::ParentNotFound => write!(f, "PARENT_NOT_FOUND"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::MaxDepthExceeded => write!(f, "MAX_DEPTH_EXCEEDED"),
            Self::CircularReference => write!(f, "CIRCULAR_REFERENCE"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout FolderTree.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a parent-not-found error.
    pub fn parent_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParentNotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a max-depth-exceeded error.
    pub fn max_depth_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MaxDepthExceeded, message)
    }

    /// Create a circular-reference error.
    pub fn circular_reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CircularReference, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error reports a missing folder or a missing parent.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound | ErrorKind::ParentNotFound)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::with_source(
            ErrorKind::Validation,
            format!("Invalid request: {err}"),
            err,
        )
    }
}
