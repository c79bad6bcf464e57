//! Error types for the Palisade library.
//!
//! All fallible operations return [`Result`], with [`PalisadeError`]
//! describing what went wrong. Backend failures propagate to the caller;
//! most other conditions are handled locally with documented fallbacks.

use anyhow;
use thiserror::Error;

/// The main error type for Palisade operations.
#[derive(Error, Debug)]
pub enum PalisadeError {
    /// The search backend call failed or timed out.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Query-related errors (malformed filters, unparsable values, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Facet-related errors (malformed facet response sections).
    #[error("Facet error: {0}")]
    Facet(String),

    /// A recalculated date range collapsed (`from >= to`).
    #[error("Invalid date bound: {0}")]
    InvalidDateBound(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with PalisadeError.
pub type Result<T> = std::result::Result<T, PalisadeError>;

impl PalisadeError {
    /// Create a new backend error.
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        PalisadeError::Backend(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        PalisadeError::Query(msg.into())
    }

    /// Create a new facet error.
    pub fn facet<S: Into<String>>(msg: S) -> Self {
        PalisadeError::Facet(msg.into())
    }

    /// Create a new invalid date bound error.
    pub fn invalid_date_bound<S: Into<String>>(msg: S) -> Self {
        PalisadeError::InvalidDateBound(msg.into())
    }
}
