//! Error types for the tidemark core library.
//!
//! Uses hierarchical domain-specific errors following the thiserror pattern.

use thiserror::Error;

/// Result type alias for tidemark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for tidemark.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Statistics source error
    #[error("Statistics source error: {0}")]
    StatSource(#[from] StatSourceError),

    /// Planning error
    #[error("Planning error: {0}")]
    Planning(#[from] PlanningError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors raised by a statistics source.
#[derive(Error, Debug)]
pub enum StatSourceError {
    /// The storage engine's statistics catalog cannot be reached.
    ///
    /// Not retried by the core; a run for the affected table produces no
    /// directives, other tables' runs are unaffected.
    #[error("Statistics source unavailable: {message}")]
    Unavailable { message: String },

    /// The source has no data for the requested table
    #[error("Unknown table: {table}")]
    UnknownTable { table: String },
}

/// Errors raised while planning maintenance for a single index.
#[derive(Error, Debug)]
pub enum PlanningError {
    /// The index is stored outside the table's partition scheme, so
    /// per-partition maintenance and automatic boundary refresh are unsafe.
    #[error("Index '{index}' on '{table}' is not aligned with the table's partition scheme")]
    IndexNotAligned { index: String, table: String },

    /// A filter predicate could not be canonicalized for comparison
    #[error("Cannot canonicalize predicate on '{index}': {predicate}")]
    AmbiguousPredicate { index: String, predicate: String },

    /// An index participating in planning has no key columns
    #[error("Index '{index}' has no key columns")]
    EmptyKeyColumns { index: String },
}

// Conversion implementations for external error types

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
