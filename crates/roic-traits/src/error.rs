//! Error types for ROIC analysis.
//!
//! Absence of business data is never an error: a missing operating income or
//! a non-positive invested capital yields an absent ROIC. The variants here
//! cover contract violations by callers and failures of the data layer.

use thiserror::Error;

/// The main error type for ROIC operations.
#[derive(Debug, Error)]
pub enum RoicError {
    /// A caller violated an operation's contract (e.g. a zero projection horizon).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error when the policy configuration is inconsistent.
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// Error when a symbol is not known to the data source.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Error fetching data from external sources.
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// Error writing exported data.
    #[error("Export error: {0}")]
    Export(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RoicError {
    /// Shorthand for an [`RoicError::InvalidArgument`].
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// A specialized Result type for ROIC operations.
pub type Result<T> = std::result::Result<T, RoicError>;
