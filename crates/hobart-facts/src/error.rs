//! Error types for the facts pipeline.

use thiserror::Error;

/// Result type for facts-pipeline operations.
pub type Result<T> = std::result::Result<T, FactsError>;

/// Errors that can occur while loading company facts.
#[derive(Debug, Error)]
pub enum FactsError {
    /// The company-facts document failed to deserialize.
    #[error("company facts parsing error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A date field failed to parse.
    #[error("invalid date {value:?} in {field}")]
    InvalidDate {
        /// The unparseable text.
        value: String,
        /// Field the text came from.
        field: String,
    },

    /// The document deserialized but contains no facts.
    #[error("company facts document is empty")]
    Empty,
}
