//! Error types for XBRL parsing.

use thiserror::Error;

/// Result type for XBRL operations.
pub type Result<T> = std::result::Result<T, XbrlError>;

/// Errors that can occur while parsing XBRL artifacts.
///
/// Only unrecoverable conditions surface here. Degradations that leave the
/// filing usable (an unreachable linkbase, a value that fails coercion) are
/// recorded as warnings on the parsed result instead.
#[derive(Debug, Error)]
pub enum XbrlError {
    /// The instance document is not well-formed or lacks required structure.
    #[error("malformed instance: {0}")]
    MalformedInput(String),

    /// Low-level XML error.
    #[error("XML error: {0}")]
    Xml(String),

    /// A linkbase referenced by the instance could not be fetched.
    #[error("linkbase unavailable: {url}: {reason}")]
    LinkbaseUnavailable {
        /// URL of the linkbase document.
        url: String,
        /// Resolver-reported reason.
        reason: String,
    },

    /// The schema resolver has no bytes for a URL.
    #[error("unresolved reference: {0}")]
    Unresolved(String),

    /// A fact references a context that was never declared.
    #[error("fact {fact_id} references unknown context {context_ref}")]
    UnknownContext {
        /// Id of the offending fact.
        fact_id: String,
        /// The dangling context reference.
        context_ref: String,
    },

    /// A date attribute failed to parse.
    #[error("invalid date {value:?} in {location}")]
    InvalidDate {
        /// The unparseable text.
        value: String,
        /// Element or attribute the text came from.
        location: String,
    },

    /// IO error from a resolver backed by the filesystem.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for XbrlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XbrlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.to_string())
    }
}
