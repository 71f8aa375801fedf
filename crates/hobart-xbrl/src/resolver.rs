//! Schema and linkbase resolution contract.
//!
//! The core never performs network or disk I/O on its own. Linkbase and
//! schema documents referenced from an instance are requested by URL through
//! a [`SchemaResolver`] supplied by the caller, who may back it with any
//! transport, cache or fixture set.

use crate::error::{Result, XbrlError};
use std::collections::HashMap;

/// Resolves taxonomy document URLs to their bytes.
///
/// Implementations should return [`XbrlError::Unresolved`] for URLs they
/// cannot serve; the taxonomy loader degrades the affected graph to empty and
/// records a warning rather than failing the filing.
pub trait SchemaResolver {
    /// Returns the bytes of the document at `url`.
    fn resolve(&self, url: &str) -> Result<Vec<u8>>;
}

/// Resolver over a pre-populated URL -> bytes map.
///
/// Useful for tests and for filings whose attachments were fetched up front
/// by an external collaborator.
#[derive(Debug, Default)]
pub struct StaticResolver {
    documents: HashMap<String, Vec<u8>>,
}

impl StaticResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document under both its full URL and its trailing file
    /// name, since instances reference local attachments by file name.
    pub fn insert(&mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let url = url.into();
        let bytes = bytes.into();
        if let Some(name) = url.rsplit('/').next()
            && name != url
        {
            self.documents.insert(name.to_string(), bytes.clone());
        }
        self.documents.insert(url, bytes);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(url, bytes);
        self
    }

    /// Number of registered documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when no documents are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl SchemaResolver for StaticResolver {
    fn resolve(&self, url: &str) -> Result<Vec<u8>> {
        self.documents
            .get(url)
            .or_else(|| url.rsplit('/').next().and_then(|name| self.documents.get(name)))
            .cloned()
            .ok_or_else(|| XbrlError::Unresolved(url.to_string()))
    }
}

/// Resolver that reports every document as unavailable.
///
/// Parsing with this resolver yields a filing with facts but empty taxonomy
/// graphs, which is the degraded mode for instances whose linkbases were not
/// provided.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullResolver;

impl SchemaResolver for NullResolver {
    fn resolve(&self, url: &str) -> Result<Vec<u8>> {
        Err(XbrlError::Unresolved(url.to_string()))
    }
}
