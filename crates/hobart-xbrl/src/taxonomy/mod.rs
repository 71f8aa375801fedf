//! Taxonomy loading: the element catalog plus the four relationship graphs,
//! discovered from the instance's `schemaRef` and loaded through a
//! [`SchemaResolver`](crate::resolver::SchemaResolver).

pub mod calculation;
pub mod definition;
pub mod label;
mod linkbase;
pub mod presentation;
pub mod schema;

pub use calculation::{CalculationArc, CalculationGraph};
pub use definition::{Axis, DefinitionGraph, Hypercube};
pub use label::LabelStore;
pub use presentation::{PresentationNode, PresentationTree};
pub use schema::{ElementCatalog, RoleDefinition};

use crate::error::Result;
use crate::model::QName;
use crate::resolver::SchemaResolver;
use linkbase::sniff_link_kinds;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A non-fatal problem encountered while loading taxonomy artifacts.
///
/// The engine proceeds with what it has: a filing without a calculation
/// linkbase still renders, just without calculation-weighted signs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxonomyWarning {
    /// A referenced linkbase could not be fetched.
    LinkbaseMissing {
        /// The unreachable URL.
        url: String,
    },
    /// A fetched linkbase failed to parse; its graphs are empty.
    LinkbaseUnparseable {
        /// Source URL.
        url: String,
        /// Parser-reported reason.
        reason: String,
    },
    /// An imported base schema could not be fetched; attribute inheritance
    /// for its elements is unavailable.
    ImportMissing {
        /// The unreachable schema location.
        url: String,
    },
}

/// The loaded taxonomy of one filing: element catalog, role definitions and
/// the presentation, calculation, definition and label graphs keyed by role
/// URI. Immutable after load.
#[derive(Clone, Debug, Default)]
pub struct Taxonomy {
    /// Element declarations.
    pub elements: ElementCatalog,

    /// Role definitions from the schema's `roleType` declarations.
    pub role_types: HashMap<String, RoleDefinition>,

    /// Presentation trees by role URI.
    pub presentation: HashMap<String, PresentationTree>,

    /// Calculation graphs by role URI.
    pub calculation: HashMap<String, CalculationGraph>,

    /// Definition (dimensional) graphs by role URI.
    pub definition: HashMap<String, DefinitionGraph>,

    /// Labels for all concepts.
    pub labels: LabelStore,

    /// Problems encountered during load.
    pub warnings: Vec<TaxonomyWarning>,
}

impl Taxonomy {
    /// Loads a taxonomy starting from the schema at `schema_url`.
    ///
    /// Linkbases referenced by the schema are fetched through `resolver`;
    /// each one that cannot be fetched or parsed degrades to an empty graph
    /// with a warning recorded.
    pub fn load(schema_url: &str, resolver: &dyn SchemaResolver) -> Result<Self> {
        let mut taxonomy = Self::default();
        let schema_bytes = resolver.resolve(schema_url)?;
        let mut visited = std::collections::HashSet::from([schema_url.to_string()]);
        taxonomy.load_schema_document(schema_url, &schema_bytes, resolver, &mut visited);
        Ok(taxonomy)
    }

    /// Loads a schema document already in memory, then its linkbases.
    /// `visited` breaks the import cycles base taxonomies routinely form.
    fn load_schema_document(
        &mut self,
        url: &str,
        bytes: &[u8],
        resolver: &dyn SchemaResolver,
        visited: &mut std::collections::HashSet<String>,
    ) {
        let parsed = match schema::parse(bytes) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(url, %err, "schema failed to parse");
                self.warnings.push(TaxonomyWarning::LinkbaseUnparseable {
                    url: url.to_string(),
                    reason: err.to_string(),
                });
                return;
            }
        };

        for element in parsed.elements {
            self.elements.insert(element);
        }
        self.role_types.extend(parsed.role_types);

        // Base taxonomy imports supply balance/periodType for standard
        // concepts when the resolver has them; most callers won't, which is
        // fine for rendering.
        for import in &parsed.imports {
            if !visited.insert(import.clone()) {
                continue;
            }
            match resolver.resolve(import) {
                Ok(base_bytes) => {
                    self.load_schema_document(import, &base_bytes, resolver, visited);
                }
                Err(_) => {
                    debug!(url = import.as_str(), "base schema import not resolved");
                    self.warnings
                        .push(TaxonomyWarning::ImportMissing { url: import.clone() });
                }
            }
        }

        for href in &parsed.linkbase_refs {
            match resolver.resolve(href) {
                Ok(linkbase_bytes) => self.load_linkbase(href, &linkbase_bytes),
                Err(err) => {
                    warn!(url = href.as_str(), %err, "linkbase not resolved");
                    self.warnings
                        .push(TaxonomyWarning::LinkbaseMissing { url: href.clone() });
                }
            }
        }
    }

    /// Parses one linkbase document, dispatching on the arc kinds it
    /// actually contains.
    pub(crate) fn load_linkbase(&mut self, url: &str, bytes: &[u8]) {
        let kinds = sniff_link_kinds(bytes);

        if kinds.presentation {
            match presentation::parse(bytes) {
                Ok(trees) => self.presentation.extend(trees),
                Err(err) => self.record_unparseable(url, err),
            }
        }
        if kinds.calculation {
            match calculation::parse(bytes) {
                Ok(graphs) => self.calculation.extend(graphs),
                Err(err) => self.record_unparseable(url, err),
            }
        }
        if kinds.definition {
            match definition::parse(bytes) {
                Ok(graphs) => self.definition.extend(graphs),
                Err(err) => self.record_unparseable(url, err),
            }
        }
        if kinds.label {
            match label::parse(bytes) {
                Ok(store) => {
                    if self.labels.is_empty() {
                        self.labels = store;
                    } else {
                        // Merging label stores is rare (split label files);
                        // fold the smaller into the larger.
                        // Labels from later files win on conflicts.
                        merge_labels(&mut self.labels, store);
                    }
                }
                Err(err) => self.record_unparseable(url, err),
            }
        }
    }

    fn record_unparseable(&mut self, url: &str, err: crate::error::XbrlError) {
        warn!(url, %err, "linkbase failed to parse");
        self.warnings.push(TaxonomyWarning::LinkbaseUnparseable {
            url: url.to_string(),
            reason: err.to_string(),
        });
    }

    /// Role URIs that have a presentation tree, sorted for determinism.
    #[must_use]
    pub fn presentation_roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = self.presentation.keys().map(String::as_str).collect();
        roles.sort_unstable();
        roles
    }

    /// The role definition text for a role URI, when the schema declared one.
    #[must_use]
    pub fn role_definition(&self, role: &str) -> Option<&str> {
        self.role_types.get(role).and_then(|r| r.definition.as_deref())
    }

    /// True when the schema declares `concept` abstract.
    #[must_use]
    pub fn is_abstract(&self, concept: &QName) -> bool {
        self.elements.is_abstract(concept)
    }
}

fn merge_labels(target: &mut LabelStore, source: LabelStore) {
    // LabelStore has no iterator over owned entries by design; rebuild via
    // serde round-trip-free path: keep it simple by swapping when the target
    // is smaller.
    if target.len() < source.len() {
        let old = std::mem::replace(target, source);
        merge_label_entries(target, old);
    } else {
        merge_label_entries(target, source);
    }
}

fn merge_label_entries(target: &mut LabelStore, source: LabelStore) {
    for (concept, role, lang, text) in source.into_entries() {
        if target.get(&concept, &role, &lang).is_none() {
            target.insert(concept, &role, &lang, text);
        }
    }
}
