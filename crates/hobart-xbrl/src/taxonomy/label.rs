//! Label linkbase parsing: `(concept, role, lang) -> text`.

use crate::error::Result;
use crate::model::QName;
use crate::taxonomy::linkbase::parse_extended_links;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known label role URIs.
pub mod roles {
    /// Default label.
    pub const STANDARD: &str = "http://www.xbrl.org/2003/role/label";
    /// Short label.
    pub const TERSE: &str = "http://www.xbrl.org/2003/role/terseLabel";
    /// Long label.
    pub const VERBOSE: &str = "http://www.xbrl.org/2003/role/verboseLabel";
    /// Label for total rows.
    pub const TOTAL: &str = "http://www.xbrl.org/2003/role/totalLabel";
    /// Label for the opening balance of a roll-forward.
    pub const PERIOD_START: &str = "http://www.xbrl.org/2003/role/periodStartLabel";
    /// Label for the closing balance of a roll-forward.
    pub const PERIOD_END: &str = "http://www.xbrl.org/2003/role/periodEndLabel";
    /// Label indicating the displayed value should be negated.
    pub const NEGATED: &str = "http://www.xbrl.org/2009/role/negatedLabel";
    /// Negated total variant.
    pub const NEGATED_TOTAL: &str = "http://www.xbrl.org/2009/role/negatedTotalLabel";
    /// Negated terse variant.
    pub const NEGATED_TERSE: &str = "http://www.xbrl.org/2009/role/negatedTerseLabel";
    /// Documentation text.
    pub const DOCUMENTATION: &str = "http://www.xbrl.org/2003/role/documentation";

    /// True when the role implies sign flipping at display time.
    #[must_use]
    pub fn is_negating(role: &str) -> bool {
        matches!(role, NEGATED | NEGATED_TOTAL | NEGATED_TERSE)
            || role.rsplit('/').next().is_some_and(|r| r.starts_with("negated"))
    }

    /// True when the role marks a total presentation.
    #[must_use]
    pub fn is_total(role: &str) -> bool {
        matches!(role, TOTAL | NEGATED_TOTAL)
    }
}

/// All labels of a taxonomy, keyed by concept, label role and language.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelStore {
    labels: HashMap<(QName, String, String), String>,
}

impl LabelStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a label.
    pub fn insert(&mut self, concept: QName, role: &str, lang: &str, text: String) {
        self.labels
            .insert((concept, role.to_string(), lang.to_string()), text);
    }

    /// Exact lookup by concept, role and language.
    #[must_use]
    pub fn get(&self, concept: &QName, role: &str, lang: &str) -> Option<&str> {
        self.labels
            .get(&(concept.clone(), role.to_string(), lang.to_string()))
            .map(String::as_str)
    }

    /// Display label resolution: the preferred role from the presentation
    /// arc, then the standard role, then the concept's local name split on
    /// camel-case boundaries.
    #[must_use]
    pub fn resolve(&self, concept: &QName, preferred: Option<&str>, lang: &str) -> String {
        if let Some(role) = preferred
            && let Some(text) = self.get(concept, role, lang)
        {
            return text.to_string();
        }
        if let Some(text) = self.get(concept, roles::STANDARD, lang) {
            return text.to_string();
        }
        humanize(concept.local_name())
    }

    /// Concepts whose label in any role contains `needle`
    /// (case-insensitive).
    #[must_use]
    pub fn concepts_with_label_containing(&self, needle: &str) -> Vec<&QName> {
        let needle = needle.to_lowercase();
        let mut out: Vec<&QName> = self
            .labels
            .iter()
            .filter(|((_, _, _), text)| text.to_lowercase().contains(&needle))
            .map(|((concept, _, _), _)| concept)
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Consumes the store, yielding `(concept, role, lang, text)` entries.
    pub fn into_entries(self) -> impl Iterator<Item = (QName, String, String, String)> {
        self.labels
            .into_iter()
            .map(|((concept, role, lang), text)| (concept, role, lang, text))
    }

    /// Number of stored labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when no labels are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Splits a CamelCase local name into words: `AccountsPayableCurrent` ->
/// `Accounts Payable Current`.
fn humanize(local: &str) -> String {
    let mut out = String::with_capacity(local.len() + 8);
    let chars: Vec<char> = local.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase()
            && i > 0
            && (chars[i - 1].is_lowercase()
                || chars.get(i + 1).is_some_and(|n| n.is_lowercase()))
        {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Parses a label linkbase into a [`LabelStore`].
pub(crate) fn parse(bytes: &[u8]) -> Result<LabelStore> {
    let links = parse_extended_links(bytes, "labelLink", "labelArc", Some("label"))?;
    let mut store = LabelStore::new();

    for link in links {
        // Resource label -> (role, lang, text). Several resources can share
        // a label when roles differ.
        let mut resources: HashMap<&str, Vec<(&str, &str, &str)>> = HashMap::new();
        for res in &link.resources {
            resources.entry(res.label.as_str()).or_default().push((
                res.role.as_deref().unwrap_or(roles::STANDARD),
                res.lang.as_deref().unwrap_or("en-US"),
                res.text.as_str(),
            ));
        }

        for arc in &link.arcs {
            let Some(concept) = link.concept(&arc.from) else {
                continue;
            };
            let Some(targets) = resources.get(arc.to.as_str()) else {
                continue;
            };
            for (role, lang, text) in targets {
                store.insert(concept.clone(), role, lang, (*text).to_string());
            }
        }
    }

    Ok(store)
}
