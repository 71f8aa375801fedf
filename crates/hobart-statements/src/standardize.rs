//! JSON-driven concept standardization.
//!
//! Maps filer concepts to canonical concepts and labels so statements from
//! different filers (and different taxonomy vintages) line up. The bundled
//! table is embedded at compile time and version-stamped; resolution is a
//! pure lookup, so standardized output is deterministic.

use hobart_xbrl::model::{QName, StatementType};
use serde::Deserialize;
use std::collections::HashMap;

/// Embedded standardization table.
const BUILTIN_MAPPINGS: &str = include_str!("../data/concept_mappings.json");

#[derive(Debug, Deserialize)]
struct MappingFile {
    version: String,
    mappings: Vec<MappingEntry>,
}

#[derive(Debug, Deserialize)]
struct MappingEntry {
    concept: String,
    canonical: String,
    label: String,
    #[serde(default)]
    statement: Option<String>,
    /// When present, the entry only applies to these taxonomy years.
    #[serde(default)]
    taxonomy_years: Option<Vec<i32>>,
}

/// A resolved canonical mapping for one filer concept.
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalConcept {
    /// Canonical concept key used for cross-filing alignment.
    pub concept: String,

    /// Canonical display label.
    pub label: String,

    /// Statement the canonical concept belongs to.
    pub statement_type: Option<StatementType>,

    /// Taxonomy years the mapping is restricted to, if any.
    taxonomy_years: Option<Vec<i32>>,
}

/// Deterministic, version-stamped concept standardizer.
#[derive(Clone, Debug)]
pub struct ConceptMapper {
    version: String,
    by_concept: HashMap<QName, Vec<CanonicalConcept>>,
}

impl ConceptMapper {
    /// Loads the bundled mapping table.
    ///
    /// The bundled table is validated by tests; a broken table is a build
    /// defect, not a runtime condition.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_MAPPINGS).expect("bundled concept mappings are valid")
    }

    /// Parses a mapping table from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: MappingFile = serde_json::from_str(json)?;
        let mut by_concept: HashMap<QName, Vec<CanonicalConcept>> = HashMap::new();
        for entry in file.mappings {
            by_concept
                .entry(QName::new(entry.concept))
                .or_default()
                .push(CanonicalConcept {
                    concept: entry.canonical,
                    label: entry.label,
                    statement_type: entry.statement.as_deref().map(parse_statement_type),
                    taxonomy_years: entry.taxonomy_years,
                });
        }
        Ok(Self {
            version: file.version,
            by_concept,
        })
    }

    /// Version stamp of the loaded table.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The canonical mapping for a concept, optionally restricted by
    /// taxonomy year. Year-specific entries win over year-agnostic ones.
    #[must_use]
    pub fn canonical(&self, concept: &QName, taxonomy_year: Option<i32>) -> Option<&CanonicalConcept> {
        let entries = self.by_concept.get(concept)?;
        if let Some(year) = taxonomy_year
            && let Some(entry) = entries.iter().find(|e| {
                e.taxonomy_years
                    .as_ref()
                    .is_some_and(|years| years.contains(&year))
            })
        {
            return Some(entry);
        }
        entries.iter().find(|e| e.taxonomy_years.is_none())
    }

    /// Canonical label for a concept, year-agnostic.
    #[must_use]
    pub fn canonical_label(&self, concept: &QName) -> Option<&str> {
        self.canonical(concept, None).map(|c| c.label.as_str())
    }

    /// Alignment key for stitching: the canonical concept when mapped, the
    /// raw qname otherwise.
    #[must_use]
    pub fn group_key(&self, concept: &QName) -> String {
        self.canonical(concept, None)
            .map_or_else(|| concept.to_string(), |c| c.concept.clone())
    }

    /// Statement type the concept canonically belongs to.
    #[must_use]
    pub fn statement_type(&self, concept: &QName) -> Option<StatementType> {
        self.canonical(concept, None).and_then(|c| c.statement_type)
    }

    /// Number of mapped filer concepts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_concept.len()
    }

    /// True when the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_concept.is_empty()
    }
}

fn parse_statement_type(s: &str) -> StatementType {
    match s {
        "BalanceSheet" => StatementType::BalanceSheet,
        "IncomeStatement" => StatementType::IncomeStatement,
        "CashFlow" => StatementType::CashFlow,
        "StatementOfEquity" => StatementType::StatementOfEquity,
        "ComprehensiveIncome" => StatementType::ComprehensiveIncome,
        "Cover" => StatementType::Cover,
        "Notes" => StatementType::Notes,
        _ => StatementType::Other,
    }
}
