//! Loading and indexing the SEC company-facts document.

use crate::error::{FactsError, Result};
use crate::model::{CompanyFact, FactProvenance, FiscalPeriod};
use crate::periods::PeriodClass;
use chrono::NaiveDate;
use hobart_xbrl::model::QName;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

// SEC company-facts JSON layout:
// { cik, entityName, facts: { taxonomy: { tag: { label, description,
//   units: { unit: [ { start?, end, val, accn, fy, fp, form, filed, frame? } ] } } } } }

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyFactsDocument {
    #[serde(default)]
    cik: Option<u64>,
    #[serde(default)]
    entity_name: Option<String>,
    facts: HashMap<String, HashMap<String, TagFacts>>,
}

#[derive(Debug, Deserialize)]
struct TagFacts {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    units: Option<HashMap<String, Vec<RawValue>>>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    end: String,
    val: f64,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    accn: Option<String>,
    #[serde(default)]
    fy: Option<i32>,
    #[serde(default)]
    fp: Option<String>,
    #[serde(default)]
    form: Option<String>,
    #[serde(default)]
    filed: Option<String>,
}

/// Indexed, immutable store of one entity's aggregated facts.
#[derive(Clone, Debug, Default)]
pub struct CompanyFactStore {
    cik: Option<String>,
    entity_name: Option<String>,
    facts: Vec<CompanyFact>,
    by_concept: HashMap<QName, Vec<usize>>,
    by_local: HashMap<String, Vec<usize>>,
}

impl CompanyFactStore {
    /// Parses the SEC company-facts JSON document.
    pub fn parse_json(bytes: &[u8]) -> Result<Self> {
        let document: CompanyFactsDocument = serde_json::from_slice(bytes)?;

        let mut facts = Vec::new();
        for (taxonomy, tags) in &document.facts {
            for (tag, tag_facts) in tags {
                let Some(units) = &tag_facts.units else {
                    continue;
                };
                let concept = QName::from_parts(taxonomy, tag);
                for (unit, values) in units {
                    for raw in values {
                        let period_end = parse_date(&raw.end, "end")?;
                        let period_start = match &raw.start {
                            Some(start) => Some(parse_date(start, "start")?),
                            None => None,
                        };
                        facts.push(CompanyFact {
                            concept: concept.clone(),
                            label: tag_facts.label.clone(),
                            unit: unit.clone(),
                            value: raw.val,
                            period_start,
                            period_end,
                            fiscal_year: raw.fy,
                            fiscal_period: raw.fp.as_deref().and_then(FiscalPeriod::parse),
                            form: raw.form.clone(),
                            filed: raw
                                .filed
                                .as_deref()
                                .and_then(|f| NaiveDate::parse_from_str(f, "%Y-%m-%d").ok()),
                            accession: raw.accn.clone(),
                            provenance: FactProvenance::Reported,
                        });
                    }
                }
            }
        }

        if facts.is_empty() {
            return Err(FactsError::Empty);
        }
        debug!(count = facts.len(), "company facts loaded");

        Ok(Self::from_facts(
            document.cik.map(|c| format!("{c:0>10}")),
            document.entity_name,
            facts,
        ))
    }

    /// Builds a store from already-materialized facts.
    #[must_use]
    pub fn from_facts(
        cik: Option<String>,
        entity_name: Option<String>,
        facts: Vec<CompanyFact>,
    ) -> Self {
        let mut store = Self {
            cik,
            entity_name,
            facts,
            by_concept: HashMap::new(),
            by_local: HashMap::new(),
        };
        store.rebuild_indexes();
        store
    }

    fn rebuild_indexes(&mut self) {
        self.by_concept.clear();
        self.by_local.clear();
        for (idx, fact) in self.facts.iter().enumerate() {
            self.by_concept
                .entry(fact.concept.clone())
                .or_default()
                .push(idx);
            self.by_local
                .entry(fact.concept.local_name().to_string())
                .or_default()
                .push(idx);
        }
    }

    /// Returns a new store with additional (derived) facts appended.
    #[must_use]
    pub fn with_facts(&self, extra: Vec<CompanyFact>) -> Self {
        let mut facts = self.facts.clone();
        facts.extend(extra);
        Self::from_facts(self.cik.clone(), self.entity_name.clone(), facts)
    }

    /// Zero-padded CIK of the entity.
    #[must_use]
    pub fn cik(&self) -> Option<&str> {
        self.cik.as_deref()
    }

    /// Entity name.
    #[must_use]
    pub fn entity_name(&self) -> Option<&str> {
        self.entity_name.as_deref()
    }

    /// Number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// True when the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterates over all facts.
    pub fn iter(&self) -> impl Iterator<Item = &CompanyFact> {
        self.facts.iter()
    }

    /// All distinct concepts, sorted.
    #[must_use]
    pub fn concepts(&self) -> Vec<&QName> {
        let mut concepts: Vec<&QName> = self.by_concept.keys().collect();
        concepts.sort();
        concepts
    }

    /// All facts for a concept.
    #[must_use]
    pub fn facts_for(&self, concept: &QName) -> Vec<&CompanyFact> {
        self.by_concept
            .get(concept)
            .map(|idxs| idxs.iter().map(|&i| &self.facts[i]).collect())
            .unwrap_or_default()
    }

    /// All facts whose concept local name matches.
    #[must_use]
    pub fn facts_for_local(&self, local: &str) -> Vec<&CompanyFact> {
        self.by_local
            .get(local)
            .map(|idxs| idxs.iter().map(|&i| &self.facts[i]).collect())
            .unwrap_or_default()
    }

    /// Quarterly series for a concept: duration facts classified quarterly
    /// by length (plus derived Q4 entries), one per `(fiscal_year,
    /// quarter)`, amendment duplicates collapsed to the latest-filed entry,
    /// sorted by period end ascending.
    #[must_use]
    pub fn quarterly_series(&self, concept: &QName) -> Vec<&CompanyFact> {
        let candidates = self.facts_for(concept).into_iter().filter(|f| {
            let quarterly_length = f
                .duration_days()
                .is_some_and(|d| PeriodClass::of(d) == PeriodClass::Quarterly);
            let derived = f.provenance == FactProvenance::DerivedQ4;
            (quarterly_length || derived)
                && f.fiscal_period.is_some_and(|fp| fp.quarter().is_some())
        });
        collapse_latest_filed(candidates)
    }

    /// Annual series for a concept: duration facts classified annual by
    /// length, one per fiscal year, sorted by period end ascending.
    #[must_use]
    pub fn annual_series(&self, concept: &QName) -> Vec<&CompanyFact> {
        let candidates = self.facts_for(concept).into_iter().filter(|f| {
            f.duration_days()
                .is_some_and(|d| PeriodClass::of(d) == PeriodClass::Annual)
                && f.fiscal_period == Some(FiscalPeriod::FY)
        });
        collapse_latest_filed(candidates)
    }

    /// Instant series for a concept filtered to a fiscal period tag, one
    /// per fiscal year, sorted by period end ascending.
    #[must_use]
    pub fn instant_series(&self, concept: &QName) -> Vec<&CompanyFact> {
        let candidates = self
            .facts_for(concept)
            .into_iter()
            .filter(|f| f.is_instant() && f.fiscal_period.is_some());
        collapse_latest_filed(candidates)
    }

    /// The deduplicated value for `(concept, fiscal_year, fiscal_period)`.
    #[must_use]
    pub fn value_at(
        &self,
        concept: &QName,
        fiscal_year: i32,
        fiscal_period: FiscalPeriod,
    ) -> Option<&CompanyFact> {
        let mut best: Option<&CompanyFact> = None;
        for fact in self.facts_for(concept) {
            if fact.fiscal_year != Some(fiscal_year) || fact.fiscal_period != Some(fiscal_period) {
                continue;
            }
            // Flow values for a quarter tag must actually span a quarter;
            // FY values must span a year. Instants pass through.
            if let Some(days) = fact.duration_days() {
                let class = PeriodClass::of(days);
                let ok = match fiscal_period {
                    FiscalPeriod::FY => class == PeriodClass::Annual,
                    _ => class == PeriodClass::Quarterly || fact.provenance == FactProvenance::DerivedQ4,
                };
                if !ok {
                    continue;
                }
            }
            if best.is_none_or(|b| fact.filed > b.filed) {
                best = Some(fact);
            }
        }
        best
    }
}

/// Collapses facts sharing `(fiscal_year, fiscal_period)` to the
/// latest-filed entry; output sorted by period end ascending.
///
/// Amendments re-report a period under the same fiscal tag with a different
/// period end; without the collapse the same quarter shows up twice.
fn collapse_latest_filed<'a>(
    facts: impl Iterator<Item = &'a CompanyFact>,
) -> Vec<&'a CompanyFact> {
    let mut best: HashMap<(i32, FiscalPeriod), &CompanyFact> = HashMap::new();
    for fact in facts {
        let (Some(fy), Some(fp)) = (fact.fiscal_year, fact.fiscal_period) else {
            continue;
        };
        best.entry((fy, fp))
            .and_modify(|current| {
                if fact.filed > current.filed {
                    *current = fact;
                }
            })
            .or_insert(fact);
    }
    let mut out: Vec<&CompanyFact> = best.into_values().collect();
    out.sort_by_key(|f| (f.period_end, f.fiscal_year, f.fiscal_period));
    out
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| FactsError::InvalidDate {
        value: value.to_string(),
        field: field.to_string(),
    })
}
