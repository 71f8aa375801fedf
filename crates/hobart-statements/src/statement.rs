//! Rendered statement model: line items, diagnostics and the stitched
//! multi-filing view.

use hobart_xbrl::model::{Balance, PeriodKey, QName, StatementType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display sign preference for a line item.
///
/// The stored fact value is never mutated; `Negated` means renderers should
/// flip the sign for display (negated preferred labels, negative calculation
/// weights).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignPreference {
    /// Display as reported.
    #[default]
    Normal,
    /// Display with the sign flipped.
    Negated,
}

/// One rendered row of a statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Concept behind this row.
    pub concept: QName,

    /// Display label (preferred label, standardized label, or fallback).
    pub label: String,

    /// Indent depth in the presentation tree.
    pub depth: usize,

    /// True for abstract heading rows; all values are `None`.
    pub is_abstract: bool,

    /// True for calculated or labeled totals.
    pub is_total: bool,

    /// True for dimensional breakdown rows.
    pub is_dimensional: bool,

    /// Axis of a dimensional row.
    pub dimension_axis: Option<QName>,

    /// Member of a dimensional row.
    pub dimension_member: Option<QName>,

    /// Values per period; absent periods mean no fact was reported.
    pub values: HashMap<PeriodKey, Option<Decimal>>,

    /// Display unit shared by this row's values.
    pub unit: Option<String>,

    /// True when populated values disagree on their unit.
    pub mixed_units: bool,

    /// Display sign preference.
    pub preferred_sign: SignPreference,

    /// Calculation weight toward the parent, when the role has one.
    pub weight: Option<f64>,

    /// Debit/credit balance from the schema.
    pub balance: Option<Balance>,

    /// Presentation parent concept.
    pub parent_concept: Option<QName>,
}

impl LineItem {
    /// The value rendered for `period`, `None` when missing or abstract.
    #[must_use]
    pub fn value(&self, period: &PeriodKey) -> Option<Decimal> {
        self.values.get(period).copied().flatten()
    }

    /// True when at least one period has a value.
    #[must_use]
    pub fn has_values(&self) -> bool {
        self.values.values().any(Option::is_some)
    }
}

/// A structured problem attached to a rendered or stitched statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StatementDiagnostic {
    /// No presentation role matched the requested statement type.
    NoMatchingStatement {
        /// The statement type that was requested.
        requested: StatementType,
    },
    /// Period selection produced no candidates.
    PeriodSelectionEmpty,
    /// A linkbase was missing, degrading this view.
    MissingLinkbase {
        /// Description of the degradation.
        detail: String,
    },
    /// Two filings reported different values for the same cell.
    StitchConflict {
        /// Concept of the conflicted row.
        concept: QName,
        /// Period of the conflicted cell.
        period: PeriodKey,
        /// The value that was kept.
        kept: Option<Decimal>,
        /// The value that was discarded.
        discarded: Option<Decimal>,
        /// Filing the kept value came from.
        kept_filing: String,
    },
    /// A row mixes units across periods.
    MixedUnits {
        /// Concept of the offending row.
        concept: QName,
    },
    /// Free-form warning.
    Warning {
        /// Warning text.
        message: String,
    },
}

/// Diagnostics attached to every statement result.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Accumulated diagnostics in occurrence order.
    pub entries: Vec<StatementDiagnostic>,
}

impl Diagnostics {
    /// Appends a diagnostic.
    pub fn push(&mut self, diagnostic: StatementDiagnostic) {
        self.entries.push(diagnostic);
    }

    /// True when no diagnostics were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Only the stitch conflicts.
    #[must_use]
    pub fn conflicts(&self) -> Vec<&StatementDiagnostic> {
        self.entries
            .iter()
            .filter(|d| matches!(d, StatementDiagnostic::StitchConflict { .. }))
            .collect()
    }
}

/// A rendered financial statement for one filing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Statement category.
    pub statement_type: Option<StatementType>,

    /// Presentation role the statement was rendered from.
    pub role: Option<String>,

    /// Human-readable title (role definition text).
    pub title: Option<String>,

    /// Identifier of the source filing (accession number or similar),
    /// supplied by the caller for stitching provenance.
    pub filing_id: Option<String>,

    /// Document period end date of the source filing.
    pub period_end_date: Option<chrono::NaiveDate>,

    /// Periods rendered as columns, most recent first.
    pub periods: Vec<PeriodKey>,

    /// Ordered line items.
    pub rows: Vec<LineItem>,

    /// Structured diagnostics.
    pub diagnostics: Diagnostics,
}

impl Statement {
    /// An empty statement carrying only a diagnostic.
    #[must_use]
    pub fn empty(statement_type: StatementType, diagnostic: StatementDiagnostic) -> Self {
        let mut diagnostics = Diagnostics::default();
        diagnostics.push(diagnostic);
        Self {
            statement_type: Some(statement_type),
            diagnostics,
            ..Self::default()
        }
    }

    /// True when the statement has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row for `concept`, non-dimensional rows first.
    #[must_use]
    pub fn row(&self, concept: &QName) -> Option<&LineItem> {
        self.rows
            .iter()
            .find(|r| &r.concept == concept && !r.is_dimensional)
            .or_else(|| self.rows.iter().find(|r| &r.concept == concept))
    }

    /// Rows excluding dimensional breakdowns.
    #[must_use]
    pub fn non_dimensional_rows(&self) -> Vec<&LineItem> {
        self.rows.iter().filter(|r| !r.is_dimensional).collect()
    }
}

/// Where a stitched cell came from.
pub type Provenance = HashMap<(usize, PeriodKey), String>;

/// A multi-filing, multi-period statement produced by the stitcher.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StitchedStatement {
    /// Statement category.
    pub statement_type: Option<StatementType>,

    /// Periods as columns, end date descending; pairwise distinct.
    pub periods: Vec<PeriodKey>,

    /// Merged line items.
    pub rows: Vec<LineItem>,

    /// `(row index, period) -> filing id` for every populated cell.
    pub provenance: Provenance,

    /// Structured diagnostics, including stitch conflicts.
    pub diagnostics: Diagnostics,
}

impl StitchedStatement {
    /// The filing a cell's value came from.
    #[must_use]
    pub fn provenance_of(&self, row: usize, period: &PeriodKey) -> Option<&str> {
        self.provenance.get(&(row, *period)).map(String::as_str)
    }

    /// The row for `concept`.
    #[must_use]
    pub fn row(&self, concept: &QName) -> Option<&LineItem> {
        self.rows.iter().find(|r| &r.concept == concept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn item(concept: &str) -> LineItem {
        LineItem {
            concept: QName::new(concept),
            label: concept.to_string(),
            depth: 0,
            is_abstract: false,
            is_total: false,
            is_dimensional: false,
            dimension_axis: None,
            dimension_member: None,
            values: HashMap::new(),
            unit: None,
            mixed_units: false,
            preferred_sign: SignPreference::Normal,
            weight: None,
            balance: None,
            parent_concept: None,
        }
    }

    #[test]
    fn test_line_item_value_access() {
        let key = PeriodKey::instant(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        let mut row = item("us-gaap:Assets");
        assert!(!row.has_values());

        row.values.insert(key, Some(Decimal::from(42)));
        assert_eq!(row.value(&key), Some(Decimal::from(42)));
        assert!(row.has_values());

        let other = PeriodKey::instant(NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
        assert_eq!(row.value(&other), None);
    }

    #[test]
    fn test_empty_statement_carries_diagnostic() {
        let stmt = Statement::empty(
            StatementType::IncomeStatement,
            StatementDiagnostic::NoMatchingStatement {
                requested: StatementType::IncomeStatement,
            },
        );
        assert!(stmt.is_empty());
        assert_eq!(stmt.diagnostics.entries.len(), 1);
    }
}
