//! Rendering and stitching configuration.

use hobart_xbrl::model::StatementType;

/// Options controlling statement rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct StatementOptions {
    /// Include dimensional breakdown rows. `None` applies the per-type
    /// default: on for Statement of Equity and Comprehensive Income, off
    /// otherwise. Every rendered row carries a `dimension` flag either way.
    pub include_dimensions: Option<bool>,

    /// Apply concept standardization to labels and stitch grouping.
    pub standardize: bool,

    /// Upper bound on rendered period columns. `None` applies the per-type
    /// default.
    pub max_periods: Option<usize>,

    /// Label language.
    pub language: String,
}

impl Default for StatementOptions {
    fn default() -> Self {
        Self {
            include_dimensions: None,
            standardize: false,
            max_periods: None,
            language: "en-US".to_string(),
        }
    }
}

impl StatementOptions {
    /// Effective dimensional default for `statement_type`.
    #[must_use]
    pub fn dimensions_for(&self, statement_type: StatementType) -> bool {
        self.include_dimensions.unwrap_or(matches!(
            statement_type,
            StatementType::StatementOfEquity | StatementType::ComprehensiveIncome
        ))
    }

    /// Effective period cap for `statement_type`.
    #[must_use]
    pub fn max_periods_for(&self, statement_type: StatementType) -> usize {
        self.max_periods.unwrap_or(match statement_type {
            StatementType::BalanceSheet => 2,
            _ => 3,
        })
    }
}

/// Options controlling multi-filing stitching.
#[derive(Clone, Debug, PartialEq)]
pub struct StitchOptions {
    /// Prefer latest-filed values over original filings when filings
    /// disagree on a `(concept, period)` cell.
    pub as_amended: bool,

    /// Apply concept standardization when aligning rows across filings.
    pub standardize: bool,

    /// Drop periods whose populated-row count falls below this fraction of
    /// the best column. `None` keeps every period.
    pub min_coverage: Option<f64>,

    /// Overall cap on stitched period columns. `None` keeps every period.
    pub max_periods: Option<usize>,
}

impl Default for StitchOptions {
    fn default() -> Self {
        Self {
            as_amended: false,
            standardize: true,
            min_coverage: None,
            max_periods: None,
        }
    }
}
