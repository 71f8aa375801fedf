//! Duration classification and period-column selection.
//!
//! Annual vs quarterly is decided by duration length alone: a duration is
//! annual iff it spans at least 300 days and quarterly iff it spans 80 to
//! 100 days. Labels and form types are never consulted.

use crate::model::{CompanyFact, FiscalPeriod};
use crate::store::CompanyFactStore;
use chrono::NaiveDate;
use hobart_xbrl::model::PeriodKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Length-based duration classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodClass {
    /// At least 300 days.
    Annual,
    /// 80 to 100 days.
    Quarterly,
    /// Anything else (year-to-date spans, odd stub periods).
    Other,
}

impl PeriodClass {
    /// Classifies a duration length in days.
    #[must_use]
    pub const fn of(days: i64) -> Self {
        match days {
            d if d >= 300 => Self::Annual,
            80..=100 => Self::Quarterly,
            _ => Self::Other,
        }
    }
}

/// Which periods a facts-based statement shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodMode {
    /// Fiscal-year columns.
    #[default]
    Annual,
    /// Fiscal-quarter columns (with derived Q4 where applicable).
    Quarterly,
    /// Trailing-twelve-month columns anchored at fiscal quarters.
    Ttm,
}

/// One statement column: a fiscal period with its resolved calendar dates.
///
/// Columns are keyed by `(fiscal_year, fiscal_period)`; amendments that
/// share the fiscal tag but shift `period_end` collapse into one column with
/// the latest-filed dates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodColumn {
    /// Fiscal year.
    pub fiscal_year: i32,

    /// Fiscal period within the year.
    pub fiscal_period: FiscalPeriod,

    /// Period start for duration columns.
    pub period_start: Option<NaiveDate>,

    /// Period end.
    pub period_end: NaiveDate,
}

impl PeriodColumn {
    /// Column label, e.g. `Q3 2024` or `FY 2023`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.fiscal_period, self.fiscal_year)
    }

    /// The stable period key for this column.
    #[must_use]
    pub fn period_key(&self) -> PeriodKey {
        match self.period_start {
            Some(start) => PeriodKey::duration(start, self.period_end),
            None => PeriodKey::instant(self.period_end),
        }
    }
}

/// Selects up to `limit` period columns for a statement, most recent first.
///
/// With `instants` set (balance-sheet statements), columns come from instant
/// facts; otherwise from duration facts classified by length for the mode.
/// TTM mode anchors on quarterly columns.
#[must_use]
pub fn select_columns(
    store: &CompanyFactStore,
    mode: PeriodMode,
    instants: bool,
    limit: usize,
) -> Vec<PeriodColumn> {
    // (fy, fp) -> winning fact, latest-filed.
    let mut best: HashMap<(i32, FiscalPeriod), &CompanyFact> = HashMap::new();

    for fact in store.iter() {
        let (Some(fy), Some(fp)) = (fact.fiscal_year, fact.fiscal_period) else {
            continue;
        };

        let wanted = if instants {
            fact.is_instant()
                && match mode {
                    PeriodMode::Annual => fp == FiscalPeriod::FY,
                    PeriodMode::Quarterly | PeriodMode::Ttm => fp != FiscalPeriod::FY,
                }
        } else {
            match (mode, fact.duration_days()) {
                (PeriodMode::Annual, Some(days)) => {
                    fp == FiscalPeriod::FY && PeriodClass::of(days) == PeriodClass::Annual
                }
                (PeriodMode::Quarterly | PeriodMode::Ttm, Some(days)) => {
                    fp.quarter().is_some()
                        && (PeriodClass::of(days) == PeriodClass::Quarterly
                            || fact.provenance == crate::model::FactProvenance::DerivedQ4)
                }
                _ => false,
            }
        };
        if !wanted {
            continue;
        }

        best.entry((fy, fp))
            .and_modify(|current| {
                if fact.filed > current.filed {
                    *current = fact;
                }
            })
            .or_insert(fact);
    }

    let mut columns: Vec<PeriodColumn> = best
        .into_iter()
        .map(|((fy, fp), fact)| PeriodColumn {
            fiscal_year: fy,
            fiscal_period: fp,
            period_start: fact.period_start,
            period_end: fact.period_end,
        })
        .collect();
    columns.sort_by(|a, b| {
        b.period_end
            .cmp(&a.period_end)
            .then_with(|| b.fiscal_year.cmp(&a.fiscal_year))
            .then_with(|| b.fiscal_period.cmp(&a.fiscal_period))
    });
    columns.truncate(limit);
    columns
}
