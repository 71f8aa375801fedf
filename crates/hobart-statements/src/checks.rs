//! Advisory consistency checks over rendered statements.
//!
//! These checks only validate what the filing's own calculation linkbase
//! asserts; they never mutate values and never fail a render.

use crate::statement::Statement;
use hobart_xbrl::model::{Decimals, PeriodKey, QName};
use hobart_xbrl::taxonomy::CalculationGraph;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// One calculation inconsistency found by [`check_calculation`].
#[derive(Clone, Debug, PartialEq)]
pub struct CalculationCheck {
    /// Summation parent concept.
    pub parent: QName,
    /// Period the inconsistency occurred in.
    pub period: PeriodKey,
    /// The reported parent value.
    pub reported: Decimal,
    /// The weighted sum of children.
    pub computed: f64,
    /// Tolerance implied by the parent's declared precision.
    pub tolerance: f64,
}

/// Verifies calculation additivity on every rendered period.
///
/// For each calculation parent whose children all have values in a period,
/// checks `|parent - sum(weight_i * child_i)| <= tolerance(decimals)`.
/// Parents with missing children are skipped, not failed.
#[must_use]
pub fn check_calculation(
    statement: &Statement,
    calc: &CalculationGraph,
    default_decimals: Decimals,
) -> Vec<CalculationCheck> {
    let mut failures = Vec::new();

    for row in statement.non_dimensional_rows() {
        let arcs = calc.children_of(&row.concept);
        if arcs.is_empty() {
            continue;
        }

        for period in &statement.periods {
            let Some(reported) = row.value(period) else {
                continue;
            };
            let mut computed = 0.0_f64;
            let mut complete = true;
            for arc in &arcs {
                match statement
                    .rows
                    .iter()
                    .find(|r| r.concept == arc.to && !r.is_dimensional)
                    .and_then(|r| r.value(period))
                {
                    Some(value) => {
                        computed += arc.weight * value.to_f64().unwrap_or(0.0);
                    }
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if !complete {
                continue;
            }

            let tolerance = default_decimals.tolerance();
            let reported_f = reported.to_f64().unwrap_or(0.0);
            if (reported_f - computed).abs() > tolerance {
                failures.push(CalculationCheck {
                    parent: row.concept.clone(),
                    period: *period,
                    reported,
                    computed,
                    tolerance,
                });
            }
        }
    }

    failures
}

/// Advisory balance-sheet equation check: `Assets = Liabilities + Equity`
/// within `tolerance`, on periods where all three are reported
/// non-dimensionally. Returns the periods that violate it.
#[must_use]
pub fn check_balance_sheet_equation(statement: &Statement, tolerance: f64) -> Vec<PeriodKey> {
    let find = |locals: &[&str]| -> Option<&crate::statement::LineItem> {
        statement
            .non_dimensional_rows()
            .into_iter()
            .find(|r| locals.iter().any(|l| r.concept.local_name() == *l))
    };

    let Some(assets) = find(&["Assets"]) else {
        return Vec::new();
    };
    let Some(liabilities) = find(&["Liabilities"]) else {
        return Vec::new();
    };
    let Some(equity) = find(&[
        "StockholdersEquity",
        "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
    ]) else {
        return Vec::new();
    };

    statement
        .periods
        .iter()
        .filter(|period| {
            match (
                assets.value(period),
                liabilities.value(period),
                equity.value(period),
            ) {
                (Some(a), Some(l), Some(e)) => {
                    let a = a.to_f64().unwrap_or(0.0);
                    let l = l.to_f64().unwrap_or(0.0);
                    let e = e.to_f64().unwrap_or(0.0);
                    (a - (l + e)).abs() > tolerance
                }
                _ => false,
            }
        })
        .copied()
        .collect()
}
