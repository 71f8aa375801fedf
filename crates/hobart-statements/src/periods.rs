//! Reporting-period selection for statement columns.
//!
//! Filings routinely carry many comparative periods; a narrow candidate
//! pool silently drops columns. Instant selection considers up to 10 recent
//! instants and duration selection up to 12 recent durations, scoring each
//! by concept coverage and fiscal-calendar fit. Duration selection returns
//! `max_periods * 3` candidates and lets the renderer prune by data quality.

use chrono::Datelike;
use hobart_xbrl::facts::FactStore;
use hobart_xbrl::model::{DocumentInfo, PeriodKey, StatementType};
use tracing::debug;

/// Instant candidates considered before scoring.
const INSTANT_POOL: usize = 10;

/// Duration candidates considered before scoring.
const DURATION_POOL: usize = 12;

/// Core concepts whose presence marks a usable balance-sheet instant.
const BALANCE_SHEET_CORE: &[&str] = &[
    "Assets",
    "AssetsCurrent",
    "Liabilities",
    "LiabilitiesCurrent",
    "LiabilitiesAndStockholdersEquity",
    "StockholdersEquity",
    "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
    "CashAndCashEquivalentsAtCarryingValue",
    "RetainedEarningsAccumulatedDeficit",
];

/// Core concepts whose presence marks a usable flow duration.
const FLOW_CORE: &[&str] = &[
    "Revenues",
    "RevenueFromContractWithCustomerExcludingAssessedTax",
    "CostOfRevenue",
    "GrossProfit",
    "OperatingIncomeLoss",
    "NetIncomeLoss",
    "EarningsPerShareBasic",
    "NetCashProvidedByUsedInOperatingActivities",
    "NetCashProvidedByUsedInInvestingActivities",
    "NetCashProvidedByUsedInFinancingActivities",
    "ComprehensiveIncomeNetOfTax",
];

/// Selects the period columns for a statement type.
///
/// Balance-sheet-like statements get at most `max_periods` instants; flow
/// statements get up to `max_periods * 3` duration candidates for the
/// renderer to prune. Returns an empty list when the store has no usable
/// periods; callers surface that as a diagnostic rather than substituting
/// dates.
#[must_use]
pub fn select_periods(
    store: &FactStore,
    statement_type: StatementType,
    document: &DocumentInfo,
    max_periods: usize,
) -> Vec<PeriodKey> {
    match statement_type {
        StatementType::BalanceSheet | StatementType::Cover => {
            select_instants(store, document, max_periods)
        }
        _ => select_durations(store, document, max_periods * 3),
    }
}

fn select_instants(store: &FactStore, document: &DocumentInfo, max_periods: usize) -> Vec<PeriodKey> {
    let doc_end = document.period_end_date;

    let mut candidates: Vec<PeriodKey> = store
        .period_keys()
        .into_iter()
        .filter(|k| k.duration_days().is_none())
        .filter(|k| doc_end.is_none_or(|end| k.end_date() <= end))
        .collect();
    // period_keys is already end-date descending.
    candidates.truncate(INSTANT_POOL);

    let mut scored: Vec<(f64, PeriodKey)> = candidates
        .into_iter()
        .map(|key| (score_instant(store, document, &key), key))
        .collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.1.end_date().cmp(&a.1.end_date()))
    });

    let mut selected: Vec<PeriodKey> = scored
        .into_iter()
        .take(max_periods)
        .map(|(score, key)| {
            debug!(%key, score, "instant selected");
            key
        })
        .collect();
    hobart_xbrl::model::sort_period_keys_desc(&mut selected);
    selected
}

fn score_instant(store: &FactStore, document: &DocumentInfo, key: &PeriodKey) -> f64 {
    let coverage = BALANCE_SHEET_CORE
        .iter()
        .filter(|local| {
            !store
                .query()
                .by_local_name(local)
                .by_period(*key)
                .non_dimensional()
                .execute()
                .is_empty()
        })
        .count() as f64;

    let mut score = coverage * 10.0;
    if let Some(doc_end) = document.period_end_date {
        let date = key.end_date();
        if date == doc_end {
            score += 8.0;
        } else if (date.ordinal() as i64 - doc_end.ordinal() as i64).abs() <= 7 {
            // Same point in the fiscal calendar (52/53-week years drift a
            // few days).
            score += 3.0;
        }
    }

    // Non-dimensional breadth at this instant, lightly weighted.
    let breadth = store.query().by_period(*key).non_dimensional().count();
    score + (breadth.min(100) as f64) * 0.01
}

fn select_durations(store: &FactStore, document: &DocumentInfo, limit: usize) -> Vec<PeriodKey> {
    let doc_end = document.period_end_date;

    let mut candidates: Vec<PeriodKey> = store
        .period_keys()
        .into_iter()
        .filter(|k| k.duration_days().is_some())
        .filter(|k| doc_end.is_none_or(|end| k.end_date() <= end))
        .collect();
    candidates.truncate(DURATION_POOL);

    let mut scored: Vec<(f64, PeriodKey)> = candidates
        .into_iter()
        .map(|key| (score_duration(store, document, &key), key))
        .filter(|(score, _)| *score > 0.0)
        .collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.1.end_date().cmp(&a.1.end_date()))
    });

    let mut selected: Vec<PeriodKey> = scored
        .into_iter()
        .take(limit)
        .map(|(score, key)| {
            debug!(%key, score, "duration candidate");
            key
        })
        .collect();
    hobart_xbrl::model::sort_period_keys_desc(&mut selected);
    selected
}

fn score_duration(store: &FactStore, document: &DocumentInfo, key: &PeriodKey) -> f64 {
    let coverage = FLOW_CORE
        .iter()
        .filter(|local| {
            !store
                .query()
                .by_local_name(local)
                .by_period(*key)
                .non_dimensional()
                .execute()
                .is_empty()
        })
        .count() as f64;

    let mut score = coverage * 10.0;

    // Duration-length fit: quarterly, annual, and the YTD lengths filings
    // report alongside them.
    let days = key.duration_days().unwrap_or(0);
    score += match days {
        80..=100 => 6.0,
        350..=380 => 6.0,
        170..=190 => 4.0,
        260..=290 => 4.0,
        _ => 0.0,
    };

    if let Some(doc_end) = document.period_end_date {
        let date = key.end_date();
        if date == doc_end {
            score += 8.0;
        } else if date.ordinal().abs_diff(doc_end.ordinal()) <= 7 {
            score += 3.0;
        }
    }

    score
}
