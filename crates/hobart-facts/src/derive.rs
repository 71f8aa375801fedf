//! Derived values: standalone Q4, trailing twelve months, EPS and split
//! adjustment.

use crate::model::{CompanyFact, FactProvenance, FiscalPeriod};
use crate::store::CompanyFactStore;
use chrono::{Days, NaiveDate};
use hobart_xbrl::model::QName;
use std::collections::HashMap;
use tracing::debug;

/// Derives standalone fourth quarters for every duration concept.
///
/// Many filers report Q1-Q3 and the full year but never a standalone Q4.
/// Where all three quarters and the FY value exist for a fiscal year and Q4
/// does not, `Q4 = FY - (Q1 + Q2 + Q3)` is emitted with derivation
/// provenance. Nothing is derived when any component is missing.
#[must_use]
pub fn derive_q4(store: &CompanyFactStore) -> Vec<CompanyFact> {
    let mut derived = Vec::new();

    for concept in store.concepts() {
        // Fiscal years with an annual value for this concept.
        let annual: HashMap<i32, &CompanyFact> = store
            .annual_series(concept)
            .into_iter()
            .filter_map(|f| f.fiscal_year.map(|fy| (fy, f)))
            .collect();
        if annual.is_empty() {
            continue;
        }

        let quarters: HashMap<(i32, FiscalPeriod), &CompanyFact> = store
            .quarterly_series(concept)
            .into_iter()
            .filter_map(|f| {
                match (f.fiscal_year, f.fiscal_period) {
                    (Some(fy), Some(fp)) => Some(((fy, fp), f)),
                    _ => None,
                }
            })
            .collect();

        for (&fy, fy_fact) in &annual {
            if quarters.contains_key(&(fy, FiscalPeriod::Q4)) {
                continue;
            }
            let (Some(q1), Some(q2), Some(q3)) = (
                quarters.get(&(fy, FiscalPeriod::Q1)),
                quarters.get(&(fy, FiscalPeriod::Q2)),
                quarters.get(&(fy, FiscalPeriod::Q3)),
            ) else {
                continue;
            };

            let value = fy_fact.value - (q1.value + q2.value + q3.value);
            debug!(concept = concept.as_str(), fy, value, "derived Q4");
            derived.push(CompanyFact {
                concept: (*concept).clone(),
                label: fy_fact.label.clone(),
                unit: fy_fact.unit.clone(),
                value,
                period_start: q3.period_end.checked_add_days(Days::new(1)),
                period_end: fy_fact.period_end,
                fiscal_year: Some(fy),
                fiscal_period: Some(FiscalPeriod::Q4),
                form: fy_fact.form.clone(),
                filed: fy_fact.filed,
                accession: fy_fact.accession.clone(),
                provenance: FactProvenance::DerivedQ4,
            });
        }
    }

    derived
}

/// A trailing-twelve-month value with its component quarters.
#[derive(Clone, Debug, PartialEq)]
pub struct TtmValue {
    /// The summed value; `None` when any component quarter is missing.
    pub value: Option<f64>,

    /// The component quarters that were found, newest first.
    pub components: Vec<(i32, FiscalPeriod)>,

    /// True when one or more component quarters were missing.
    pub has_gaps: bool,

    /// Period end of the anchoring quarter.
    pub period_end: Option<NaiveDate>,
}

/// Computes the trailing-twelve-month value for a concept at quarter
/// `(fiscal_year, fiscal_period)`.
///
/// The TTM at quarter *q* is the sum of the four consecutive quarterly
/// values ending at *q* (derived Q4 values count). A missing component
/// yields `value: None` with `has_gaps` set; the sum is never computed over
/// a partial window.
#[must_use]
pub fn ttm(
    store: &CompanyFactStore,
    concept: &QName,
    fiscal_year: i32,
    fiscal_period: FiscalPeriod,
) -> TtmValue {
    if fiscal_period.quarter().is_none() {
        return TtmValue {
            value: None,
            components: Vec::new(),
            has_gaps: true,
            period_end: None,
        };
    }

    let quarters: HashMap<(i32, FiscalPeriod), &CompanyFact> = store
        .quarterly_series(concept)
        .into_iter()
        .filter_map(|f| match (f.fiscal_year, f.fiscal_period) {
            (Some(fy), Some(fp)) => Some(((fy, fp), f)),
            _ => None,
        })
        .collect();

    let mut components = Vec::new();
    let mut sum = 0.0;
    let mut has_gaps = false;
    let mut cursor = (fiscal_year, fiscal_period);
    let period_end = quarters.get(&cursor).map(|f| f.period_end);

    for _ in 0..4 {
        match quarters.get(&cursor) {
            Some(fact) => {
                sum += fact.value;
                components.push(cursor);
            }
            None => has_gaps = true,
        }
        let Some(previous) = cursor.1.previous_quarter(cursor.0) else {
            has_gaps = true;
            break;
        };
        cursor = previous;
    }

    TtmValue {
        value: (!has_gaps).then_some(sum),
        components,
        has_gaps,
        period_end,
    }
}

/// Derives quarterly EPS where filers did not report it directly.
///
/// `EPS = net income / weighted-average shares`, basic and diluted each
/// against their matching share series. Only quarters with both components
/// and no reported EPS produce a derived fact.
#[must_use]
pub fn derive_eps(store: &CompanyFactStore) -> Vec<CompanyFact> {
    const SERIES: &[(&str, &str)] = &[
        (
            "EarningsPerShareBasic",
            "WeightedAverageNumberOfSharesOutstandingBasic",
        ),
        (
            "EarningsPerShareDiluted",
            "WeightedAverageNumberOfDilutedSharesOutstanding",
        ),
    ];

    let net_income = QName::new("us-gaap:NetIncomeLoss");
    let income_by_quarter: HashMap<(i32, FiscalPeriod), &CompanyFact> = store
        .quarterly_series(&net_income)
        .into_iter()
        .filter_map(|f| match (f.fiscal_year, f.fiscal_period) {
            (Some(fy), Some(fp)) => Some(((fy, fp), f)),
            _ => None,
        })
        .collect();

    let mut derived = Vec::new();
    for (eps_local, shares_local) in SERIES {
        let eps_concept = QName::from_parts("us-gaap", eps_local);
        let shares_concept = QName::from_parts("us-gaap", shares_local);

        let reported: std::collections::HashSet<(i32, FiscalPeriod)> = store
            .quarterly_series(&eps_concept)
            .into_iter()
            .filter_map(|f| match (f.fiscal_year, f.fiscal_period) {
                (Some(fy), Some(fp)) => Some((fy, fp)),
                _ => None,
            })
            .collect();

        for shares in store.quarterly_series(&shares_concept) {
            let (Some(fy), Some(fp)) = (shares.fiscal_year, shares.fiscal_period) else {
                continue;
            };
            if reported.contains(&(fy, fp)) || shares.value == 0.0 {
                continue;
            }
            let Some(income) = income_by_quarter.get(&(fy, fp)) else {
                continue;
            };

            derived.push(CompanyFact {
                concept: eps_concept.clone(),
                label: None,
                unit: "USD/shares".to_string(),
                value: income.value / shares.value,
                period_start: income.period_start,
                period_end: income.period_end,
                fiscal_year: Some(fy),
                fiscal_period: Some(fp),
                form: income.form.clone(),
                filed: income.filed,
                accession: income.accession.clone(),
                provenance: FactProvenance::DerivedEps,
            });
        }
    }

    derived
}

/// A corporate action affecting per-share series.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitAdjustment {
    /// Date the split took effect.
    pub effective_date: NaiveDate,

    /// Shares issued per pre-split share (2.0 for a 2-for-1 split).
    pub ratio: f64,
}

/// Per-share concepts subject to split adjustment.
const PER_SHARE_LOCALS: &[&str] = &[
    "EarningsPerShareBasic",
    "EarningsPerShareDiluted",
    "CommonStockDividendsPerShareDeclared",
    "CommonStockDividendsPerShareCashPaid",
];

/// Adjusts per-share values reported before each split so the whole series
/// is comparable post-split. Returns adjusted copies; the store's reported
/// values are untouched. With `as_reported`, no adjustment happens and the
/// input facts echo back unchanged.
#[must_use]
pub fn apply_split_adjustments(
    facts: Vec<CompanyFact>,
    splits: &[SplitAdjustment],
    as_reported: bool,
) -> Vec<CompanyFact> {
    if as_reported || splits.is_empty() {
        return facts;
    }

    facts
        .into_iter()
        .map(|mut fact| {
            if !PER_SHARE_LOCALS.contains(&fact.concept.local_name()) {
                return fact;
            }
            let factor: f64 = splits
                .iter()
                .filter(|s| fact.period_end < s.effective_date && s.ratio != 0.0)
                .map(|s| s.ratio)
                .product();
            if factor != 1.0 {
                fact.value /= factor;
                fact.provenance = FactProvenance::SplitAdjusted;
            }
            fact
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn quarter(concept: &str, fy: i32, fp: FiscalPeriod, value: f64) -> CompanyFact {
        let (start, end) = match fp {
            FiscalPeriod::Q1 => (date(fy, 1, 1), date(fy, 3, 31)),
            FiscalPeriod::Q2 => (date(fy, 4, 1), date(fy, 6, 30)),
            FiscalPeriod::Q3 => (date(fy, 7, 1), date(fy, 9, 30)),
            FiscalPeriod::Q4 => (date(fy, 10, 1), date(fy, 12, 31)),
            FiscalPeriod::FY => (date(fy, 1, 1), date(fy, 12, 31)),
        };
        CompanyFact {
            concept: QName::new(concept),
            label: None,
            unit: "USD".to_string(),
            value,
            period_start: Some(start),
            period_end: end,
            fiscal_year: Some(fy),
            fiscal_period: Some(fp),
            form: Some("10-Q".to_string()),
            filed: Some(end.checked_add_days(Days::new(30)).unwrap()),
            accession: None,
            provenance: FactProvenance::Reported,
        }
    }

    #[test]
    fn test_q4_derivation() {
        let store = CompanyFactStore::from_facts(
            None,
            None,
            vec![
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q1, 80.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q2, 110.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q3, 120.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::FY, 400.0),
            ],
        );

        let derived = derive_q4(&store);
        assert_eq!(derived.len(), 1);

        let q4 = &derived[0];
        assert_relative_eq!(q4.value, 90.0);
        assert_eq!(q4.fiscal_period, Some(FiscalPeriod::Q4));
        assert_eq!(q4.provenance, FactProvenance::DerivedQ4);
        assert_eq!(q4.period_start, Some(date(2023, 10, 1)));
        assert_eq!(q4.period_end, date(2023, 12, 31));

        // FY = Q1 + Q2 + Q3 + derived Q4, exactly.
        assert_relative_eq!(80.0 + 110.0 + 120.0 + q4.value, 400.0);
    }

    #[test]
    fn test_q4_not_derived_with_missing_quarter() {
        let store = CompanyFactStore::from_facts(
            None,
            None,
            vec![
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q1, 80.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q3, 120.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::FY, 400.0),
            ],
        );
        assert!(derive_q4(&store).is_empty());
    }

    #[test]
    fn test_q4_not_derived_when_reported() {
        let store = CompanyFactStore::from_facts(
            None,
            None,
            vec![
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q1, 80.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q2, 110.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q3, 120.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q4, 95.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::FY, 405.0),
            ],
        );
        assert!(derive_q4(&store).is_empty());
    }

    #[test]
    fn test_ttm_sums_four_consecutive_quarters() {
        let store = CompanyFactStore::from_facts(
            None,
            None,
            vec![
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q1, 10.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q2, 12.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q3, 15.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q4, 20.0),
            ],
        );

        let value = ttm(&store, &QName::new("us-gaap:Revenues"), 2023, FiscalPeriod::Q4);
        assert_eq!(value.value, Some(57.0));
        assert!(!value.has_gaps);
        assert_eq!(value.components.len(), 4);
        assert_eq!(value.period_end, Some(date(2023, 12, 31)));
    }

    #[test]
    fn test_ttm_crosses_fiscal_years() {
        let store = CompanyFactStore::from_facts(
            None,
            None,
            vec![
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q3, 10.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q4, 12.0),
                quarter("us-gaap:Revenues", 2024, FiscalPeriod::Q1, 15.0),
                quarter("us-gaap:Revenues", 2024, FiscalPeriod::Q2, 20.0),
            ],
        );
        let value = ttm(&store, &QName::new("us-gaap:Revenues"), 2024, FiscalPeriod::Q2);
        assert_eq!(value.value, Some(57.0));
    }

    #[test]
    fn test_ttm_with_gap_is_null() {
        let store = CompanyFactStore::from_facts(
            None,
            None,
            vec![
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q1, 10.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q3, 15.0),
                quarter("us-gaap:Revenues", 2023, FiscalPeriod::Q4, 20.0),
            ],
        );

        let value = ttm(&store, &QName::new("us-gaap:Revenues"), 2023, FiscalPeriod::Q4);
        // A missing component never degrades to a partial sum.
        assert_eq!(value.value, None);
        assert!(value.has_gaps);
    }

    #[test]
    fn test_eps_derivation() {
        let store = CompanyFactStore::from_facts(
            None,
            None,
            vec![
                quarter("us-gaap:NetIncomeLoss", 2023, FiscalPeriod::Q1, 1000.0),
                {
                    let mut f = quarter(
                        "us-gaap:WeightedAverageNumberOfSharesOutstandingBasic",
                        2023,
                        FiscalPeriod::Q1,
                        400.0,
                    );
                    f.unit = "shares".to_string();
                    f
                },
            ],
        );

        let derived = derive_eps(&store);
        assert_eq!(derived.len(), 1);
        assert_relative_eq!(derived[0].value, 2.5);
        assert_eq!(derived[0].provenance, FactProvenance::DerivedEps);
        assert_eq!(
            derived[0].concept,
            QName::new("us-gaap:EarningsPerShareBasic")
        );
    }

    #[test]
    fn test_eps_not_derived_when_reported() {
        let store = CompanyFactStore::from_facts(
            None,
            None,
            vec![
                quarter("us-gaap:NetIncomeLoss", 2023, FiscalPeriod::Q1, 1000.0),
                quarter("us-gaap:EarningsPerShareBasic", 2023, FiscalPeriod::Q1, 2.5),
                quarter(
                    "us-gaap:WeightedAverageNumberOfSharesOutstandingBasic",
                    2023,
                    FiscalPeriod::Q1,
                    400.0,
                ),
            ],
        );
        assert!(derive_eps(&store).is_empty());
    }

    #[test]
    fn test_split_adjustment() {
        let eps = quarter("us-gaap:EarningsPerShareBasic", 2019, FiscalPeriod::Q1, 4.0);
        let revenue = quarter("us-gaap:Revenues", 2019, FiscalPeriod::Q1, 100.0);
        let splits = vec![SplitAdjustment {
            effective_date: date(2020, 8, 31),
            ratio: 4.0,
        }];

        let adjusted = apply_split_adjustments(vec![eps.clone(), revenue.clone()], &splits, false);
        assert_relative_eq!(adjusted[0].value, 1.0);
        assert_eq!(adjusted[0].provenance, FactProvenance::SplitAdjusted);
        // Non-per-share series untouched.
        assert_relative_eq!(adjusted[1].value, 100.0);

        // as_reported bypasses the adjustment entirely.
        let as_reported = apply_split_adjustments(vec![eps, revenue], &splits, true);
        assert_relative_eq!(as_reported[0].value, 4.0);
    }
}
