//! Integration tests for the company-facts pipeline over a realistic
//! company-facts JSON document.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use hobart_facts::{
    CompanyFactStore, FactsOptions, FiscalPeriod, PeriodMode, build_statement, derive_q4, ttm,
};
use hobart_xbrl::{QName, StatementType};

/// Three reported quarters plus the fiscal year, quarterly EPS inputs, and
/// an amended Q2 sharing the fiscal tag with a shifted period end.
const DOC: &str = r#"{
    "cik": 1234567,
    "entityName": "Example Corp",
    "facts": {
        "us-gaap": {
            "Revenues": {
                "label": "Revenues",
                "units": {
                    "USD": [
                        {"start": "2023-01-01", "end": "2023-03-31", "val": 80.0,
                         "fy": 2023, "fp": "Q1", "form": "10-Q", "filed": "2023-05-01"},
                        {"start": "2023-04-01", "end": "2023-06-30", "val": 110.0,
                         "fy": 2023, "fp": "Q2", "form": "10-Q", "filed": "2023-08-01"},
                        {"start": "2023-04-02", "end": "2023-07-01", "val": 112.0,
                         "fy": 2023, "fp": "Q2", "form": "10-Q/A", "filed": "2023-09-20"},
                        {"start": "2023-07-01", "end": "2023-09-30", "val": 120.0,
                         "fy": 2023, "fp": "Q3", "form": "10-Q", "filed": "2023-11-01"},
                        {"start": "2023-01-01", "end": "2023-12-31", "val": 402.0,
                         "fy": 2023, "fp": "FY", "form": "10-K", "filed": "2024-02-01"}
                    ]
                }
            },
            "NetIncomeLoss": {
                "label": "Net Income (Loss)",
                "units": {
                    "USD": [
                        {"start": "2023-01-01", "end": "2023-03-31", "val": 1000.0,
                         "fy": 2023, "fp": "Q1", "form": "10-Q", "filed": "2023-05-01"}
                    ]
                }
            },
            "WeightedAverageNumberOfSharesOutstandingBasic": {
                "label": "Weighted Average Shares, Basic",
                "units": {
                    "shares": [
                        {"start": "2023-01-01", "end": "2023-03-31", "val": 500.0,
                         "fy": 2023, "fp": "Q1", "form": "10-Q", "filed": "2023-05-01"}
                    ]
                }
            },
            "Assets": {
                "label": "Total Assets",
                "units": {
                    "USD": [
                        {"end": "2023-12-31", "val": 900.0, "fy": 2023, "fp": "FY",
                         "form": "10-K", "filed": "2024-02-01"},
                        {"end": "2022-12-31", "val": 850.0, "fy": 2022, "fp": "FY",
                         "form": "10-K", "filed": "2023-02-01"}
                    ]
                }
            }
        }
    }
}"#;

fn store() -> CompanyFactStore {
    CompanyFactStore::parse_json(DOC.as_bytes()).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_amendment_collapse_no_duplicate_quarters() {
    let store = store();
    let revenues = QName::new("us-gaap:Revenues");

    let quarters = store.quarterly_series(&revenues);
    // Q1, Q2, Q3 — the amended Q2 collapses onto one entry.
    assert_eq!(quarters.len(), 3);

    let q2: Vec<_> = quarters
        .iter()
        .filter(|f| f.fiscal_period == Some(FiscalPeriod::Q2))
        .collect();
    assert_eq!(q2.len(), 1);
    // Latest-filed entry wins.
    assert_relative_eq!(q2[0].value, 112.0);
    assert_eq!(q2[0].period_end, date(2023, 7, 1));
}

#[test]
fn test_q4_derivation_balances_fiscal_year() {
    let store = store();
    let derived = derive_q4(&store);

    let q4 = derived
        .iter()
        .find(|f| f.concept == QName::new("us-gaap:Revenues"))
        .unwrap();
    // FY 402 - (80 + 112 + 120) = 90.
    assert_relative_eq!(q4.value, 90.0);
    assert_relative_eq!(80.0 + 112.0 + 120.0 + q4.value, 402.0);
}

#[test]
fn test_ttm_uses_derived_q4() {
    let store = store();
    let augmented = store.with_facts(derive_q4(&store));
    let revenues = QName::new("us-gaap:Revenues");

    let value = ttm(&augmented, &revenues, 2023, FiscalPeriod::Q4);
    assert_eq!(value.value, Some(402.0));
    assert!(!value.has_gaps);
}

#[test]
fn test_ttm_missing_component_yields_null() {
    let store = store();
    // Without the derived Q4 the window has a gap.
    let value = ttm(&store, &QName::new("us-gaap:Revenues"), 2023, FiscalPeriod::Q3);
    assert_eq!(value.value, None);
    assert!(value.has_gaps);
}

#[test]
fn test_income_statement_with_derived_eps() {
    let store = store();
    let stmt = build_statement(
        &store,
        StatementType::IncomeStatement,
        &FactsOptions {
            period: PeriodMode::Quarterly,
            periods: 8,
            ..FactsOptions::default()
        },
    );

    let eps_row = stmt
        .rows
        .iter()
        .find(|r| r.concept == QName::new("us-gaap:EarningsPerShareBasic"))
        .expect("derived EPS row");
    let q1 = hobart_xbrl::PeriodKey::duration(date(2023, 1, 1), date(2023, 3, 31));
    assert_eq!(
        eps_row.value(&q1),
        rust_decimal::Decimal::try_from(2.0).ok()
    );
}

#[test]
fn test_balance_sheet_annual_columns() {
    let store = store();
    let stmt = build_statement(
        &store,
        StatementType::BalanceSheet,
        &FactsOptions {
            period: PeriodMode::Annual,
            periods: 4,
            ..FactsOptions::default()
        },
    );

    assert_eq!(stmt.periods.len(), 2);
    let assets = stmt
        .rows
        .iter()
        .find(|r| r.concept == QName::new("us-gaap:Assets"))
        .unwrap();
    let fy2023 = hobart_xbrl::PeriodKey::instant(date(2023, 12, 31));
    let fy2022 = hobart_xbrl::PeriodKey::instant(date(2022, 12, 31));
    assert_eq!(assets.value(&fy2023), Some(rust_decimal::Decimal::from(900)));
    assert_eq!(assets.value(&fy2022), Some(rust_decimal::Decimal::from(850)));
}

#[test]
fn test_missing_values_are_null_not_zero() {
    let store = store();
    let stmt = build_statement(
        &store,
        StatementType::IncomeStatement,
        &FactsOptions {
            period: PeriodMode::Quarterly,
            periods: 8,
            ..FactsOptions::default()
        },
    );

    // Net income exists only for Q1; other quarter cells must be null.
    let ni = stmt
        .rows
        .iter()
        .find(|r| r.concept == QName::new("us-gaap:NetIncomeLoss"))
        .unwrap();
    let q3 = hobart_xbrl::PeriodKey::duration(date(2023, 7, 1), date(2023, 9, 30));
    assert_eq!(ni.value(&q3), None);
    assert!(ni.values.contains_key(&q3));
}
