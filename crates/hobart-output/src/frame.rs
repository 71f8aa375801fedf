//! Polars DataFrame export.
//!
//! The frame layout is stable: a fixed metadata block followed by one `f64`
//! column per period, named by the period's stable key
//! (`instant:2023-12-31`, `duration:2023-01-01/2023-12-31`). Missing values
//! are nulls, never zeros.

use crate::error::{OutputError, Result};
use hobart_statements::statement::{LineItem, SignPreference, StitchedStatement};
use hobart_statements::Statement;
use hobart_xbrl::facts::FactRow;
use hobart_xbrl::model::{Balance, PeriodKey};
use polars::prelude::*;
use rust_decimal::prelude::ToPrimitive;

/// Builds the tabular view of a rendered statement.
pub fn statement_to_dataframe(statement: &Statement) -> Result<DataFrame> {
    rows_to_dataframe(&statement.rows, &statement.periods)
}

/// Builds the tabular view of a stitched statement.
pub fn stitched_to_dataframe(statement: &StitchedStatement) -> Result<DataFrame> {
    rows_to_dataframe(&statement.rows, &statement.periods)
}

fn rows_to_dataframe(rows: &[LineItem], periods: &[PeriodKey]) -> Result<DataFrame> {
    let concepts: Vec<String> = rows.iter().map(|r| r.concept.to_string()).collect();
    let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
    let depths: Vec<u32> = rows.iter().map(|r| r.depth as u32).collect();
    let abstracts: Vec<bool> = rows.iter().map(|r| r.is_abstract).collect();
    let dimensions: Vec<bool> = rows.iter().map(|r| r.is_dimensional).collect();
    let axes: Vec<Option<String>> = rows
        .iter()
        .map(|r| r.dimension_axis.as_ref().map(ToString::to_string))
        .collect();
    let members: Vec<Option<String>> = rows
        .iter()
        .map(|r| r.dimension_member.as_ref().map(ToString::to_string))
        .collect();
    let balances: Vec<Option<&str>> = rows
        .iter()
        .map(|r| {
            r.balance.map(|b| match b {
                Balance::Debit => "debit",
                Balance::Credit => "credit",
            })
        })
        .collect();
    let weights: Vec<Option<f64>> = rows.iter().map(|r| r.weight).collect();
    let signs: Vec<i32> = rows
        .iter()
        .map(|r| match r.preferred_sign {
            SignPreference::Normal => 1,
            SignPreference::Negated => -1,
        })
        .collect();
    let parents: Vec<Option<String>> = rows
        .iter()
        .map(|r| r.parent_concept.as_ref().map(ToString::to_string))
        .collect();
    let units: Vec<Option<String>> = rows.iter().map(|r| r.unit.clone()).collect();
    let totals: Vec<bool> = rows.iter().map(|r| r.is_total).collect();

    let mut columns: Vec<Column> = vec![
        Series::new("concept".into(), concepts).into(),
        Series::new("label".into(), labels).into(),
        Series::new("depth".into(), depths).into(),
        Series::new("abstract".into(), abstracts).into(),
        Series::new("dimension".into(), dimensions).into(),
        Series::new("dimension_axis".into(), axes).into(),
        Series::new("dimension_member".into(), members).into(),
        Series::new("balance".into(), balances).into(),
        Series::new("weight".into(), weights).into(),
        Series::new("preferred_sign".into(), signs).into(),
        Series::new("total".into(), totals).into(),
        Series::new("parent_concept".into(), parents).into(),
        Series::new("unit".into(), units).into(),
    ];

    for period in periods {
        let values: Vec<Option<f64>> = rows
            .iter()
            .map(|r| r.value(period).and_then(|d| d.to_f64()))
            .collect();
        columns.push(Series::new(period.to_string().into(), values).into());
    }

    DataFrame::new(columns).map_err(OutputError::from)
}

/// Builds the tabular view of a fact-query result.
pub fn fact_rows_to_dataframe(rows: &[FactRow]) -> Result<DataFrame> {
    let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let concepts: Vec<String> = rows.iter().map(|r| r.concept.to_string()).collect();
    let labels: Vec<Option<String>> = rows.iter().map(|r| r.label.clone()).collect();
    let periods: Vec<String> = rows.iter().map(|r| r.period.to_string()).collect();
    let values: Vec<Option<f64>> = rows
        .iter()
        .map(|r| r.value.and_then(|d| d.to_f64()))
        .collect();
    let texts: Vec<Option<String>> = rows.iter().map(|r| r.text.clone()).collect();
    let units: Vec<Option<String>> = rows.iter().map(|r| r.unit.clone()).collect();
    let dimensional: Vec<bool> = rows.iter().map(|r| !r.dimensions.is_empty()).collect();

    DataFrame::new(vec![
        Series::new("id".into(), ids).into(),
        Series::new("concept".into(), concepts).into(),
        Series::new("label".into(), labels).into(),
        Series::new("period".into(), periods).into(),
        Series::new("value".into(), values).into(),
        Series::new("text".into(), texts).into(),
        Series::new("unit".into(), units).into(),
        Series::new("dimension".into(), dimensional).into(),
    ])
    .map_err(OutputError::from)
}
