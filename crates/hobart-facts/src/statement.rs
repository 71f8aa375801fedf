//! Fact-based statement building.
//!
//! Builds the same [`Statement`] shape as the filing path, but from the
//! company-facts store: rows are canonical concepts from the
//! standardization table, columns are fiscal periods, and values flow
//! through Q4/EPS derivation, amendment collapse and optional split
//! adjustment.

use crate::derive::{self, SplitAdjustment};
use crate::model::FiscalPeriod;
use crate::periods::{PeriodColumn, PeriodMode, select_columns};
use crate::store::CompanyFactStore;
use hobart_statements::standardize::ConceptMapper;
use hobart_statements::statement::{
    Diagnostics, LineItem, SignPreference, Statement, StatementDiagnostic,
};
use hobart_xbrl::model::{QName, StatementType};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::collections::HashMap;
use tracing::debug;

/// Options for fact-based statements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FactsOptions {
    /// Period mode: annual, quarterly or TTM columns.
    pub period: PeriodMode,

    /// Maximum number of period columns.
    pub periods: usize,

    /// Skip split adjustment and return values exactly as reported.
    pub as_reported: bool,

    /// Corporate actions to adjust per-share series by (ignored with
    /// `as_reported`).
    pub splits: Vec<SplitAdjustment>,
}

impl FactsOptions {
    fn effective_periods(&self) -> usize {
        if self.periods == 0 { 4 } else { self.periods }
    }
}

/// Canonical row order per statement, by canonical concept key. Canonical
/// concepts absent from these lists append after, alphabetically.
fn canonical_order(statement_type: StatementType) -> &'static [&'static str] {
    match statement_type {
        StatementType::BalanceSheet => &[
            "CashAndEquivalents",
            "AccountsReceivable",
            "Inventory",
            "CurrentAssets",
            "TotalAssets",
            "AccountsPayable",
            "CurrentLiabilities",
            "LongTermDebt",
            "TotalLiabilities",
            "RetainedEarnings",
            "StockholdersEquity",
            "TotalLiabilitiesAndEquity",
        ],
        StatementType::IncomeStatement => &[
            "Revenue",
            "CostOfRevenue",
            "GrossProfit",
            "ResearchAndDevelopment",
            "SellingGeneralAndAdministrative",
            "OperatingExpenses",
            "OperatingIncome",
            "PretaxIncome",
            "IncomeTaxExpense",
            "NetIncome",
            "EpsBasic",
            "EpsDiluted",
            "SharesBasic",
            "SharesDiluted",
        ],
        StatementType::CashFlow => &[
            "DepreciationAndAmortization",
            "StockBasedCompensation",
            "OperatingCashFlow",
            "CapitalExpenditures",
            "InvestingCashFlow",
            "DividendsPaid",
            "FinancingCashFlow",
        ],
        _ => &[],
    }
}

/// Builds a statement of `statement_type` from the company-facts store.
#[must_use]
pub fn build_statement(
    store: &CompanyFactStore,
    statement_type: StatementType,
    options: &FactsOptions,
) -> Statement {
    let mapper = ConceptMapper::builtin();
    let mut diagnostics = Diagnostics::default();

    // Derivations first: standalone Q4, then EPS over the augmented store,
    // then split adjustment over everything.
    let store = store.with_facts(derive_q4(store, statement_type));
    let store = store.with_facts(derive_eps_if_income(&store, statement_type));
    let store = apply_splits(&store, options);

    let instants = statement_type == StatementType::BalanceSheet;
    let columns = select_columns(&store, options.period, instants, options.effective_periods());
    if columns.is_empty() {
        diagnostics.push(StatementDiagnostic::PeriodSelectionEmpty);
    }

    // Concepts that standardize into this statement, grouped by canonical
    // key so tag variants merge into one row.
    let mut by_canonical: HashMap<String, Vec<QName>> = HashMap::new();
    for concept in store.concepts() {
        if mapper.statement_type(concept) == Some(statement_type) {
            by_canonical
                .entry(mapper.group_key(concept))
                .or_default()
                .push(concept.clone());
        }
    }

    let mut canonical_keys: Vec<String> = by_canonical.keys().cloned().collect();
    canonical_keys.sort_by_key(|key| {
        let order = canonical_order(statement_type);
        (
            order.iter().position(|o| o == key).unwrap_or(order.len()),
            key.clone(),
        )
    });

    let mut rows = Vec::new();
    for key in canonical_keys {
        let concepts = &by_canonical[&key];
        let row = build_row(&store, &mapper, concepts, &columns, options);
        if row.has_values() {
            rows.push(row);
        }
    }
    debug!(
        %statement_type,
        rows = rows.len(),
        columns = columns.len(),
        "facts statement built"
    );

    Statement {
        statement_type: Some(statement_type),
        role: None,
        title: None,
        filing_id: store.cik().map(str::to_string),
        period_end_date: columns.first().map(|c| c.period_end),
        periods: columns.iter().map(PeriodColumn::period_key).collect(),
        rows,
        diagnostics,
    }
}

fn derive_q4(store: &CompanyFactStore, statement_type: StatementType) -> Vec<crate::model::CompanyFact> {
    // Q4 derivation only makes sense for flow statements.
    if statement_type == StatementType::BalanceSheet {
        return Vec::new();
    }
    derive::derive_q4(store)
}

fn derive_eps_if_income(
    store: &CompanyFactStore,
    statement_type: StatementType,
) -> Vec<crate::model::CompanyFact> {
    if statement_type != StatementType::IncomeStatement {
        return Vec::new();
    }
    derive::derive_eps(store)
}

fn apply_splits(store: &CompanyFactStore, options: &FactsOptions) -> CompanyFactStore {
    if options.as_reported || options.splits.is_empty() {
        return store.clone();
    }
    let adjusted = derive::apply_split_adjustments(
        store.iter().cloned().collect(),
        &options.splits,
        options.as_reported,
    );
    CompanyFactStore::from_facts(
        store.cik().map(str::to_string),
        store.entity_name().map(str::to_string),
        adjusted,
    )
}

fn build_row(
    store: &CompanyFactStore,
    mapper: &ConceptMapper,
    concepts: &[QName],
    columns: &[PeriodColumn],
    options: &FactsOptions,
) -> LineItem {
    let primary = &concepts[0];
    let label = mapper
        .canonical_label(primary)
        .map_or_else(|| primary.local_name().to_string(), str::to_string);

    let mut values = HashMap::new();
    let mut unit: Option<String> = None;
    for column in columns {
        let mut cell: Option<f64> = None;
        for concept in concepts {
            cell = value_for(store, concept, column, options);
            if cell.is_some() {
                if unit.is_none() {
                    unit = store
                        .value_at(concept, column.fiscal_year, column.fiscal_period)
                        .map(|f| f.unit.clone());
                }
                break;
            }
        }
        values.insert(column.period_key(), cell.and_then(Decimal::from_f64));
    }

    LineItem {
        concept: primary.clone(),
        label,
        depth: 0,
        is_abstract: false,
        is_total: false,
        is_dimensional: false,
        dimension_axis: None,
        dimension_member: None,
        values,
        unit,
        mixed_units: false,
        preferred_sign: SignPreference::Normal,
        weight: None,
        balance: None,
        parent_concept: None,
    }
}

/// The cell value for one concept in one column under the selected mode.
fn value_for(
    store: &CompanyFactStore,
    concept: &QName,
    column: &PeriodColumn,
    options: &FactsOptions,
) -> Option<f64> {
    let is_instant_concept = store
        .facts_for(concept)
        .iter()
        .all(|f| f.is_instant());

    match options.period {
        PeriodMode::Ttm if !is_instant_concept => {
            if column.fiscal_period == FiscalPeriod::FY {
                return None;
            }
            derive::ttm(store, concept, column.fiscal_year, column.fiscal_period).value
        }
        _ => store
            .value_at(concept, column.fiscal_year, column.fiscal_period)
            .map(|f| f.value),
    }
}
