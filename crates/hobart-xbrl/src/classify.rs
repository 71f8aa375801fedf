//! Coarse presentation-role classification into statement types.
//!
//! Used by fact queries and as the first pass of statement resolution. The
//! ordering of checks matters: comprehensive income must be recognized
//! before plain income, since its role names contain "income" too.

use crate::model::{QName, StatementType};

/// Root abstract concepts that identify a statement type directly.
const PRIMARY_CONCEPTS: &[(&str, StatementType)] = &[
    ("StatementOfFinancialPositionAbstract", StatementType::BalanceSheet),
    ("StatementOfIncomeAndComprehensiveIncomeAbstract", StatementType::ComprehensiveIncome),
    ("ComprehensiveIncomeAbstract", StatementType::ComprehensiveIncome),
    ("IncomeStatementAbstract", StatementType::IncomeStatement),
    ("StatementOfCashFlowsAbstract", StatementType::CashFlow),
    ("StatementOfStockholdersEquityAbstract", StatementType::StatementOfEquity),
    ("StatementOfShareholdersEquityAbstract", StatementType::StatementOfEquity),
    ("CoverAbstract", StatementType::Cover),
    ("CoverPageAbstract", StatementType::Cover),
    ("DocumentAndEntityInformationAbstract", StatementType::Cover),
];

/// Classifies a presentation role from its URI, definition text and root
/// concepts.
#[must_use]
pub fn classify_role(
    role_uri: &str,
    definition: Option<&str>,
    root_concepts: &[&QName],
) -> StatementType {
    // Primary concept at the root is the strongest signal.
    for root in root_concepts {
        for (local, statement_type) in PRIMARY_CONCEPTS {
            if root.local_name() == *local {
                return *statement_type;
            }
        }
    }

    let text = normalize(&format!(
        "{} {}",
        role_uri,
        definition.unwrap_or_default()
    ));

    if text.contains("disclosure") && !text.contains("statement") {
        return StatementType::Notes;
    }
    let last_segment = normalize(role_uri.rsplit('/').next().unwrap_or_default());
    if text.contains("coverpage")
        || text.contains("documentandentityinformation")
        || last_segment == "cover"
    {
        return StatementType::Cover;
    }
    if text.contains("comprehensiveincome") || text.contains("comprehensiveloss") {
        return StatementType::ComprehensiveIncome;
    }
    if text.contains("balancesheet") || text.contains("financialposition") {
        return StatementType::BalanceSheet;
    }
    if text.contains("cashflow") {
        return StatementType::CashFlow;
    }
    if text.contains("stockholdersequity")
        || text.contains("shareholdersequity")
        || text.contains("changesinequity")
        || text.contains("deficitandcomprehensive")
    {
        return StatementType::StatementOfEquity;
    }
    if text.contains("statementsofincome")
        || text.contains("statementofincome")
        || text.contains("statementsofoperations")
        || text.contains("statementofoperations")
        || text.contains("incomestatement")
        || text.contains("statementsofearnings")
        || text.contains("statementofearnings")
    {
        return StatementType::IncomeStatement;
    }

    StatementType::Other
}

/// Lowercases and strips everything but letters, so `"Consolidated
/// Statements of Income (Loss)"` and `"ConsolidatedStatementsOfIncomeLoss"`
/// compare equal.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
