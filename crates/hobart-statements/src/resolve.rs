//! Statement-type to presentation-role resolution.
//!
//! Candidate roles are gathered along three paths (standardized statement
//! names, primary root concept, role-URI pattern), then every candidate is
//! quality-scored before one wins. Scoring on every path matters: a
//! comprehensive-income fragment matches the income-statement URI pattern
//! and will shadow the real income statement if pattern matches bypass
//! scoring.

use hobart_xbrl::classify::{self, normalize};
use hobart_xbrl::model::StatementType;
use hobart_xbrl::taxonomy::Taxonomy;
use tracing::debug;

/// A resolved presentation role with its quality score.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRole {
    /// Role URI.
    pub role: String,

    /// Role definition text from the schema, if declared.
    pub definition: Option<String>,

    /// Final quality score (higher is better).
    pub score: f64,
}

/// Standardized statement names per type, compared against normalized role
/// definitions.
fn standard_names(statement_type: StatementType) -> &'static [&'static str] {
    match statement_type {
        StatementType::BalanceSheet => &[
            "consolidatedbalancesheets",
            "consolidatedbalancesheet",
            "balancesheets",
            "balancesheet",
            "consolidatedstatementsoffinancialposition",
            "statementsoffinancialposition",
            "statementoffinancialposition",
        ],
        StatementType::IncomeStatement => &[
            "consolidatedstatementsofincome",
            "consolidatedstatementsofoperations",
            "consolidatedstatementofincome",
            "consolidatedstatementofoperations",
            "statementsofincome",
            "statementsofoperations",
            "statementsofearnings",
            "incomestatements",
            "incomestatement",
        ],
        StatementType::CashFlow => &[
            "consolidatedstatementsofcashflows",
            "consolidatedstatementofcashflows",
            "statementsofcashflows",
            "statementofcashflows",
            "cashflowstatements",
            "cashflowstatement",
        ],
        StatementType::StatementOfEquity => &[
            "consolidatedstatementsofstockholdersequity",
            "consolidatedstatementsofshareholdersequity",
            "statementsofstockholdersequity",
            "statementsofshareholdersequity",
            "statementsofchangesinequity",
        ],
        StatementType::ComprehensiveIncome => &[
            "consolidatedstatementsofcomprehensiveincome",
            "consolidatedstatementsofcomprehensiveincomeloss",
            "statementsofcomprehensiveincome",
            "statementsofcomprehensiveincomeloss",
            "statementofcomprehensiveincome",
        ],
        StatementType::Cover => &["coverpage", "cover", "documentandentityinformation"],
        StatementType::Notes | StatementType::Other => &[],
    }
}

/// Resolves the best presentation role for a statement type.
///
/// Returns `None` when no role matches on any path.
#[must_use]
pub fn resolve_statement_role(
    taxonomy: &Taxonomy,
    statement_type: StatementType,
) -> Option<ResolvedRole> {
    let mut best: Option<ResolvedRole> = None;

    for role in taxonomy.presentation_roles() {
        let definition = taxonomy.role_definition(role);
        let tree = &taxonomy.presentation[role];
        let roots = tree.root_concepts();

        let Some(base) = match_score(role, definition, &roots, statement_type) else {
            continue;
        };
        let score = base + quality_score(role, definition, statement_type);
        debug!(role, score, %statement_type, "candidate role");

        let candidate = ResolvedRole {
            role: role.to_string(),
            definition: definition.map(str::to_string),
            score,
        };
        // Ties break toward the lexicographically-first role for
        // determinism; presentation_roles() is sorted.
        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(candidate);
        }
    }

    best
}

/// Base score when the role matches on some path, `None` when it matches on
/// none.
fn match_score(
    role: &str,
    definition: Option<&str>,
    roots: &[&hobart_xbrl::model::QName],
    statement_type: StatementType,
) -> Option<f64> {
    let normalized_definition = definition
        .map(|d| normalize(d.rsplit(" - ").next().unwrap_or(d)))
        .unwrap_or_default();
    let normalized_uri = normalize(role.rsplit('/').next().unwrap_or(role));

    // Path 1: standardized statement names on the role definition or URI.
    let by_name = standard_names(statement_type).iter().any(|name| {
        normalized_definition == *name
            || normalized_definition.contains(name)
            || normalized_uri == *name
    });
    if by_name {
        return Some(30.0);
    }

    // Path 2: primary concept at the tree root.
    let by_concept = classify::classify_role("", None, roots) == statement_type;
    if by_concept {
        return Some(20.0);
    }

    // Path 3: URI/definition patterns.
    let by_pattern = classify::classify_role(role, definition, &[]) == statement_type;
    if by_pattern {
        return Some(10.0);
    }

    None
}

/// Quality adjustments applied to every candidate, whichever path matched.
fn quality_score(role: &str, definition: Option<&str>, statement_type: StatementType) -> f64 {
    let text = normalize(&format!("{role} {}", definition.unwrap_or_default()));
    let mut score = 0.0;

    // A comprehensive-income fragment must not win an income-statement
    // request, even when it matched via the shared primary concept.
    if statement_type == StatementType::IncomeStatement && text.contains("comprehensive") {
        score -= 50.0;
    }
    if statement_type == StatementType::ComprehensiveIncome && text.contains("comprehensive") {
        score += 5.0;
    }

    // Parenthetical and detail roles restate fragments of the primary
    // statement.
    if text.contains("parenthetical") {
        score -= 25.0;
    }
    if text.contains("details") {
        score -= 10.0;
    }

    // Prefer the primary consolidated statement.
    if text.contains("consolidated") {
        score += 2.0;
    }

    score
}
