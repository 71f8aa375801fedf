//! Statement rendering: presentation-tree walk into ordered line items.

use crate::options::StatementOptions;
use crate::periods::select_periods;
use crate::resolve::resolve_statement_role;
use crate::standardize::ConceptMapper;
use crate::statement::{
    Diagnostics, LineItem, SignPreference, Statement, StatementDiagnostic,
};
use hobart_xbrl::instance::FilingXbrl;
use hobart_xbrl::model::{PeriodKey, QName, StatementType};
use hobart_xbrl::taxonomy::label::roles as label_roles;
use hobart_xbrl::taxonomy::{CalculationGraph, DefinitionGraph};
use std::collections::HashMap;
use tracing::debug;

/// Renders a statement of `statement_type` from a parsed filing.
///
/// Returns an empty statement with a diagnostic when no presentation role
/// matches; degraded views (missing calculation or definition linkbase)
/// render with a diagnostic attached.
#[must_use]
pub fn render_statement(
    filing: &FilingXbrl,
    statement_type: StatementType,
    options: &StatementOptions,
) -> Statement {
    let Some(resolved) = resolve_statement_role(&filing.taxonomy, statement_type) else {
        return Statement::empty(
            statement_type,
            StatementDiagnostic::NoMatchingStatement {
                requested: statement_type,
            },
        );
    };
    debug!(role = resolved.role.as_str(), %statement_type, "rendering statement");

    let include_dimensions = options.dimensions_for(statement_type);
    let max_periods = options.max_periods_for(statement_type);
    let mapper = options.standardize.then(ConceptMapper::builtin);

    let mut diagnostics = Diagnostics::default();
    let candidates = select_periods(&filing.facts, statement_type, &filing.document, max_periods);
    if candidates.is_empty() {
        diagnostics.push(StatementDiagnostic::PeriodSelectionEmpty);
    }

    let calc = filing.taxonomy.calculation.get(&resolved.role);
    if calc.is_none() && !filing.taxonomy.warnings.is_empty() {
        diagnostics.push(StatementDiagnostic::MissingLinkbase {
            detail: format!("no calculation relationships for {}", resolved.role),
        });
    }
    let definition = filing.taxonomy.definition.get(&resolved.role);

    let tree = &filing.taxonomy.presentation[&resolved.role];
    let mut rows: Vec<LineItem> = Vec::new();

    for idx in tree.walk() {
        let node = &tree.nodes[idx];
        let parent_concept = node.parent.map(|p| tree.nodes[p].concept.clone());
        let row = build_row(
            filing,
            calc,
            mapper.as_ref(),
            options,
            node.concept.clone(),
            node.preferred_label.as_deref(),
            node.depth,
            parent_concept,
            &candidates,
        );
        let is_abstract = row.is_abstract;
        rows.push(row);

        if include_dimensions && !is_abstract {
            append_dimension_rows(
                filing,
                options,
                &mut rows,
                &tree.nodes[idx].concept,
                node.depth + 1,
                definition,
                &candidates,
            );
        }
    }

    // Data-quality pruning: drop empty columns, then cap to max_periods by
    // population.
    let periods = prune_periods(&rows, candidates, max_periods);
    for row in &mut rows {
        row.values.retain(|k, _| periods.contains(k));
        if row.mixed_units {
            diagnostics.push(StatementDiagnostic::MixedUnits {
                concept: row.concept.clone(),
            });
        }
    }

    let rows = suppress_empty_abstracts(rows);

    Statement {
        statement_type: Some(statement_type),
        title: resolved
            .definition
            .as_deref()
            .map(|d| d.rsplit(" - ").next().unwrap_or(d).trim().to_string()),
        role: Some(resolved.role),
        filing_id: None,
        period_end_date: filing.document.period_end_date,
        periods,
        rows,
        diagnostics,
    }
}

/// Builds the line item for one presentation node.
#[allow(clippy::too_many_arguments)]
fn build_row(
    filing: &FilingXbrl,
    calc: Option<&CalculationGraph>,
    mapper: Option<&ConceptMapper>,
    options: &StatementOptions,
    concept: QName,
    preferred_label: Option<&str>,
    depth: usize,
    parent_concept: Option<QName>,
    periods: &[PeriodKey],
) -> LineItem {
    // Abstract comes from the schema declaration, never from presentation
    // context.
    let declaration = filing.taxonomy.elements.get(&concept);
    let is_abstract = declaration.is_some_and(|d| d.is_abstract);

    let label = mapper
        .and_then(|m| m.canonical_label(&concept))
        .map(str::to_string)
        .unwrap_or_else(|| {
            filing
                .taxonomy
                .labels
                .resolve(&concept, preferred_label, &options.language)
        });

    let weight = calc.and_then(|c| c.weight_of(&concept));

    let mut values = HashMap::new();
    let mut unit: Option<String> = None;
    let mut mixed_units = false;
    if !is_abstract {
        for period in periods {
            let fact = filing.facts.fact_at(&concept, period);
            values.insert(*period, fact.and_then(|f| f.value));
            if let Some(fact) = fact
                && fact.value.is_some()
                && let Some(u) = filing.facts.unit_of(fact)
            {
                let display = u.display();
                match &unit {
                    None => unit = Some(display),
                    Some(existing) if existing != &display => mixed_units = true,
                    Some(_) => {}
                }
            }
        }
    }

    // Sign preference: negated preferred labels and negative calculation
    // weights flip the displayed sign; the stored value is untouched.
    let negated_label = preferred_label.is_some_and(label_roles::is_negating);
    let preferred_sign = if negated_label || weight.is_some_and(|w| w < 0.0) {
        SignPreference::Negated
    } else {
        SignPreference::Normal
    };

    // Total detection precedence: calculation root, then total-role label,
    // then the label-text heuristic.
    let is_total = calc.is_some_and(|c| c.is_total(&concept))
        || preferred_label.is_some_and(label_roles::is_total)
        || label.to_lowercase().starts_with("total ");

    LineItem {
        concept,
        label,
        depth,
        is_abstract,
        is_total,
        is_dimensional: false,
        dimension_axis: None,
        dimension_member: None,
        values,
        unit,
        mixed_units,
        preferred_sign,
        weight,
        balance: declaration.and_then(|d| d.balance),
        parent_concept,
    }
}

/// Emits one row per populated `(axis, member)` combination under `concept`.
fn append_dimension_rows(
    filing: &FilingXbrl,
    options: &StatementOptions,
    rows: &mut Vec<LineItem>,
    concept: &QName,
    depth: usize,
    definition: Option<&DefinitionGraph>,
    periods: &[PeriodKey],
) {
    // Dimensional expansion is gated on the hypercube governing this
    // concept; without a definition linkbase the gate is open (degraded but
    // useful).
    if let Some(graph) = definition
        && !graph.is_empty()
        && graph.hypercube_for(concept).is_none()
    {
        return;
    }

    // dimension map (as sorted string) -> (axis, member, per-period values, unit)
    #[allow(clippy::type_complexity)]
    let mut combos: HashMap<String, (QName, QName, HashMap<PeriodKey, Option<rust_decimal::Decimal>>, Option<String>)> =
        HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for period in periods {
        for fact in filing.facts.dimensional_facts_at(concept, period) {
            let dims = filing.facts.dimensions_of(fact);
            let Some((axis, member)) = dims.iter().next().map(|(a, m)| (a.clone(), m.clone()))
            else {
                continue;
            };
            let key = dims
                .iter()
                .map(|(a, m)| format!("{a}={m}"))
                .collect::<Vec<_>>()
                .join("|");
            let entry = combos.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                (axis, member, HashMap::new(), None)
            });
            entry.2.insert(*period, fact.value);
            if entry.3.is_none() {
                entry.3 = filing.facts.unit_of(fact).map(|u| u.display());
            }
        }
    }

    for key in order {
        let (axis, member, mut values, unit) = combos.remove(&key).expect("combo recorded");
        for period in periods {
            values.entry(*period).or_insert(None);
        }
        let member_label = filing
            .taxonomy
            .labels
            .resolve(&member, None, &options.language);
        rows.push(LineItem {
            concept: concept.clone(),
            label: member_label,
            depth,
            is_abstract: false,
            is_total: false,
            is_dimensional: true,
            dimension_axis: Some(axis),
            dimension_member: Some(member),
            values,
            unit,
            mixed_units: false,
            preferred_sign: SignPreference::Normal,
            weight: None,
            balance: None,
            parent_concept: Some(concept.clone()),
        });
    }
}

/// Drops empty columns, then keeps the `max_periods` best-populated ones in
/// display order.
fn prune_periods(rows: &[LineItem], candidates: Vec<PeriodKey>, max_periods: usize) -> Vec<PeriodKey> {
    let populated = |key: &PeriodKey| {
        rows.iter()
            .filter(|r| !r.is_abstract && r.value(key).is_some())
            .count()
    };

    let mut counted: Vec<(usize, PeriodKey)> = candidates
        .into_iter()
        .map(|key| (populated(&key), key))
        .filter(|(count, _)| *count > 0)
        .collect();
    counted.sort_by(|a, b| b.0.cmp(&a.0));
    counted.truncate(max_periods);

    let mut periods: Vec<PeriodKey> = counted.into_iter().map(|(_, key)| key).collect();
    hobart_xbrl::model::sort_period_keys_desc(&mut periods);
    periods
}

/// Removes abstract headings whose subtree has no populated rows.
fn suppress_empty_abstracts(rows: Vec<LineItem>) -> Vec<LineItem> {
    let mut keep = vec![true; rows.len()];
    for (i, row) in rows.iter().enumerate() {
        if !row.is_abstract {
            continue;
        }
        let mut has_descendant_values = false;
        for candidate in rows.iter().skip(i + 1) {
            if candidate.depth <= row.depth {
                break;
            }
            if !candidate.is_abstract && candidate.has_values() {
                has_descendant_values = true;
                break;
            }
        }
        keep[i] = has_descendant_values;
    }
    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, keep)| keep.then_some(row))
        .collect()
}
