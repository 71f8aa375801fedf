//! Multi-filing statement stitching.
//!
//! Merges per-filing statements of the same type into one multi-period view:
//! exact period-key deduplication, end-date-descending column order, concept
//! alignment (standardized when enabled), row ordering spliced across
//! filings, and restatement conflict resolution with provenance.

use crate::options::StitchOptions;
use crate::standardize::ConceptMapper;
use crate::statement::{
    Diagnostics, LineItem, Provenance, Statement, StatementDiagnostic, StitchedStatement,
};
use hobart_xbrl::model::{PeriodKey, QName, sort_period_keys_desc};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Row identity across filings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct RowKey {
    group: String,
    axis: Option<QName>,
    member: Option<QName>,
}

impl RowKey {
    fn of(row: &LineItem, mapper: Option<&ConceptMapper>) -> Self {
        let group = mapper
            .map_or_else(|| row.concept.to_string(), |m| m.group_key(&row.concept));
        Self {
            group,
            axis: row.dimension_axis.clone(),
            member: row.dimension_member.clone(),
        }
    }
}

/// Stitches per-filing statements into one multi-period statement.
///
/// Input statements should cover the same statement type. Restatement
/// conflicts resolve to the original filing (the one whose document period
/// end sits closest to the period) unless `as_amended` prefers the
/// latest-filed value; either way the losing value is recorded as a
/// [`StatementDiagnostic::StitchConflict`].
#[must_use]
pub fn stitch_statements(statements: &[Statement], options: &StitchOptions) -> StitchedStatement {
    if statements.is_empty() {
        return StitchedStatement::default();
    }

    let mapper = options.standardize.then(ConceptMapper::builtin);
    let mut diagnostics = Diagnostics::default();

    // Most recent filing first: document period end descending, input order
    // as the tiebreak.
    let mut recency: Vec<usize> = (0..statements.len()).collect();
    recency.sort_by(|&a, &b| {
        statements[b]
            .period_end_date
            .cmp(&statements[a].period_end_date)
            .then_with(|| a.cmp(&b))
    });

    let filing_id = |idx: usize| -> String {
        statements[idx]
            .filing_id
            .clone()
            .unwrap_or_else(|| format!("filing-{idx}"))
    };

    // 1. Period union with exact-key dedup.
    let mut periods: Vec<PeriodKey> = Vec::new();
    let mut seen_periods: HashSet<PeriodKey> = HashSet::new();
    for statement in statements {
        for key in &statement.periods {
            if seen_periods.insert(*key) {
                periods.push(*key);
            }
        }
    }
    sort_period_keys_desc(&mut periods);

    // 2. Row order: seed from the most recent filing, splice older filings'
    // unseen rows after their nearest already-placed predecessor.
    let mut order: Vec<RowKey> = Vec::new();
    let mut seen_rows: HashSet<RowKey> = HashSet::new();
    for &idx in &recency {
        let keys: Vec<RowKey> = statements[idx]
            .rows
            .iter()
            .map(|r| RowKey::of(r, mapper.as_ref()))
            .collect();
        for (pos, key) in keys.iter().enumerate() {
            if seen_rows.contains(key) {
                continue;
            }
            // Nearest preceding row of this filing that is already placed.
            let anchor = keys[..pos]
                .iter()
                .rev()
                .find_map(|k| order.iter().position(|o| o == k));
            let insert_at = anchor.map_or(order.len(), |a| a + 1);
            order.insert(insert_at, key.clone());
            seen_rows.insert(key.clone());
        }
    }

    // Row template and label from the most recent filing that has the row.
    let mut templates: HashMap<RowKey, &LineItem> = HashMap::new();
    for &idx in recency.iter().rev() {
        for row in &statements[idx].rows {
            templates.insert(RowKey::of(row, mapper.as_ref()), row);
        }
    }

    // 3. Cell merge with conflict resolution and provenance.
    let mut rows: Vec<LineItem> = Vec::new();
    let mut provenance: Provenance = HashMap::new();

    for key in &order {
        let template = templates[key];
        let mut merged = LineItem {
            values: HashMap::new(),
            ..template.clone()
        };
        if let Some(mapper) = mapper.as_ref()
            && let Some(label) = mapper.canonical_label(&template.concept)
        {
            merged.label = label.to_string();
        }
        let row_index = rows.len();

        for period in &periods {
            // Candidate filings reporting this cell, in input order.
            let mut candidates: Vec<(usize, rust_decimal::Decimal)> = Vec::new();
            for (idx, statement) in statements.iter().enumerate() {
                if let Some(row) = statement
                    .rows
                    .iter()
                    .find(|r| &RowKey::of(r, mapper.as_ref()) == key)
                    && let Some(value) = row.value(period)
                {
                    candidates.push((idx, value));
                }
            }
            let Some(&(winner_idx, winner_value)) = pick_winner(&candidates, statements, period, options)
            else {
                if merged.is_abstract {
                    continue;
                }
                merged.values.insert(*period, None);
                continue;
            };

            merged.values.insert(*period, Some(winner_value));
            provenance.insert((row_index, *period), filing_id(winner_idx));

            for &(other_idx, other_value) in &candidates {
                if other_idx != winner_idx && other_value != winner_value {
                    debug!(
                        concept = merged.concept.as_str(),
                        %period,
                        "stitch conflict"
                    );
                    diagnostics.push(StatementDiagnostic::StitchConflict {
                        concept: merged.concept.clone(),
                        period: *period,
                        kept: Some(winner_value),
                        discarded: Some(other_value),
                        kept_filing: filing_id(winner_idx),
                    });
                }
            }
        }

        rows.push(merged);
    }

    // 4. Data-quality period filtering.
    let periods = filter_periods(&rows, periods, options);
    for row in &mut rows {
        row.values.retain(|k, _| periods.contains(k));
    }

    StitchedStatement {
        statement_type: statements.iter().find_map(|s| s.statement_type),
        periods,
        rows,
        provenance,
        diagnostics,
    }
}

/// Picks the winning candidate for a cell.
fn pick_winner<'a>(
    candidates: &'a [(usize, rust_decimal::Decimal)],
    statements: &[Statement],
    period: &PeriodKey,
    options: &StitchOptions,
) -> Option<&'a (usize, rust_decimal::Decimal)> {
    if candidates.is_empty() {
        return None;
    }
    if options.as_amended {
        // Latest-filed wins: maximize the document period end.
        return candidates.iter().max_by_key(|(idx, _)| statements[*idx].period_end_date);
    }
    // Original filing wins: minimize the distance between the filing's
    // document period end and the period's end.
    candidates.iter().min_by_key(|(idx, _)| {
        statements[*idx]
            .period_end_date
            .map_or(i64::MAX, |end| {
                (end - period.end_date()).num_days().abs()
            })
    })
}

/// Drops sparse columns below the coverage floor and applies the period cap.
fn filter_periods(
    rows: &[LineItem],
    periods: Vec<PeriodKey>,
    options: &StitchOptions,
) -> Vec<PeriodKey> {
    let counts: Vec<(PeriodKey, usize)> = periods
        .iter()
        .map(|key| {
            let populated = rows
                .iter()
                .filter(|r| !r.is_abstract && r.value(key).is_some())
                .count();
            (*key, populated)
        })
        .collect();
    let best = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);

    let mut kept: Vec<PeriodKey> = counts
        .into_iter()
        .filter(|(_, count)| {
            *count > 0
                && options.min_coverage.is_none_or(|floor| {
                    best == 0 || (*count as f64) / (best as f64) >= floor
                })
        })
        .map(|(key, _)| key)
        .collect();

    if let Some(max) = options.max_periods {
        kept.truncate(max);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::SignPreference;
    use chrono::NaiveDate;
    use hobart_xbrl::model::StatementType;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(concept: &str, values: &[(PeriodKey, i64)]) -> LineItem {
        LineItem {
            concept: QName::new(concept),
            label: concept.to_string(),
            depth: 0,
            is_abstract: false,
            is_total: false,
            is_dimensional: false,
            dimension_axis: None,
            dimension_member: None,
            values: values
                .iter()
                .map(|(k, v)| (*k, Some(Decimal::from(*v))))
                .collect(),
            unit: Some("USD".to_string()),
            mixed_units: false,
            preferred_sign: SignPreference::Normal,
            weight: None,
            balance: None,
            parent_concept: None,
        }
    }

    fn statement(
        filing_id: &str,
        doc_end: NaiveDate,
        periods: Vec<PeriodKey>,
        rows: Vec<LineItem>,
    ) -> Statement {
        Statement {
            statement_type: Some(StatementType::IncomeStatement),
            role: None,
            title: None,
            filing_id: Some(filing_id.to_string()),
            period_end_date: Some(doc_end),
            periods,
            rows,
            diagnostics: Diagnostics::default(),
        }
    }

    fn duration(y: i32) -> PeriodKey {
        PeriodKey::duration(date(y, 1, 1), date(y, 12, 31))
    }

    #[test]
    fn test_period_union_dedup_and_order() {
        let s1 = statement(
            "f2024",
            date(2024, 12, 31),
            vec![duration(2024), duration(2023)],
            vec![row("us-gaap:Revenues", &[(duration(2024), 500), (duration(2023), 400)])],
        );
        let s2 = statement(
            "f2023",
            date(2023, 12, 31),
            vec![duration(2023), duration(2022)],
            vec![row("us-gaap:Revenues", &[(duration(2023), 400), (duration(2022), 300)])],
        );

        let stitched = stitch_statements(&[s1, s2], &StitchOptions::default());

        // 2023 appears in both inputs but only once stitched.
        assert_eq!(stitched.periods, vec![duration(2024), duration(2023), duration(2022)]);
        let revenue = stitched.row(&QName::new("us-gaap:Revenues")).unwrap();
        assert_eq!(revenue.value(&duration(2022)), Some(Decimal::from(300)));
    }

    #[test]
    fn test_restatement_prefers_original_by_default() {
        // Both filings report FY2023; the 2023 filing is the original.
        let s_new = statement(
            "f2024",
            date(2024, 12, 31),
            vec![duration(2023)],
            vec![row("us-gaap:Revenues", &[(duration(2023), 105)])],
        );
        let s_orig = statement(
            "f2023",
            date(2023, 12, 31),
            vec![duration(2023)],
            vec![row("us-gaap:Revenues", &[(duration(2023), 100)])],
        );

        let stitched = stitch_statements(&[s_new.clone(), s_orig.clone()], &StitchOptions::default());
        let revenue = stitched.row(&QName::new("us-gaap:Revenues")).unwrap();
        assert_eq!(revenue.value(&duration(2023)), Some(Decimal::from(100)));
        assert_eq!(stitched.provenance_of(0, &duration(2023)), Some("f2023"));
        assert_eq!(stitched.diagnostics.conflicts().len(), 1);

        // as_amended flips the preference to the latest filing.
        let amended = stitch_statements(
            &[s_new, s_orig],
            &StitchOptions {
                as_amended: true,
                ..StitchOptions::default()
            },
        );
        let revenue = amended.row(&QName::new("us-gaap:Revenues")).unwrap();
        assert_eq!(revenue.value(&duration(2023)), Some(Decimal::from(105)));
        assert_eq!(amended.provenance_of(0, &duration(2023)), Some("f2024"));
    }

    #[test]
    fn test_standardized_concept_alignment() {
        // Same economics, different revenue tags across taxonomy vintages.
        let s_new = statement(
            "f2024",
            date(2024, 12, 31),
            vec![duration(2024)],
            vec![row(
                "us-gaap:RevenueFromContractWithCustomerExcludingAssessedTax",
                &[(duration(2024), 500)],
            )],
        );
        let s_old = statement(
            "f2019",
            date(2019, 12, 31),
            vec![duration(2019)],
            vec![row("us-gaap:Revenues", &[(duration(2019), 200)])],
        );

        let stitched = stitch_statements(&[s_new, s_old], &StitchOptions::default());

        // One aligned row carrying both periods.
        assert_eq!(stitched.rows.len(), 1);
        let merged = &stitched.rows[0];
        assert_eq!(merged.value(&duration(2024)), Some(Decimal::from(500)));
        assert_eq!(merged.value(&duration(2019)), Some(Decimal::from(200)));
        // Label comes from the standardization table.
        assert_eq!(merged.label, "Revenue");
    }

    #[test]
    fn test_row_splice_preserves_local_order() {
        let p = duration(2024);
        let q = duration(2023);
        // Recent filing: A, C. Older filing: A, B, C -> B lands between.
        let s_new = statement(
            "f2024",
            date(2024, 12, 31),
            vec![p],
            vec![
                row("a:A", &[(p, 1)]),
                row("a:C", &[(p, 3)]),
            ],
        );
        let s_old = statement(
            "f2023",
            date(2023, 12, 31),
            vec![q],
            vec![
                row("a:A", &[(q, 1)]),
                row("a:B", &[(q, 2)]),
                row("a:C", &[(q, 3)]),
            ],
        );

        let stitched = stitch_statements(
            &[s_new, s_old],
            &StitchOptions {
                standardize: false,
                ..StitchOptions::default()
            },
        );
        let concepts: Vec<&str> = stitched.rows.iter().map(|r| r.concept.as_str()).collect();
        assert_eq!(concepts, vec!["a:A", "a:B", "a:C"]);
    }

    #[test]
    fn test_sparse_period_filter() {
        let p = duration(2024);
        let sparse = duration(2014);
        let s = statement(
            "f2024",
            date(2024, 12, 31),
            vec![p, sparse],
            vec![
                row("a:A", &[(p, 1)]),
                row("a:B", &[(p, 2)]),
                row("a:C", &[(p, 3), (sparse, 1)]),
            ],
        );

        let stitched = stitch_statements(
            &[s],
            &StitchOptions {
                min_coverage: Some(0.5),
                ..StitchOptions::default()
            },
        );
        assert_eq!(stitched.periods, vec![p]);
    }

    #[test]
    fn test_stitched_periods_pairwise_distinct() {
        let s1 = statement(
            "f1",
            date(2024, 12, 31),
            vec![duration(2024), duration(2023)],
            vec![row("a:A", &[(duration(2024), 1), (duration(2023), 1)])],
        );
        let s2 = statement(
            "f2",
            date(2023, 12, 31),
            vec![duration(2023)],
            vec![row("a:A", &[(duration(2023), 1)])],
        );
        let stitched = stitch_statements(&[s1, s2], &StitchOptions::default());

        let mut seen = std::collections::HashSet::new();
        for key in &stitched.periods {
            assert!(seen.insert(*key), "duplicate period {key}");
        }
    }
}
