//! Fixed-width text rendering for terminals and logs.

use hobart_statements::Statement;
use hobart_statements::statement::{LineItem, SignPreference, StitchedStatement};
use hobart_xbrl::model::PeriodKey;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

const LABEL_WIDTH: usize = 44;
const VALUE_WIDTH: usize = 18;

/// Renders a statement as a fixed-width text table.
///
/// Abstract rows render as section headings, dimensional rows indent under
/// their parent, and negated sign preferences flip the displayed value. The
/// stored values are untouched.
#[must_use]
pub fn render_text(statement: &Statement) -> String {
    let title = statement
        .title
        .clone()
        .or_else(|| statement.statement_type.map(|t| t.to_string()));
    render_rows(title.as_deref(), &statement.rows, &statement.periods)
}

/// Renders a stitched statement as a fixed-width text table.
#[must_use]
pub fn render_stitched_text(statement: &StitchedStatement) -> String {
    let title = statement.statement_type.map(|t| t.to_string());
    render_rows(title.as_deref(), &statement.rows, &statement.periods)
}

fn render_rows(title: Option<&str>, rows: &[LineItem], periods: &[PeriodKey]) -> String {
    let mut out = String::new();

    if let Some(title) = title {
        out.push_str(title);
        out.push('\n');
    }

    // Header: period end dates, annotated for durations.
    out.push_str(&format!("{:<LABEL_WIDTH$}", ""));
    for period in periods {
        out.push_str(&format!("{:>VALUE_WIDTH$}", period_header(period)));
    }
    out.push('\n');
    out.push_str(&"-".repeat(LABEL_WIDTH + VALUE_WIDTH * periods.len()));
    out.push('\n');

    for row in rows {
        let indent = "  ".repeat(row.depth);
        let label = format!("{indent}{}", row.label);
        let label = if label.chars().count() > LABEL_WIDTH {
            let truncated: String = label.chars().take(LABEL_WIDTH - 1).collect();
            format!("{truncated}…")
        } else {
            label
        };
        out.push_str(&format!("{label:<LABEL_WIDTH$}"));

        if !row.is_abstract {
            for period in periods {
                let cell = row
                    .value(period)
                    .map_or(String::new(), |v| format_value(v, row.preferred_sign));
                out.push_str(&format!("{cell:>VALUE_WIDTH$}"));
            }
        }
        out.push('\n');
    }

    out
}

fn period_header(period: &PeriodKey) -> String {
    match period.duration_days() {
        Some(days) => format!("{} ({days}d)", period.end_date()),
        None => period.end_date().to_string(),
    }
}

/// Formats with thousands separators; negated display signs render in
/// parentheses.
fn format_value(value: Decimal, sign: SignPreference) -> String {
    let displayed = match sign {
        SignPreference::Normal => value,
        SignPreference::Negated => -value,
    };
    let negative = displayed < Decimal::ZERO;
    let abs = displayed.abs();

    let formatted = if abs.fract().is_zero() {
        group_thousands(&abs.trunc().to_string())
    } else {
        let float = abs.to_f64().unwrap_or(0.0);
        format!("{float:.2}")
    };

    if negative {
        format!("({formatted})")
    } else {
        formatted
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hobart_xbrl::model::QName;
    use std::collections::HashMap;

    #[test]
    fn test_format_value() {
        assert_eq!(
            format_value(Decimal::from(1_234_567), SignPreference::Normal),
            "1,234,567"
        );
        assert_eq!(
            format_value(Decimal::from(-500), SignPreference::Normal),
            "(500)"
        );
        // A negated sign preference flips display only.
        assert_eq!(
            format_value(Decimal::from(500), SignPreference::Negated),
            "(500)"
        );
    }

    #[test]
    fn test_render_basic_table() {
        let key = PeriodKey::instant(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        let mut values = HashMap::new();
        values.insert(key, Some(Decimal::from(1000)));

        let statement = Statement {
            title: Some("CONSOLIDATED BALANCE SHEETS".to_string()),
            periods: vec![key],
            rows: vec![LineItem {
                concept: QName::new("us-gaap:Assets"),
                label: "Total assets".to_string(),
                depth: 1,
                is_abstract: false,
                is_total: true,
                is_dimensional: false,
                dimension_axis: None,
                dimension_member: None,
                values,
                unit: Some("USD".to_string()),
                mixed_units: false,
                preferred_sign: SignPreference::Normal,
                weight: None,
                balance: None,
                parent_concept: None,
            }],
            ..Statement::default()
        };

        let text = render_text(&statement);
        assert!(text.contains("CONSOLIDATED BALANCE SHEETS"));
        assert!(text.contains("2023-12-31"));
        assert!(text.contains("1,000"));
        assert!(text.contains("  Total assets"));
    }
}
