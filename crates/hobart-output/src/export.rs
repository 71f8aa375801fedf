//! CSV and JSON export for statements.

use crate::error::Result;
use hobart_statements::Statement;
use hobart_statements::statement::{LineItem, StitchedStatement};
use hobart_xbrl::model::PeriodKey;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// One flattened export record: a row/period cell with its metadata.
#[derive(Debug, Clone, Serialize)]
struct ExportRecord<'a> {
    concept: &'a str,
    label: &'a str,
    depth: usize,
    is_abstract: bool,
    dimension: bool,
    dimension_axis: Option<String>,
    dimension_member: Option<String>,
    unit: Option<&'a str>,
    period: String,
    value: Option<f64>,
}

fn records<'a>(rows: &'a [LineItem], periods: &[PeriodKey]) -> Vec<ExportRecord<'a>> {
    let mut out = Vec::new();
    for row in rows {
        for period in periods {
            if row.is_abstract {
                continue;
            }
            out.push(ExportRecord {
                concept: row.concept.as_str(),
                label: &row.label,
                depth: row.depth,
                is_abstract: row.is_abstract,
                dimension: row.is_dimensional,
                dimension_axis: row.dimension_axis.as_ref().map(ToString::to_string),
                dimension_member: row.dimension_member.as_ref().map(ToString::to_string),
                unit: row.unit.as_deref(),
                period: period.to_string(),
                value: row.value(period).and_then(|d| d.to_f64()),
            });
        }
    }
    out
}

/// Writes a statement to `path` in the requested format.
pub fn export_statement(
    statement: &Statement,
    path: impl AsRef<Path>,
    format: ExportFormat,
) -> Result<()> {
    export_rows(&statement.rows, &statement.periods, path, format)
}

/// Writes a stitched statement to `path` in the requested format.
pub fn export_stitched(
    statement: &StitchedStatement,
    path: impl AsRef<Path>,
    format: ExportFormat,
) -> Result<()> {
    export_rows(&statement.rows, &statement.periods, path, format)
}

fn export_rows(
    rows: &[LineItem],
    periods: &[PeriodKey],
    path: impl AsRef<Path>,
    format: ExportFormat,
) -> Result<()> {
    let records = records(rows, periods);
    match format {
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_path(path.as_ref())?;
            for record in &records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        ExportFormat::Json => {
            let mut file = File::create(path.as_ref())?;
            serde_json::to_writer(&mut file, &records)?;
            file.flush()?;
        }
        ExportFormat::PrettyJson => {
            let mut file = File::create(path.as_ref())?;
            serde_json::to_writer_pretty(&mut file, &records)?;
            file.flush()?;
        }
    }
    Ok(())
}

/// Serializes a statement to a JSON string.
pub fn statement_to_json(statement: &Statement, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(statement)?
    } else {
        serde_json::to_string(statement)?
    };
    Ok(json)
}
