//! Export — JSON and CSV renderings of analysis results.
//!
//! Provides:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: wide tables (one column per symbol) and summaries in the fixed
//!   column order
//!
//! No-data cells are written empty, never as zero.

use anyhow::{bail, Context, Result};
use sectorscope_core::domain::{StatementTable, SummaryRow, SummarySet, WideTable};

use crate::runner::{AnalysisRun, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisRun` to pretty JSON.
pub fn export_json(run: &AnalysisRun) -> Result<String> {
    serde_json::to_string_pretty(run).context("failed to serialize AnalysisRun to JSON")
}

/// Deserialize an `AnalysisRun` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisRun> {
    let run: AnalysisRun =
        serde_json::from_str(json).context("failed to deserialize AnalysisRun from JSON")?;
    if run.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            run.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(run)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a wide table as CSV: `date` then one column per symbol.
pub fn export_table_csv(table: &WideTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = Vec::with_capacity(table.width() + 1);
    header.push("date");
    header.extend(table.symbols());
    wtr.write_record(&header)?;

    for (row, date) in table.index().iter().enumerate() {
        let mut record = Vec::with_capacity(table.width() + 1);
        record.push(date.to_string());
        for column in table.columns() {
            record.push(column.values[row].map(|v| v.to_string()).unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Export a summary as CSV.
///
/// Columns: symbol, label, latest_price, latest_return, mean, std, min, max
pub fn export_summary_csv(summary: &SummarySet) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(SummaryRow::COLUMNS)?;
    for row in &summary.rows {
        wtr.write_record(row.to_record())?;
    }
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Export a statement table as CSV.
///
/// Two header rows key each column: `symbol` then `period`. One row per
/// line item follows.
pub fn export_statement_csv(table: &StatementTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut symbols = Vec::with_capacity(table.width() + 1);
    symbols.push("symbol".to_string());
    symbols.extend(table.columns.iter().map(|c| c.symbol.clone()));
    wtr.write_record(&symbols)?;

    let mut periods = Vec::with_capacity(table.width() + 1);
    periods.push("period".to_string());
    periods.extend(table.columns.iter().map(|c| c.period.to_string()));
    wtr.write_record(&periods)?;

    for (row, item) in table.items.iter().enumerate() {
        let mut record = Vec::with_capacity(table.width() + 1);
        record.push(item.clone());
        for column in &table.columns {
            record.push(column.values[row].map(|v| v.to_string()).unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
