//! Wide table and summary export (CSV/Parquet).

use anyhow::{Context, Result};
use polars::prelude::ParquetWriter;
use std::fs::File;
use std::path::Path;

use sectorscope_core::domain::{StatementTable, SummarySet, WideTable};

use crate::export::{export_statement_csv, export_summary_csv, export_table_csv};

pub fn write_table_csv(path: &Path, table: &WideTable) -> Result<()> {
    let csv = export_table_csv(table)?;
    std::fs::write(path, csv)
        .with_context(|| format!("Failed to write table CSV {}", path.display()))
}

pub fn write_summary_csv(path: &Path, summary: &SummarySet) -> Result<()> {
    let csv = export_summary_csv(summary)?;
    std::fs::write(path, csv)
        .with_context(|| format!("Failed to write summary CSV {}", path.display()))
}

pub fn write_statement_csv(path: &Path, table: &StatementTable) -> Result<()> {
    let csv = export_statement_csv(table)?;
    std::fs::write(path, csv)
        .with_context(|| format!("Failed to write statement CSV {}", path.display()))
}

pub fn write_table_parquet(path: &Path, table: &WideTable) -> Result<()> {
    let mut df = table
        .to_dataframe()
        .context("Failed to build table dataframe")?;

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create table parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("Failed to write table parquet")?;
    Ok(())
}
