//! Run manifest export (JSON).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::runner::{AnalysisRun, SkippedSymbol};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub run_id: String,
    pub title: String,
    pub provider: String,
    pub synthetic: bool,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
    pub selected: usize,
    /// Symbols kept after ranking, best first.
    pub kept: Vec<String>,
    pub skipped: Vec<SkippedSymbol>,
    /// Latest portfolio total, when holdings were configured.
    #[serde(default)]
    pub portfolio_total: Option<f64>,
    /// Keys of the statement tables written, e.g. `financials_annual`.
    #[serde(default)]
    pub statements: Vec<String>,
}

impl RunManifest {
    pub fn from_run(run: &AnalysisRun) -> Self {
        Self {
            schema_version: run.schema_version,
            run_id: run.run_id.clone(),
            title: run.title.clone(),
            provider: run.provider.clone(),
            synthetic: run.is_synthetic(),
            fetched_at: run.fetched_at,
            selected: run.selected.len(),
            kept: run
                .aggregation
                .symbols()
                .into_iter()
                .map(String::from)
                .collect(),
            skipped: run.skipped.clone(),
            portfolio_total: run.portfolio.as_ref().and_then(|p| p.end).map(|(_, v)| v),
            statements: run
                .statements
                .iter()
                .filter(|s| !s.table.is_empty())
                .map(|s| s.table.key())
                .collect(),
        }
    }
}

pub fn write_manifest(path: &Path, run: &AnalysisRun) -> Result<()> {
    let json = serde_json::to_string_pretty(&RunManifest::from_run(run))
        .context("Failed to serialize run manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    Ok(())
}
