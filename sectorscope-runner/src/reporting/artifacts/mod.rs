//! Artifact manager for persisting run outputs.

mod manifest;
mod tables;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use sectorscope_core::domain::TableVariant;

use crate::runner::AnalysisRun;

pub use manifest::RunManifest;

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    /// `<variant>.csv`, one per table variant.
    pub table_csvs: Vec<PathBuf>,
    /// `<variant>_summary.csv`, one per table variant.
    pub summary_csvs: Vec<PathBuf>,
    pub level_parquet: PathBuf,
    /// `portfolio_value.csv`, when holdings were configured.
    pub portfolio_csv: Option<PathBuf>,
    /// `statements/<kind>_<frequency>.csv`, one per non-empty statement table.
    pub statement_csvs: Vec<PathBuf>,
    pub report_markdown: Option<PathBuf>,
}

/// Manages writing all artifacts for a run.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .context("Failed to create artifact output directory")?;
        Ok(Self { output_dir })
    }

    /// Directory a run's artifacts land in.
    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.output_dir.join(run_id)
    }

    /// Save complete run artifacts.
    pub fn save_run(&self, run: &AnalysisRun) -> Result<ArtifactPaths> {
        let run_dir = self.run_dir(&run.run_id);
        std::fs::create_dir_all(&run_dir)
            .context("Failed to create run artifact directory")?;

        let manifest_path = run_dir.join("manifest.json");
        manifest::write_manifest(&manifest_path, run)?;

        let mut table_csvs = Vec::with_capacity(3);
        let mut summary_csvs = Vec::with_capacity(3);
        for variant in TableVariant::ALL {
            let panel = run.aggregation.panel(variant);

            let table_csv = run_dir.join(format!("{}.csv", variant.key()));
            tables::write_table_csv(&table_csv, &panel.table)?;
            table_csvs.push(table_csv);

            let summary_csv = run_dir.join(format!("{}_summary.csv", variant.key()));
            tables::write_summary_csv(&summary_csv, &panel.summary)?;
            summary_csvs.push(summary_csv);
        }

        let level_parquet = run_dir.join("level.parquet");
        tables::write_table_parquet(&level_parquet, &run.aggregation.level.table)?;

        let portfolio_csv = match &run.portfolio {
            Some(portfolio) => {
                let path = run_dir.join("portfolio_value.csv");
                tables::write_table_csv(&path, &portfolio.value)?;
                Some(path)
            }
            None => None,
        };

        let mut statement_csvs = Vec::new();
        let filled: Vec<_> = run.statements.iter().filter(|s| !s.table.is_empty()).collect();
        if !filled.is_empty() {
            let dir = run_dir.join("statements");
            std::fs::create_dir_all(&dir).context("Failed to create statements directory")?;
            for set in filled {
                let path = dir.join(format!("{}.csv", set.table.key()));
                tables::write_statement_csv(&path, &set.table)?;
                statement_csvs.push(path);
            }
        }

        tracing::debug!("artifacts written to {}", run_dir.display());

        Ok(ArtifactPaths {
            run_dir,
            manifest: manifest_path,
            table_csvs,
            summary_csvs,
            level_parquet,
            portfolio_csv,
            statement_csvs,
            report_markdown: None,
        })
    }
}
