//! Export orchestrator for artifacts and reports.

use anyhow::{Context, Result};
use std::path::Path;

use crate::reporting::artifacts::{ArtifactManager, ArtifactPaths};
use crate::reporting::reports::MarkdownReportGenerator;
use crate::runner::AnalysisRun;

/// Write every artifact of a run plus its markdown report under
/// `output_dir/<run_id>/`.
pub fn save_artifacts(output_dir: impl AsRef<Path>, run: &AnalysisRun) -> Result<ArtifactPaths> {
    let manager = ArtifactManager::new(output_dir)?;
    let mut paths = manager.save_run(run)?;

    let report_path = paths.run_dir.join("report.md");
    let report = MarkdownReportGenerator.generate(run);
    std::fs::write(&report_path, report)
        .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
    paths.report_markdown = Some(report_path);

    Ok(paths)
}
