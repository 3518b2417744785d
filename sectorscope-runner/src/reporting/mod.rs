//! Reporting and artifact export pipeline.

pub mod artifacts;
pub mod export;
pub mod reports;

pub use artifacts::{ArtifactManager, ArtifactPaths, RunManifest};
pub use export::save_artifacts;
pub use reports::MarkdownReportGenerator;
