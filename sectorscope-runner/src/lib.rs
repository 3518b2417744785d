//! SectorScope Runner — analysis orchestration, configuration and artifacts.
//!
//! This crate builds on `sectorscope-core` to provide:
//! - TOML run configuration with content-addressed run ids
//! - The end-to-end pipeline: select, fetch, validate, aggregate, rank, render
//! - Portfolio valuation and financial statement collection
//! - CSV / JSON / Parquet export and markdown reports

pub mod config;
pub mod export;
pub mod reporting;
pub mod runner;

pub use config::{AnalysisConfig, ConfigError, FetchConfig, Ranking, RunId, StatementsConfig};
pub use export::{
    export_json, export_statement_csv, export_summary_csv, export_table_csv, import_json,
};
pub use reporting::{save_artifacts, ArtifactManager, ArtifactPaths, RunManifest};
pub use runner::{
    run_analysis, AnalysisRun, RunError, SkippedSymbol, StatementSet, SCHEMA_VERSION,
};
