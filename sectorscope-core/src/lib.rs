//! SectorScope Core — price series in, aligned tables, summaries and chart
//! requests out.
//!
//! This crate contains the analysis pipeline and its inputs:
//! - Domain types (series, wide tables, summary rows, panels)
//! - Aggregation into level, windowed-change and cumulative-return tables
//! - Top-K ranking by latest cumulative return
//! - Renderer-neutral chart inputs and sinks
//! - Data providers (Yahoo, synthetic), batch fetch, date alignment
//! - GICS universe, classification, holdings and valuation helpers

pub mod aggregate;
pub mod classify;
pub mod data;
pub mod domain;
pub mod error;
pub mod holdings;
pub mod present;
pub mod rank;
pub mod stats;
pub mod universe;
pub mod valuation;

pub use aggregate::{aggregate, AggregateConfig};
pub use classify::{ClassifyBy, Classifier, UniverseClassifier};
pub use error::AnalysisError;
pub use rank::{rank_order, rank_top_k};
