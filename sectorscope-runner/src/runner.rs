//! Analysis runner — selection, fetch, validation, aggregation, ranking and
//! rendering for one configured run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sectorscope_core::data::{collect_statements, fetch_batch, DataProvider, DownloadProgress};
use sectorscope_core::domain::{Aggregation, Frequency, Series, StatementKind, StatementTable};
use sectorscope_core::holdings::{Holdings, Portfolio};
use sectorscope_core::present::{render, ChartSink, RenderError};
use sectorscope_core::universe::Universe;
use sectorscope_core::{aggregate, rank_top_k, AnalysisError, UniverseClassifier};

use crate::config::{AnalysisConfig, ConfigError, Ranking, RunId};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("no usable series: {selected} selected, {skipped} skipped")]
    NothingUsable { selected: usize, skipped: usize },
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// A symbol left out of the analysis, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

/// One collected statement table and the symbols that had none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSet {
    pub kind: StatementKind,
    pub frequency: Frequency,
    pub table: StatementTable,
    pub skipped: Vec<SkippedSymbol>,
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub title: String,
    pub config: AnalysisConfig,
    /// Name of the provider the series came from.
    pub provider: String,
    /// Symbols the selection matched, in universe order.
    pub selected: Vec<String>,
    pub skipped: Vec<SkippedSymbol>,
    /// Ranked (or full) panels.
    pub aggregation: Aggregation,
    /// Value of the configured holdings over the full level table.
    #[serde(default)]
    pub portfolio: Option<Portfolio>,
    #[serde(default)]
    pub statements: Vec<StatementSet>,
    pub fetched_at: DateTime<Utc>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl AnalysisRun {
    pub fn is_synthetic(&self) -> bool {
        self.provider == "synthetic"
    }
}

/// Run one analysis end to end.
///
/// Symbols the provider cannot deliver, and series that fail validation, are
/// skipped with a warning and recorded in [`AnalysisRun::skipped`]. The run
/// fails only when nothing usable remains.
pub fn run_analysis(
    config: &AnalysisConfig,
    universe: &Universe,
    provider: &dyn DataProvider,
    sink: &mut dyn ChartSink,
    progress: &dyn DownloadProgress,
) -> Result<AnalysisRun, RunError> {
    config.validate()?;
    let run_id = config.run_id()?;
    let title = config.title();

    let selected: Vec<String> = universe
        .select(&config.selection)
        .into_iter()
        .map(|c| c.symbol.clone())
        .collect();
    if selected.is_empty() {
        return Err(AnalysisError::EmptyInput.into());
    }
    tracing::info!(
        run_id = %&run_id[..12],
        symbols = selected.len(),
        provider = provider.name(),
        "starting analysis: {title}"
    );

    let fetched_at = Utc::now();
    let batch = fetch_batch(provider, &selected, &config.fetch.window(), progress);

    let mut skipped: Vec<SkippedSymbol> = batch
        .failures
        .iter()
        .map(|(symbol, e)| SkippedSymbol {
            symbol: symbol.clone(),
            reason: AnalysisError::data_unavailable(symbol, e).to_string(),
        })
        .collect();

    let usable: Vec<Series> = batch
        .series
        .into_iter()
        .filter(|s| match s.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("skipping {}: {e}", s.symbol());
                skipped.push(SkippedSymbol {
                    symbol: s.symbol().to_string(),
                    reason: e.to_string(),
                });
                false
            }
        })
        .collect();

    if usable.is_empty() {
        return Err(RunError::NothingUsable {
            selected: selected.len(),
            skipped: skipped.len(),
        });
    }

    let classifier = UniverseClassifier::new(universe, config.classify_by);
    let full = aggregate(&usable, &classifier, &config.aggregate)?;

    let portfolio = (!config.shares.is_empty()).then(|| {
        let holdings = Holdings::new(&selected, &config.shares);
        Portfolio::value(&full.level.table, holdings, config.aggregate.decimals)
    });

    let aggregation = match config.ranking {
        Ranking::All => full,
        Ranking::Top(k) => rank_top_k(&full, k)?,
    };

    let kept: Vec<String> = aggregation.symbols().into_iter().map(String::from).collect();
    let statements: Vec<StatementSet> = config
        .statements
        .requests()
        .into_iter()
        .map(|(kind, frequency)| {
            let batch = collect_statements(provider, &kept, kind, frequency, progress);
            let skipped = batch
                .failures
                .iter()
                .map(|(symbol, e)| {
                    tracing::warn!("no {frequency} {kind} for {symbol}: {e}");
                    SkippedSymbol {
                        symbol: symbol.clone(),
                        reason: e.to_string(),
                    }
                })
                .collect();
            StatementSet {
                kind,
                frequency,
                table: batch.table,
                skipped,
            }
        })
        .collect();

    render(
        sink,
        &aggregation.panel(config.series_plot).table,
        &aggregation.panel(config.scatter_plot).summary,
        &config.render,
        &title,
    )?;

    tracing::info!(
        kept = aggregation.symbols().len(),
        skipped = skipped.len(),
        statements = statements.len(),
        "analysis complete"
    );

    Ok(AnalysisRun {
        schema_version: SCHEMA_VERSION,
        run_id,
        title,
        config: config.clone(),
        provider: provider.name().to_string(),
        selected,
        skipped,
        aggregation,
        portfolio,
        statements,
        fetched_at,
    })
}
