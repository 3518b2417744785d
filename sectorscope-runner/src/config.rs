//! Serializable analysis configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use sectorscope_core::data::{FetchWindow, Interval, Period, PriceField};
use sectorscope_core::domain::{Frequency, StatementKind, TableVariant};
use sectorscope_core::present::RenderOptions;
use sectorscope_core::universe::Selection;
use sectorscope_core::{AggregateConfig, AnalysisError, ClassifyBy};

/// Unique identifier for an analysis run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(String),

    #[error(transparent)]
    Invalid(#[from] AnalysisError),
}

/// How many symbols survive ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ranking {
    /// Keep every symbol in input order.
    All,
    /// Keep the K best by latest cumulative return.
    Top(usize),
}

impl Default for Ranking {
    fn default() -> Self {
        Self::Top(10)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub period: Period,
    pub interval: Interval,
    pub price_field: PriceField,
}

impl FetchConfig {
    pub fn window(&self) -> FetchWindow {
        FetchWindow::new(self.period, self.interval)
    }
}

/// Financial statements collected for the kept symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementsConfig {
    /// Empty turns collection off.
    pub kinds: Vec<StatementKind>,
    pub frequencies: Vec<Frequency>,
}

impl Default for StatementsConfig {
    fn default() -> Self {
        Self {
            kinds: Vec::new(),
            frequencies: Frequency::ALL.to_vec(),
        }
    }
}

impl StatementsConfig {
    pub fn is_enabled(&self) -> bool {
        !self.kinds.is_empty()
    }

    /// Every (kind, frequency) pair to collect, kinds outermost.
    pub fn requests(&self) -> Vec<(StatementKind, Frequency)> {
        self.kinds
            .iter()
            .flat_map(|k| self.frequencies.iter().map(move |f| (*k, *f)))
            .collect()
    }
}

/// Everything needed to reproduce one analysis run.
///
/// The universe file is not part of the config; it is handed to the run
/// separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Chart title prefix. Derived from the selection when absent.
    pub title: Option<String>,
    pub selection: Selection,
    pub classify_by: ClassifyBy,
    pub ranking: Ranking,
    /// Table drawn as the line chart.
    pub series_plot: TableVariant,
    /// Summary drawn as the scatter.
    pub scatter_plot: TableVariant,
    pub fetch: FetchConfig,
    pub aggregate: AggregateConfig,
    pub render: RenderOptions,
    /// Shares held per selected symbol, in universe order. Empty means no
    /// portfolio is valued.
    pub shares: Vec<f64>,
    pub statements: StatementsConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            title: None,
            selection: Selection::All,
            classify_by: ClassifyBy::SubIndustry,
            ranking: Ranking::default(),
            series_plot: TableVariant::Level,
            scatter_plot: TableVariant::CumulativeReturn,
            fetch: FetchConfig::default(),
            aggregate: AggregateConfig::default(),
            render: RenderOptions::default(),
            shares: Vec::new(),
            statements: StatementsConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.aggregate.validate()?;
        self.render.validate()?;
        if self.ranking == Ranking::Top(0) {
            return Err(AnalysisError::invalid_parameter("top k must be at least 1"));
        }
        let empty_filter = match &self.selection {
            Selection::All => false,
            Selection::Sectors(s) => s.is_empty(),
            Selection::Pairs(p) => p.is_empty(),
        };
        if empty_filter {
            return Err(AnalysisError::invalid_parameter("selection names nothing"));
        }
        if self.statements.is_enabled() && self.statements.frequencies.is_empty() {
            return Err(AnalysisError::invalid_parameter(
                "statements need at least one frequency",
            ));
        }
        Ok(())
    }

    /// Title prefix for charts and reports.
    pub fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| self.selection.describe())
    }

    /// Deterministic hash of this configuration.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_vec(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }
}
