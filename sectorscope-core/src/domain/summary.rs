//! Per-symbol summary rows and the bundles produced by one aggregation.

use serde::{Deserialize, Serialize};

use super::table::{TableVariant, WideTable};
use crate::stats::Describe;

/// Label used when the classifier has nothing for a symbol.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Descriptive statistics for one symbol plus its label, latest price and
/// latest cumulative return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub symbol: String,
    pub label: String,
    pub latest_price: Option<f64>,
    pub latest_return: Option<f64>,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SummaryRow {
    /// Exported column order. Downstream consumers depend on it.
    pub const COLUMNS: [&'static str; 8] = [
        "symbol",
        "label",
        "latest_price",
        "latest_return",
        "mean",
        "std",
        "min",
        "max",
    ];

    pub fn new(
        symbol: impl Into<String>,
        label: impl Into<String>,
        latest_price: Option<f64>,
        latest_return: Option<f64>,
        stats: Describe,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            label: label.into(),
            latest_price,
            latest_return,
            count: stats.count,
            mean: stats.mean,
            std: stats.std,
            min: stats.min,
            max: stats.max,
        }
    }

    /// Look up a numeric field by its exported column name.
    ///
    /// Returns `None` for non-numeric or unknown names as well as for no data;
    /// use [`SummaryRow::is_numeric_field`] to tell them apart.
    pub fn field(&self, name: &str) -> Option<f64> {
        match name {
            "latest_price" => self.latest_price,
            "latest_return" => self.latest_return,
            "mean" => self.mean,
            "std" => self.std,
            "min" => self.min,
            "max" => self.max,
            _ => None,
        }
    }

    pub fn is_numeric_field(name: &str) -> bool {
        Self::COLUMNS[2..].contains(&name)
    }

    /// Cells in [`SummaryRow::COLUMNS`] order; no data renders as an empty cell.
    pub fn to_record(&self) -> [String; 8] {
        let cell = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        [
            self.symbol.clone(),
            self.label.clone(),
            cell(self.latest_price),
            cell(self.latest_return),
            cell(self.mean),
            cell(self.std),
            cell(self.min),
            cell(self.max),
        ]
    }
}

/// Ordered summary rows for one table variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySet {
    pub variant: TableVariant,
    pub rows: Vec<SummaryRow>,
}

impl SummarySet {
    pub fn new(variant: TableVariant, rows: Vec<SummaryRow>) -> Self {
        Self { variant, rows }
    }

    pub fn row(&self, symbol: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.symbol == symbol)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.symbol.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only the named symbols, in the order given.
    pub fn select<S: AsRef<str>>(&self, symbols: &[S]) -> SummarySet {
        let rows = symbols
            .iter()
            .filter_map(|s| self.row(s.as_ref()).cloned())
            .collect();
        SummarySet::new(self.variant, rows)
    }
}

/// A wide table together with its summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub table: WideTable,
    pub summary: SummarySet,
}

impl Panel {
    pub fn select<S: AsRef<str>>(&self, symbols: &[S]) -> Panel {
        Panel {
            table: self.table.select(symbols),
            summary: self.summary.select(symbols),
        }
    }
}

/// The three panels produced together for one symbol universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub level: Panel,
    pub windowed_change: Panel,
    pub cumulative_return: Panel,
}

impl Aggregation {
    pub fn panel(&self, variant: TableVariant) -> &Panel {
        match variant {
            TableVariant::Level => &self.level,
            TableVariant::WindowedChange => &self.windowed_change,
            TableVariant::CumulativeReturn => &self.cumulative_return,
        }
    }

    pub fn panels(&self) -> [&Panel; 3] {
        [&self.level, &self.windowed_change, &self.cumulative_return]
    }

    /// Symbols in summary order (rank order after ranking).
    pub fn symbols(&self) -> Vec<&str> {
        self.cumulative_return.summary.symbols()
    }

    /// Narrow every panel to the named symbols, in the order given.
    pub fn select<S: AsRef<str>>(&self, symbols: &[S]) -> Aggregation {
        Aggregation {
            level: self.level.select(symbols),
            windowed_change: self.windowed_change.select(symbols),
            cumulative_return: self.cumulative_return.select(symbols),
        }
    }
}
