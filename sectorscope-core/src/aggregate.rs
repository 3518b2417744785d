//! Aggregator — turns per-symbol price series into three aligned wide tables
//! (level, windowed change, cumulative return) and their summaries.
//!
//! Derived series are computed per symbol on that symbol's own observations,
//! then outer-joined on date. A date one symbol lacks is `None` in its column;
//! nothing is filled or zeroed.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::classify::Classifier;
use crate::data::{align_columns, DatedColumn};
use crate::domain::{
    Aggregation, Panel, Series, SummaryRow, SummarySet, TableVariant, WideTable, UNKNOWN_LABEL,
};
use crate::error::AnalysisError;
use crate::stats::{round_to, Describe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Look-back length, in observations, of the windowed change.
    pub window: usize,
    /// Decimal places every derived number is rounded to.
    pub decimals: u32,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            window: 5,
            decimals: 4,
        }
    }
}

impl AggregateConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.window == 0 {
            return Err(AnalysisError::invalid_parameter("window must be at least 1"));
        }
        Ok(())
    }
}

/// Build the three panels for a batch of series.
///
/// Strict: any invalid series fails the whole call. Callers that want
/// skip-and-continue validate each series first.
pub fn aggregate(
    series: &[Series],
    classifier: &dyn Classifier,
    config: &AggregateConfig,
) -> Result<Aggregation, AnalysisError> {
    config.validate()?;
    if series.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let mut seen = HashSet::with_capacity(series.len());
    for s in series {
        s.validate()?;
        if !seen.insert(s.symbol()) {
            return Err(AnalysisError::invalid_series(s.symbol(), "duplicate symbol"));
        }
    }

    let decimals = config.decimals;
    let mut levels = Vec::with_capacity(series.len());
    let mut changes = Vec::with_capacity(series.len());
    let mut returns = Vec::with_capacity(series.len());
    for s in series {
        levels.push(level_column(s, decimals));
        changes.push(windowed_change_column(s, config.window, decimals));
        returns.push(cumulative_return_column(s, decimals));
    }

    let level = align_columns(TableVariant::Level, &levels);
    let windowed_change = align_columns(TableVariant::WindowedChange, &changes);
    let cumulative_return = align_columns(TableVariant::CumulativeReturn, &returns);

    let labels: Vec<String> = series
        .iter()
        .map(|s| label_for(classifier, s.symbol()))
        .collect();

    tracing::debug!(
        symbols = series.len(),
        dates = level.height(),
        window = config.window,
        "aggregated batch"
    );

    let ctx = RowContext {
        labels,
        prices: levels.iter().map(last_present).collect(),
        returns: returns.iter().map(last_present).collect(),
        decimals,
    };

    Ok(Aggregation {
        level: ctx.panel(level),
        windowed_change: ctx.panel(windowed_change),
        cumulative_return: ctx.panel(cumulative_return),
    })
}

/// Per-symbol facts shared by all three summaries, in input order.
struct RowContext {
    labels: Vec<String>,
    prices: Vec<Option<f64>>,
    returns: Vec<Option<f64>>,
    decimals: u32,
}

impl RowContext {
    fn panel(&self, table: WideTable) -> Panel {
        let rows = table
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| {
                SummaryRow::new(
                    &column.symbol,
                    &self.labels[i],
                    self.prices[i],
                    self.returns[i],
                    Describe::of(&column.values).rounded(self.decimals),
                )
            })
            .collect();
        let summary = SummarySet::new(table.variant(), rows);
        Panel { table, summary }
    }
}

fn label_for(classifier: &dyn Classifier, symbol: &str) -> String {
    match classifier.classify(symbol) {
        Some(label) if !label.trim().is_empty() => label,
        _ => UNKNOWN_LABEL.to_string(),
    }
}

fn level_column(s: &Series, decimals: u32) -> DatedColumn {
    DatedColumn {
        symbol: s.symbol().to_string(),
        points: s
            .observations()
            .iter()
            .map(|o| (o.date, Some(round_to(o.value, decimals))))
            .collect(),
    }
}

fn cumulative_return_column(s: &Series, decimals: u32) -> DatedColumn {
    let base = s.first().map(|o| o.value).unwrap_or(f64::NAN);
    DatedColumn {
        symbol: s.symbol().to_string(),
        points: s
            .observations()
            .iter()
            .map(|o| (o.date, ratio_change(o.value, base, decimals)))
            .collect(),
    }
}

fn windowed_change_column(s: &Series, window: usize, decimals: u32) -> DatedColumn {
    let obs = s.observations();
    DatedColumn {
        symbol: s.symbol().to_string(),
        points: obs
            .iter()
            .enumerate()
            .map(|(t, o)| {
                let change = t
                    .checked_sub(window)
                    .and_then(|back| ratio_change(o.value, obs[back].value, decimals));
                (o.date, change)
            })
            .collect(),
    }
}

/// `value / base - 1`, rounded. Undefined for a zero or non-finite base.
fn ratio_change(value: f64, base: f64, decimals: u32) -> Option<f64> {
    if base == 0.0 || !base.is_finite() {
        return None;
    }
    let r = value / base - 1.0;
    r.is_finite().then(|| round_to(r, decimals))
}

fn last_present(column: &DatedColumn) -> Option<f64> {
    column.points.iter().rev().find_map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn series(symbol: &str, values: &[f64]) -> Series {
        let pairs: Vec<(NaiveDate, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (d(i as u32 + 1), *v))
            .collect();
        Series::from_pairs(symbol, &pairs)
    }

    fn tech(symbol: &str) -> Option<String> {
        (symbol != "ZZZZ").then(|| "Tech".to_string())
    }

    #[test]
    fn zero_window_is_rejected() {
        let cfg = AggregateConfig {
            window: 0,
            decimals: 4,
        };
        assert!(matches!(
            aggregate(&[series("A", &[1.0])], &tech, &cfg),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }

    #[test]
    fn duplicate_symbol_is_rejected() {
        let batch = [series("A", &[1.0, 2.0]), series("A", &[3.0])];
        let err = aggregate(&batch, &tech, &AggregateConfig::default()).unwrap_err();
        assert_eq!(err, AnalysisError::invalid_series("A", "duplicate symbol"));
    }

    #[test]
    fn windowed_change_counts_observations_not_days() {
        let cfg = AggregateConfig {
            window: 2,
            decimals: 4,
        };
        let agg = aggregate(&[series("A", &[10.0, 11.0, 12.0, 13.0])], &tech, &cfg).unwrap();
        let col = agg.windowed_change.table.column("A").unwrap();
        assert_eq!(col.values, vec![None, None, Some(0.2), Some(0.1818)]);
    }

    #[test]
    fn interior_zero_base_leaves_gap() {
        let cfg = AggregateConfig {
            window: 1,
            decimals: 4,
        };
        let agg = aggregate(&[series("A", &[1.0, 0.0, 2.0])], &tech, &cfg).unwrap();
        let col = agg.windowed_change.table.column("A").unwrap();
        assert_eq!(col.values, vec![None, Some(-1.0), None]);
    }

    #[test]
    fn blank_label_falls_back_to_unknown() {
        let blank = |_: &str| Some("  ".to_string());
        let agg = aggregate(&[series("A", &[1.0])], &blank, &AggregateConfig::default()).unwrap();
        assert_eq!(agg.level.summary.rows[0].label, UNKNOWN_LABEL);
    }

    #[test]
    fn summaries_share_label_and_latest_values() {
        let agg = aggregate(
            &[series("A", &[10.0, 11.0, 12.0])],
            &tech,
            &AggregateConfig::default(),
        )
        .unwrap();
        for p in agg.panels() {
            let row = &p.summary.rows[0];
            assert_eq!(row.label, "Tech");
            assert_eq!(row.latest_price, Some(12.0));
            assert_eq!(row.latest_return, Some(0.2));
        }
        // Window of 5 exceeds the series, so no windowed statistics
        assert_eq!(agg.windowed_change.summary.rows[0].count, 0);
        assert_eq!(agg.windowed_change.summary.rows[0].mean, None);
    }
}
