//! Holdings — share counts per symbol and the portfolio value they imply.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{TableColumn, TableVariant, WideTable};
use crate::stats::round_to;
use crate::valuation::{cagr, simple_growth};

/// Column name of the summed portfolio value.
pub const TOTAL_COLUMN: &str = "Total";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holdings {
    positions: Vec<(String, f64)>,
}

impl Holdings {
    /// Pair symbols with share counts.
    ///
    /// Non-finite or non-positive counts become 1. A short list is padded with
    /// its last count (1 if empty); a long list is trimmed.
    pub fn new<S: AsRef<str>>(symbols: &[S], shares: &[f64]) -> Self {
        let mut counts: Vec<f64> = shares
            .iter()
            .take(symbols.len())
            .map(|&s| if s.is_finite() && s > 0.0 { s } else { 1.0 })
            .collect();
        let pad = counts.last().copied().unwrap_or(1.0);
        counts.resize(symbols.len(), pad);

        Self {
            positions: symbols
                .iter()
                .map(|s| s.as_ref().to_string())
                .zip(counts)
                .collect(),
        }
    }

    pub fn positions(&self) -> &[(String, f64)] {
        &self.positions
    }

    pub fn shares(&self, symbol: &str) -> Option<f64> {
        self.positions
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, n)| *n)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.positions.iter().map(|(s, _)| s.as_str()).collect()
    }
}

/// Position value per held symbol plus a `Total` column.
///
/// Symbols missing from `level` are skipped. The total is `None` on any date
/// where a component is missing; call [`WideTable::backfill`] first to fill
/// leading gaps explicitly.
pub fn portfolio_value(level: &WideTable, holdings: &Holdings) -> WideTable {
    let mut columns: Vec<TableColumn> = holdings
        .positions()
        .iter()
        .filter_map(|(symbol, shares)| {
            let column = level.column(symbol)?;
            Some(TableColumn {
                symbol: symbol.clone(),
                values: column.values.iter().map(|v| v.map(|x| x * shares)).collect(),
            })
        })
        .collect();

    let total = (0..level.height())
        .map(|row| {
            if columns.is_empty() {
                return None;
            }
            columns.iter().map(|c| c.values[row]).sum::<Option<f64>>()
        })
        .collect();
    columns.push(TableColumn {
        symbol: TOTAL_COLUMN.to_string(),
        values: total,
    });

    WideTable::new(TableVariant::Level, level.index().to_vec(), columns)
}

/// A held basket valued over time, with its growth between the first and
/// last dates that have a total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub holdings: Holdings,
    /// Position values plus [`TOTAL_COLUMN`], rounded.
    pub value: WideTable,
    pub start: Option<(NaiveDate, f64)>,
    pub end: Option<(NaiveDate, f64)>,
    /// `end / start - 1`, three places.
    pub growth: Option<f64>,
    /// Annualized over calendar days / 365.25.
    pub cagr: Option<f64>,
}

impl Portfolio {
    /// Value `holdings` over a level table.
    ///
    /// Leading gaps are backfilled first so a symbol that starts trading late
    /// does not blank out the total.
    pub fn value(level: &WideTable, holdings: Holdings, decimals: u32) -> Self {
        let raw = portfolio_value(&level.backfill(), &holdings);
        let total = raw.column(TOTAL_COLUMN);
        let dated = |row: usize| -> Option<(NaiveDate, f64)> {
            Some((raw.index()[row], total?.values[row]?))
        };
        let start = (0..raw.height()).find_map(dated);
        let end = (0..raw.height()).rev().find_map(dated);

        let (growth, annual) = match (start, end) {
            (Some((d0, v0)), Some((d1, v1))) if d1 > d0 => {
                let years = (d1 - d0).num_days() as f64 / 365.25;
                (
                    simple_growth(v0, v1).ok(),
                    cagr(v0, v1, years).ok().map(|g| round_to(g, decimals)),
                )
            }
            _ => (None, None),
        };

        let columns = raw
            .columns()
            .iter()
            .map(|c| TableColumn {
                symbol: c.symbol.clone(),
                values: c.values.iter().map(|v| v.map(|x| round_to(x, decimals))).collect(),
            })
            .collect();

        Self {
            holdings,
            value: WideTable::new(TableVariant::Level, raw.index().to_vec(), columns),
            start: start.map(|(d, v)| (d, round_to(v, decimals))),
            end: end.map(|(d, v)| (d, round_to(v, decimals))),
            growth,
            cagr: annual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_are_normalized() {
        let h = Holdings::new(&["A", "B", "C"], &[2.0, -1.0]);
        assert_eq!(h.shares("A"), Some(2.0));
        assert_eq!(h.shares("B"), Some(1.0));
        // padded with the last normalized count
        assert_eq!(h.shares("C"), Some(1.0));

        let h = Holdings::new(&["A", "B"], &[f64::NAN, 3.0, 9.0]);
        assert_eq!(h.positions().len(), 2);
        assert_eq!(h.shares("A"), Some(1.0));
        assert_eq!(h.shares("B"), Some(3.0));

        let h = Holdings::new(&["A", "B"], &[]);
        assert_eq!(h.shares("B"), Some(1.0));
    }

    #[test]
    fn total_is_missing_when_a_component_is() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let level = WideTable::new(
            TableVariant::Level,
            vec![d(1), d(2)],
            vec![
                TableColumn {
                    symbol: "A".into(),
                    values: vec![None, Some(10.0)],
                },
                TableColumn {
                    symbol: "B".into(),
                    values: vec![Some(5.0), Some(6.0)],
                },
            ],
        );
        let h = Holdings::new(&["A", "B"], &[2.0, 3.0]);

        let value = portfolio_value(&level, &h);
        assert_eq!(value.symbols(), vec!["A", "B", TOTAL_COLUMN]);
        assert_eq!(value.column(TOTAL_COLUMN).unwrap().values, vec![None, Some(38.0)]);

        let filled = portfolio_value(&level.backfill(), &h);
        assert_eq!(
            filled.column(TOTAL_COLUMN).unwrap().values,
            vec![Some(35.0), Some(38.0)]
        );
    }

    #[test]
    fn portfolio_grows_from_first_to_last_total() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let level = WideTable::new(
            TableVariant::Level,
            vec![d(2022, 1, 3), d(2023, 1, 3), d(2024, 1, 3)],
            vec![
                TableColumn {
                    symbol: "A".into(),
                    values: vec![None, Some(10.0), Some(12.0)],
                },
                TableColumn {
                    symbol: "B".into(),
                    values: vec![Some(20.0), Some(22.0), Some(28.0)],
                },
            ],
        );

        let p = Portfolio::value(&level, Holdings::new(&["A", "B"], &[2.0, 1.0]), 4);
        // A's first level is backfilled from 2023
        assert_eq!(p.start, Some((d(2022, 1, 3), 40.0)));
        assert_eq!(p.end, Some((d(2024, 1, 3), 52.0)));
        assert_eq!(p.growth, Some(0.3));
        // 1.3 over 730 days
        let expected = round_to(1.3_f64.powf(365.25 / 730.0) - 1.0, 4);
        assert_eq!(p.cagr, Some(expected));
        assert_eq!(
            p.value.column(TOTAL_COLUMN).unwrap().values,
            vec![Some(40.0), Some(42.0), Some(52.0)]
        );
    }

    #[test]
    fn single_dated_portfolio_has_no_growth() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let level = WideTable::new(
            TableVariant::Level,
            vec![d],
            vec![TableColumn {
                symbol: "A".into(),
                values: vec![Some(5.0)],
            }],
        );
        let p = Portfolio::value(&level, Holdings::new(&["A", "ZZZ"], &[3.0]), 4);
        assert_eq!(p.end, Some((d, 15.0)));
        assert_eq!(p.growth, None);
        assert_eq!(p.cagr, None);
        assert_eq!(p.value.symbols(), vec!["A", TOTAL_COLUMN]);
    }
}
