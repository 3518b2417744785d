//! Shared fixtures: a scripted provider, a recording sink and a tiny universe.

#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;

use sectorscope_core::data::{DataError, DataProvider, FetchWindow};
use sectorscope_core::domain::{Frequency, Series, Statement, StatementKind};
use sectorscope_core::present::{ChartSink, LineChart, RenderError, ScatterChart};
use sectorscope_core::universe::{Constituent, Universe};

pub fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
}

/// Serves fixed series; unknown symbols are not found.
///
/// Statements: symbols marked as funds are not equities, and every other
/// series symbol reports a net income of its last price per period.
#[derive(Default)]
pub struct ScriptedProvider {
    pub series: HashMap<String, Vec<(NaiveDate, f64)>>,
    pub funds: Vec<String>,
}

impl ScriptedProvider {
    /// Add a series on consecutive days starting at `d(1)`.
    pub fn with(mut self, symbol: &str, values: &[f64]) -> Self {
        let pairs = values
            .iter()
            .enumerate()
            .map(|(i, v)| (d(i as u32 + 1), *v))
            .collect();
        self.series.insert(symbol.to_string(), pairs);
        self
    }

    pub fn fund(mut self, symbol: &str, values: &[f64]) -> Self {
        self.funds.push(symbol.to_string());
        self.with(symbol, values)
    }
}

impl DataProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch(&self, symbol: &str, _window: &FetchWindow) -> Result<Series, DataError> {
        self.series
            .get(symbol)
            .map(|pairs| Series::from_pairs(symbol, pairs))
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }

    fn fetch_statements(
        &self,
        symbol: &str,
        kind: StatementKind,
        frequency: Frequency,
    ) -> Result<Statement, DataError> {
        if self.funds.iter().any(|f| f == symbol) {
            return Err(DataError::NotAnEquity {
                symbol: symbol.to_string(),
                quote_type: "ETF".into(),
            });
        }
        let last = self
            .series
            .get(symbol)
            .and_then(|pairs| pairs.last())
            .map(|(_, v)| *v)
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        let periods = match frequency {
            Frequency::Quarterly => vec![
                NaiveDate::from_ymd_opt(2023, 9, 30).unwrap(),
                NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            ],
            Frequency::Annual => vec![NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()],
        };
        let item = match kind {
            StatementKind::Financials => "NetIncome",
            StatementKind::CashFlow => "FreeCashFlow",
        };
        Ok(Statement::from_items(
            symbol,
            kind,
            frequency,
            vec![(item.to_string(), periods.into_iter().map(|p| (p, last)).collect())],
        ))
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub lines: Vec<LineChart>,
    pub scatters: Vec<ScatterChart>,
}

impl ChartSink for RecordingSink {
    fn render_line(&mut self, chart: &LineChart) -> Result<(), RenderError> {
        self.lines.push(chart.clone());
        Ok(())
    }

    fn render_scatter(&mut self, chart: &ScatterChart) -> Result<(), RenderError> {
        self.scatters.push(chart.clone());
        Ok(())
    }
}

fn constituent(symbol: &str, sector: &str, sub: &str) -> Constituent {
    Constituent {
        symbol: symbol.into(),
        name: symbol.into(),
        sector: sector.into(),
        sub_industry: sub.into(),
    }
}

pub fn universe() -> Universe {
    Universe::new(vec![
        constituent("XOM", "Energy", "Integrated Oil & Gas"),
        constituent("CVX", "Energy", "Integrated Oil & Gas"),
        constituent("COP", "Energy", "Oil & Gas Exploration & Production"),
        constituent("EOG", "Energy", "Oil & Gas Exploration & Production"),
        constituent("NEE", "Utilities", "Multi-Utilities"),
    ])
    .unwrap()
}
