//! Financial statements: per-symbol line items by reporting period, and the
//! combined table keyed by (symbol, period).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Which statement a provider reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Income statement figures.
    Financials,
    CashFlow,
}

impl StatementKind {
    pub const ALL: [StatementKind; 2] = [StatementKind::Financials, StatementKind::CashFlow];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Financials => "financials",
            Self::CashFlow => "cash_flow",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Financials => "Financials",
            Self::CashFlow => "Cash Flow",
        }
    }

    /// Line items requested for this statement, in display order.
    pub fn line_items(&self) -> &'static [&'static str] {
        match self {
            Self::Financials => &[
                "TotalRevenue",
                "CostOfRevenue",
                "GrossProfit",
                "OperatingExpense",
                "OperatingIncome",
                "EBITDA",
                "NetIncome",
                "DilutedEPS",
            ],
            Self::CashFlow => &[
                "OperatingCashFlow",
                "InvestingCashFlow",
                "FinancingCashFlow",
                "CapitalExpenditure",
                "FreeCashFlow",
                "RepurchaseOfCapitalStock",
                "CashDividendsPaid",
            ],
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StatementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "financials" | "income" => Ok(Self::Financials),
            "cash_flow" | "cashflow" | "cash-flow" => Ok(Self::CashFlow),
            other => Err(format!(
                "unknown statement '{other}' (expected financials, cash_flow)"
            )),
        }
    }
}

/// Reporting frequency of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Quarterly,
    Annual,
}

impl Frequency {
    pub const ALL: [Frequency; 2] = [Frequency::Quarterly, Frequency::Annual];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Quarterly => "Quarterly",
            Self::Annual => "Annual",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quarterly" | "q" => Ok(Self::Quarterly),
            "annual" | "yearly" | "a" => Ok(Self::Annual),
            other => Err(format!(
                "unknown frequency '{other}' (expected quarterly, annual)"
            )),
        }
    }
}

/// One line item across a statement's periods. `None` where not reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// One symbol's statement: line items aligned on ascending period-end dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub symbol: String,
    pub kind: StatementKind,
    pub frequency: Frequency,
    pub periods: Vec<NaiveDate>,
    pub items: Vec<LineItem>,
}

impl Statement {
    /// Build from per-item dated values. Periods are the ascending union of
    /// all dates; item order is kept. Items with no values are dropped.
    pub fn from_items(
        symbol: impl Into<String>,
        kind: StatementKind,
        frequency: Frequency,
        items: Vec<(String, Vec<(NaiveDate, f64)>)>,
    ) -> Self {
        let periods: Vec<NaiveDate> = items
            .iter()
            .flat_map(|(_, points)| points.iter().map(|(d, _)| *d))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let items = items
            .into_iter()
            .filter(|(_, points)| !points.is_empty())
            .map(|(name, points)| {
                let by_date: HashMap<NaiveDate, f64> = points.into_iter().collect();
                LineItem {
                    name,
                    values: periods.iter().map(|d| by_date.get(d).copied()).collect(),
                }
            })
            .collect();

        Self {
            symbol: symbol.into(),
            kind,
            frequency,
            periods,
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty() || self.items.is_empty()
    }

    pub fn value(&self, item: &str, period: NaiveDate) -> Option<f64> {
        let col = self.periods.iter().position(|d| *d == period)?;
        self.items
            .iter()
            .find(|i| i.name == item)
            .and_then(|i| i.values[col])
    }
}

/// One (symbol, period) column of a [`StatementTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementColumn {
    pub symbol: String,
    pub period: NaiveDate,
    /// Aligned with [`StatementTable::items`].
    pub values: Vec<Option<f64>>,
}

/// Several symbols' statements side by side: rows are line items, columns are
/// keyed by (symbol, period) with periods ascending inside each symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementTable {
    pub kind: StatementKind,
    pub frequency: Frequency,
    pub items: Vec<String>,
    pub columns: Vec<StatementColumn>,
}

impl StatementTable {
    pub fn new(kind: StatementKind, frequency: Frequency) -> Self {
        Self {
            kind,
            frequency,
            items: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Combine statements in the order given. Line items are the union in
    /// first-seen order.
    pub fn combine(kind: StatementKind, frequency: Frequency, statements: &[Statement]) -> Self {
        let mut items: Vec<String> = Vec::new();
        for item in statements.iter().flat_map(|s| &s.items) {
            if !items.contains(&item.name) {
                items.push(item.name.clone());
            }
        }

        let columns = statements
            .iter()
            .flat_map(|s| {
                let items = &items;
                s.periods.iter().enumerate().map(move |(col, period)| StatementColumn {
                    symbol: s.symbol.clone(),
                    period: *period,
                    values: items
                        .iter()
                        .map(|name| {
                            s.items
                                .iter()
                                .find(|i| &i.name == name)
                                .and_then(|i| i.values[col])
                        })
                        .collect(),
                })
            })
            .collect();

        Self {
            kind,
            frequency,
            items,
            columns,
        }
    }

    /// Symbols with at least one column, in column order.
    pub fn symbols(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for c in &self.columns {
            if out.last() != Some(&c.symbol.as_str()) {
                out.push(&c.symbol);
            }
        }
        out
    }

    pub fn value(&self, symbol: &str, period: NaiveDate, item: &str) -> Option<f64> {
        let row = self.items.iter().position(|i| i == item)?;
        self.columns
            .iter()
            .find(|c| c.symbol == symbol && c.period == period)
            .and_then(|c| c.values[row])
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.items.len()
    }

    /// File stem such as `financials_quarterly`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.kind.key(), self.frequency.key())
    }

    /// Heading such as `Quarterly Financials`.
    pub fn title(&self) -> String {
        format!("{} {}", self.frequency.label(), self.kind.label())
    }
}
