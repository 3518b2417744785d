//! Wide tables: one column per symbol, aligned on a shared date index.

use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame, NamedFrom, PolarsResult, Series as PlSeries};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which derived view of the input series a table holds.
///
/// Replaces the old boolean pair that picked chart formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableVariant {
    /// Raw values (closing prices).
    Level,
    /// Percent change over a fixed look-back window.
    WindowedChange,
    /// Value divided by the symbol's first value, minus one.
    CumulativeReturn,
}

impl TableVariant {
    pub const ALL: [TableVariant; 3] = [
        TableVariant::Level,
        TableVariant::WindowedChange,
        TableVariant::CumulativeReturn,
    ];

    /// Stable machine name, used for file stems and config values.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::WindowedChange => "windowed_change",
            Self::CumulativeReturn => "cumulative_return",
        }
    }

    /// Human name without the window length.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Level => "Closing Prices",
            Self::WindowedChange => "Rolling Returns",
            Self::CumulativeReturn => "Cumulative Returns",
        }
    }

    /// Chart title suffix for this variant.
    pub fn title(&self, window: usize) -> String {
        match self {
            Self::Level => "Closing Prices".to_string(),
            Self::WindowedChange => format!("{window}-Period Rolling Returns"),
            Self::CumulativeReturn => "Cumulative Returns".to_string(),
        }
    }
}

impl fmt::Display for TableVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TableVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "level" | "prices" | "price" => Ok(Self::Level),
            "windowed_change" | "windowed" | "pct" => Ok(Self::WindowedChange),
            "cumulative_return" | "cumulative" | "ytd" => Ok(Self::CumulativeReturn),
            other => Err(format!(
                "unknown table variant '{other}' (expected level, windowed_change, cumulative_return)"
            )),
        }
    }
}

/// One symbol's column. `None` marks a date with no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    pub symbol: String,
    pub values: Vec<Option<f64>>,
}

impl TableColumn {
    /// Values that are present, in date order.
    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|v| *v)
    }

    /// Most recent present value.
    pub fn latest(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }
}

/// Symbol-keyed matrix of one table variant, outer-joined on date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideTable {
    variant: TableVariant,
    index: Vec<NaiveDate>,
    columns: Vec<TableColumn>,
}

impl WideTable {
    /// Assemble a table. Every column must have one entry per index date.
    pub fn new(variant: TableVariant, index: Vec<NaiveDate>, columns: Vec<TableColumn>) -> Self {
        debug_assert!(columns.iter().all(|c| c.values.len() == index.len()));
        Self {
            variant,
            index,
            columns,
        }
    }

    pub fn variant(&self) -> TableVariant {
        self.variant
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.symbol.as_str()).collect()
    }

    pub fn column(&self, symbol: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.symbol == symbol)
    }

    /// Value at a given date for a symbol (`None` if either is absent or no data).
    pub fn value(&self, symbol: &str, date: NaiveDate) -> Option<f64> {
        let row = self.index.binary_search(&date).ok()?;
        self.column(symbol)?.values[row]
    }

    /// Most recent present value for a symbol.
    pub fn latest(&self, symbol: &str) -> Option<f64> {
        self.column(symbol)?.latest()
    }

    pub fn height(&self) -> usize {
        self.index.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Keep only the named symbols, in the order given. Unknown names are skipped.
    ///
    /// The date index and all no-data markers are left untouched.
    pub fn select<S: AsRef<str>>(&self, symbols: &[S]) -> WideTable {
        let columns = symbols
            .iter()
            .filter_map(|s| self.column(s.as_ref()).cloned())
            .collect();
        WideTable::new(self.variant, self.index.clone(), columns)
    }

    /// Replace each gap with the next present value in the same column.
    ///
    /// Trailing gaps stay empty. Never applied implicitly.
    pub fn backfill(&self) -> WideTable {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let mut values = c.values.clone();
                let mut next = None;
                for v in values.iter_mut().rev() {
                    if v.is_some() {
                        next = *v;
                    } else {
                        *v = next;
                    }
                }
                TableColumn {
                    symbol: c.symbol.clone(),
                    values,
                }
            })
            .collect();
        WideTable::new(self.variant, self.index.clone(), columns)
    }

    /// Materialize as a polars DataFrame with a leading `date` column.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let dates: Vec<String> = self.index.iter().map(|d| d.to_string()).collect();
        let mut cols = Vec::with_capacity(self.columns.len() + 1);
        cols.push(Column::from(PlSeries::new("date".into(), dates)));
        for c in &self.columns {
            cols.push(Column::from(PlSeries::new(
                c.symbol.as_str().into(),
                c.values.clone(),
            )));
        }
        DataFrame::new(cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn table() -> WideTable {
        WideTable::new(
            TableVariant::Level,
            vec![d(1), d(2), d(3)],
            vec![
                TableColumn {
                    symbol: "A".into(),
                    values: vec![Some(1.0), None, Some(3.0)],
                },
                TableColumn {
                    symbol: "B".into(),
                    values: vec![None, Some(2.0), None],
                },
            ],
        )
    }

    #[test]
    fn latest_skips_trailing_gaps() {
        let t = table();
        assert_eq!(t.latest("A"), Some(3.0));
        assert_eq!(t.latest("B"), Some(2.0));
        assert_eq!(t.latest("C"), None);
    }

    #[test]
    fn select_preserves_requested_order_and_index() {
        let t = table();
        let s = t.select(&["B", "A", "missing"]);
        assert_eq!(s.symbols(), vec!["B", "A"]);
        assert_eq!(s.index(), t.index());
        assert_eq!(s.column("B").unwrap().values, vec![None, Some(2.0), None]);
    }

    #[test]
    fn backfill_fills_from_next_value_only() {
        let t = table().backfill();
        assert_eq!(t.column("A").unwrap().values, vec![Some(1.0), Some(3.0), Some(3.0)]);
        assert_eq!(t.column("B").unwrap().values, vec![Some(2.0), Some(2.0), None]);
    }

    #[test]
    fn value_lookup_by_date() {
        let t = table();
        assert_eq!(t.value("A", d(3)), Some(3.0));
        assert_eq!(t.value("A", d(2)), None);
        assert_eq!(t.value("A", d(9)), None);
    }

    #[test]
    fn dataframe_has_date_and_symbol_columns() {
        let df = table().to_dataframe().unwrap();
        assert_eq!(df.width(), 3);
        assert_eq!(df.height(), 3);
        let b = df.column("B").unwrap().f64().unwrap();
        assert_eq!(b.get(0), None);
        assert_eq!(b.get(1), Some(2.0));
    }

    #[test]
    fn variant_parses_legacy_names() {
        assert_eq!("Prices".parse::<TableVariant>().unwrap(), TableVariant::Level);
        assert_eq!("PCT".parse::<TableVariant>().unwrap(), TableVariant::WindowedChange);
        assert_eq!("YTD".parse::<TableVariant>().unwrap(), TableVariant::CumulativeReturn);
        assert!("bogus".parse::<TableVariant>().is_err());
    }
}
