//! Multi-symbol date alignment.
//!
//! Given dated values for several symbols, build a wide table on the union of
//! their dates. A symbol with no observation on a date gets `None` there; gaps
//! are never forward-filled or zeroed.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

use crate::domain::{TableColumn, TableVariant, WideTable};

/// One symbol's dated values before alignment. `None` means the value is
/// undefined on a date the symbol does have (e.g. inside the look-back window).
#[derive(Debug, Clone)]
pub struct DatedColumn {
    pub symbol: String,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

/// Outer-join columns on date. Column order follows the input order.
pub fn align_columns(variant: TableVariant, inputs: &[DatedColumn]) -> WideTable {
    // Union of all dates, ascending
    let index: Vec<NaiveDate> = inputs
        .iter()
        .flat_map(|c| c.points.iter().map(|(d, _)| *d))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let columns = inputs
        .iter()
        .map(|input| {
            let by_date: HashMap<NaiveDate, Option<f64>> = input.points.iter().copied().collect();
            let values = index
                .iter()
                .map(|d| by_date.get(d).copied().flatten())
                .collect();
            TableColumn {
                symbol: input.symbol.clone(),
                values,
            }
        })
        .collect();

    WideTable::new(variant, index, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn align_marks_missing_dates_as_none() {
        let spy = DatedColumn {
            symbol: "SPY".into(),
            points: vec![
                (d("2024-01-02"), Some(100.0)),
                (d("2024-01-03"), Some(101.0)),
                (d("2024-01-04"), Some(102.0)),
            ],
        };
        let qqq = DatedColumn {
            symbol: "QQQ".into(),
            points: vec![
                (d("2024-01-02"), Some(200.0)),
                // QQQ missing 2024-01-03
                (d("2024-01-04"), Some(202.0)),
            ],
        };

        let table = align_columns(TableVariant::Level, &[spy, qqq]);

        assert_eq!(table.height(), 3);
        assert_eq!(table.symbols(), vec!["SPY", "QQQ"]);
        assert_eq!(table.column("SPY").unwrap().values[1], Some(101.0));
        assert_eq!(table.column("QQQ").unwrap().values[1], None);
    }

    #[test]
    fn undefined_values_stay_undefined() {
        let a = DatedColumn {
            symbol: "A".into(),
            points: vec![(d("2024-01-02"), None), (d("2024-01-03"), Some(0.5))],
        };
        let table = align_columns(TableVariant::WindowedChange, &[a]);
        assert_eq!(table.column("A").unwrap().values, vec![None, Some(0.5)]);
    }

    #[test]
    fn index_is_sorted_union() {
        let a = DatedColumn {
            symbol: "A".into(),
            points: vec![(d("2024-01-05"), Some(1.0))],
        };
        let b = DatedColumn {
            symbol: "B".into(),
            points: vec![(d("2024-01-01"), Some(1.0)), (d("2024-01-05"), Some(2.0))],
        };
        let table = align_columns(TableVariant::Level, &[a, b]);
        assert_eq!(table.index(), &[d("2024-01-01"), d("2024-01-05")]);
    }
}
