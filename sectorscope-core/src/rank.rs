//! Ranker — keeps the top K symbols by latest cumulative return.

use std::cmp::Ordering;

use crate::domain::{Aggregation, SummarySet};
use crate::error::AnalysisError;

/// Symbols ordered best first by latest cumulative return.
///
/// The sort is stable: equal returns keep their input order. Rows with no
/// latest return go after every row that has one.
pub fn rank_order(summary: &SummarySet) -> Vec<String> {
    let mut rows: Vec<_> = summary.rows.iter().collect();
    rows.sort_by(|a, b| match (a.latest_return, b.latest_return) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows.into_iter().map(|r| r.symbol.clone()).collect()
}

/// Narrow every panel to the `k` best symbols, in rank order.
///
/// Date indexes and no-data markers are untouched; only columns and summary
/// rows are selected and reordered.
pub fn rank_top_k(aggregation: &Aggregation, k: usize) -> Result<Aggregation, AnalysisError> {
    if k == 0 {
        return Err(AnalysisError::invalid_parameter("k must be at least 1"));
    }

    let mut order = rank_order(&aggregation.cumulative_return.summary);
    order.truncate(k);
    tracing::debug!(k, kept = order.len(), "ranked by latest return");

    Ok(aggregation.select(&order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SummaryRow, TableVariant};
    use crate::stats::Describe;

    fn summary(rows: &[(&str, Option<f64>)]) -> SummarySet {
        SummarySet::new(
            TableVariant::CumulativeReturn,
            rows.iter()
                .map(|(s, r)| SummaryRow::new(*s, "x", Some(1.0), *r, Describe::default()))
                .collect(),
        )
    }

    #[test]
    fn descending_by_latest_return() {
        let s = summary(&[("A", Some(0.1)), ("B", Some(0.3)), ("C", Some(-0.2))]);
        assert_eq!(rank_order(&s), vec!["B", "A", "C"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let s = summary(&[("A", Some(0.1)), ("B", Some(0.1)), ("C", Some(0.1))]);
        assert_eq!(rank_order(&s), vec!["A", "B", "C"]);
    }

    #[test]
    fn missing_returns_sort_last() {
        let s = summary(&[("A", None), ("B", Some(-0.5)), ("C", None), ("D", Some(0.0))]);
        assert_eq!(rank_order(&s), vec!["D", "B", "A", "C"]);
    }
}
