//! End-to-end tests for aggregation and ranking on small hand-checked inputs.

use chrono::NaiveDate;
use sectorscope_core::domain::{Observation, Series, TableVariant, UNKNOWN_LABEL};
use sectorscope_core::{aggregate, rank_top_k, AggregateConfig, AnalysisError};

fn t(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn series(symbol: &str, start_day: u32, values: &[f64]) -> Series {
    let pairs: Vec<(NaiveDate, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (t(start_day + i as u32), *v))
        .collect();
    Series::from_pairs(symbol, &pairs)
}

fn sector(symbol: &str) -> Option<String> {
    match symbol {
        "A" | "B" => Some("Tech".into()),
        "C" => Some("Energy".into()),
        _ => None,
    }
}

#[test]
fn two_symbols_cumulative_return_and_top_one() {
    let batch = [series("A", 1, &[10.0, 11.0, 12.0]), series("B", 1, &[10.0, 9.0, 8.0])];
    let agg = aggregate(&batch, &sector, &AggregateConfig::default()).unwrap();

    let cum = &agg.cumulative_return.table;
    assert_eq!(cum.variant(), TableVariant::CumulativeReturn);
    assert_eq!(
        cum.column("A").unwrap().values,
        vec![Some(0.0), Some(0.1), Some(0.2)]
    );
    assert_eq!(
        cum.column("B").unwrap().values,
        vec![Some(0.0), Some(-0.1), Some(-0.2)]
    );

    let summary = &agg.cumulative_return.summary;
    assert_eq!(summary.row("A").unwrap().latest_return, Some(0.2));
    assert_eq!(summary.row("B").unwrap().latest_return, Some(-0.2));

    let top = rank_top_k(&agg, 1).unwrap();
    assert_eq!(top.symbols(), vec!["A"]);
    for panel in top.panels() {
        assert_eq!(panel.table.symbols(), vec!["A"]);
        assert_eq!(panel.table.height(), 3);
    }
}

#[test]
fn windowed_change_example() {
    let cfg = AggregateConfig {
        window: 2,
        ..AggregateConfig::default()
    };
    let agg = aggregate(&[series("A", 1, &[10.0, 11.0, 12.0, 13.0])], &sector, &cfg).unwrap();
    assert_eq!(
        agg.windowed_change.table.column("A").unwrap().values,
        vec![None, None, Some(0.2), Some(0.1818)]
    );
}

#[test]
fn duplicate_timestamp_keeps_first_observation() {
    let s = Series::from_observations(
        "A",
        vec![
            Observation::new(t(1), 10.0),
            Observation::new(t(2), 11.0),
            Observation::new(t(2), 999.0),
            Observation::new(t(3), 12.0),
        ],
    );
    let agg = aggregate(&[s], &sector, &AggregateConfig::default()).unwrap();

    let level = agg.level.table.column("A").unwrap();
    assert_eq!(level.values, vec![Some(10.0), Some(11.0), Some(12.0)]);
    assert_eq!(agg.level.summary.row("A").unwrap().max, Some(12.0));
}

#[test]
fn unclassified_symbol_is_labelled_unknown() {
    let batch = [series("A", 1, &[1.0, 2.0]), series("ZZZZ", 1, &[1.0, 2.0])];
    let agg = aggregate(&batch, &sector, &AggregateConfig::default()).unwrap();
    for panel in agg.panels() {
        assert_eq!(panel.summary.row("ZZZZ").unwrap().label, UNKNOWN_LABEL);
        assert_eq!(panel.summary.row("A").unwrap().label, "Tech");
    }
}

#[test]
fn staggered_dates_outer_join_with_gaps() {
    let batch = [series("A", 1, &[10.0, 11.0]), series("C", 2, &[20.0, 22.0])];
    let agg = aggregate(&batch, &sector, &AggregateConfig::default()).unwrap();

    let level = &agg.level.table;
    assert_eq!(level.index(), &[t(1), t(2), t(3)]);
    assert_eq!(level.column("A").unwrap().values, vec![Some(10.0), Some(11.0), None]);
    assert_eq!(level.column("C").unwrap().values, vec![None, Some(20.0), Some(22.0)]);

    // Each symbol's return is measured from its own first observation
    let cum = &agg.cumulative_return.table;
    assert_eq!(cum.value("C", t(2)), Some(0.0));
    assert_eq!(cum.value("C", t(1)), None);

    // Latest price ignores the trailing gap
    assert_eq!(agg.level.summary.row("A").unwrap().latest_price, Some(11.0));
}

#[test]
fn structural_errors() {
    let cfg = AggregateConfig::default();
    assert_eq!(aggregate(&[], &sector, &cfg), Err(AnalysisError::EmptyInput));

    let empty = Series::from_observations("E", vec![]);
    assert!(matches!(
        aggregate(&[series("A", 1, &[1.0]), empty], &sector, &cfg),
        Err(AnalysisError::InvalidSeries { symbol, .. }) if symbol == "E"
    ));

    let agg = aggregate(&[series("A", 1, &[1.0])], &sector, &cfg).unwrap();
    assert!(matches!(
        rank_top_k(&agg, 0),
        Err(AnalysisError::InvalidParameter(_))
    ));
}

#[test]
fn k_larger_than_universe_keeps_everything_in_rank_order() {
    let batch = [
        series("A", 1, &[10.0, 10.5]),
        series("B", 1, &[10.0, 12.0]),
        series("C", 1, &[10.0, 9.0]),
    ];
    let agg = aggregate(&batch, &sector, &AggregateConfig::default()).unwrap();
    let ranked = rank_top_k(&agg, 10).unwrap();
    assert_eq!(ranked.symbols(), vec!["B", "A", "C"]);
    assert_eq!(ranked.level.table.symbols(), vec!["B", "A", "C"]);
    assert_eq!(ranked.windowed_change.summary.symbols(), vec!["B", "A", "C"]);
}

#[test]
fn returns_that_round_to_zero_print_without_sign() {
    let batch = [series("A", 1, &[100.0, 99.9999])];
    let agg = aggregate(&batch, &sector, &AggregateConfig::default()).unwrap();

    let last = agg.cumulative_return.table.latest("A").unwrap();
    assert!(last.is_sign_positive());
    let record = agg.cumulative_return.summary.rows[0].to_record();
    // latest_return, min and max
    assert_eq!(record[3], "0");
    assert_eq!(record[6], "0");
    assert_eq!(record[7], "0");
}
