//! Integration tests for the data pipeline using the synthetic provider.

use chrono::NaiveDate;
use sectorscope_core::classify::UniverseClassifier;
use sectorscope_core::data::{
    fetch_batch, FetchWindow, Interval, NoProgress, Period, SyntheticProvider,
};
use sectorscope_core::universe::{Selection, Universe};
use sectorscope_core::{aggregate, rank_top_k, AggregateConfig, ClassifyBy};

fn provider() -> SyntheticProvider {
    SyntheticProvider::new(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap())
}

#[test]
fn sector_selection_fetch_aggregate_rank() {
    let universe = Universe::default_sp500();
    let picked = universe.select(&Selection::Sectors(vec!["Information Technology".into()]));
    let symbols: Vec<&str> = picked.iter().map(|c| c.symbol.as_str()).collect();

    let batch = fetch_batch(&provider(), &symbols, &FetchWindow::default(), &NoProgress);
    assert!(batch.all_succeeded());
    assert_eq!(batch.series.len(), symbols.len());

    let classifier = UniverseClassifier::new(&universe, ClassifyBy::SubIndustry);
    let agg = aggregate(&batch.series, &classifier, &AggregateConfig::default()).unwrap();
    assert_eq!(agg.level.table.width(), symbols.len());
    assert!(agg
        .level
        .summary
        .rows
        .iter()
        .any(|r| r.label == "Semiconductors"));

    let top = rank_top_k(&agg, 3).unwrap();
    assert_eq!(top.symbols().len(), 3);
    let returns: Vec<f64> = top
        .cumulative_return
        .summary
        .rows
        .iter()
        .map(|r| r.latest_return.unwrap())
        .collect();
    assert!(returns.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn weekly_window_shares_one_index() {
    let window = FetchWindow::new(Period::SixMonths, Interval::Weekly);
    let batch = fetch_batch(&provider(), &["XOM", "CVX"], &window, &NoProgress);
    let agg = aggregate(
        &batch.series,
        &|_: &str| Some("Energy".to_string()),
        &AggregateConfig::default(),
    )
    .unwrap();

    // Both synthetic series step from the same start date
    let level = &agg.level.table;
    assert!(level.columns().iter().all(|c| c.values.iter().all(Option::is_some)));
    let first_change = agg
        .windowed_change
        .table
        .columns()
        .iter()
        .map(|c| c.values.iter().position(Option::is_some))
        .collect::<Vec<_>>();
    assert_eq!(first_change, vec![Some(5), Some(5)]);
}

#[test]
fn level_table_exports_to_dataframe() {
    let batch = fetch_batch(&provider(), &["AAPL", "MSFT"], &FetchWindow::default(), &NoProgress);
    let unlabelled = |_: &str| -> Option<String> { None };
    let agg = aggregate(&batch.series, &unlabelled, &AggregateConfig::default()).unwrap();
    let df = agg.level.table.to_dataframe().unwrap();
    assert_eq!(df.width(), 3);
    assert_eq!(df.height(), agg.level.table.height());
}
