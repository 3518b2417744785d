//! Criterion benchmarks for SectorScope hot paths.
//!
//! Benchmarks:
//! 1. Full aggregation (three tables plus summaries) across universe sizes
//! 2. Top-K ranking of an aggregated universe
//! 3. Date alignment of staggered columns

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sectorscope_core::data::{align_columns, DatedColumn};
use sectorscope_core::domain::{Series, TableVariant};
use sectorscope_core::{aggregate, rank_top_k, AggregateConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(symbol: &str, n: usize, offset: usize) -> Series {
    let base = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let pairs: Vec<(NaiveDate, f64)> = (0..n)
        .map(|i| {
            let phase = (i + offset) as f64 * 0.1;
            (
                base + Duration::days((i + offset % 7) as i64),
                100.0 + phase.sin() * 10.0,
            )
        })
        .collect();
    Series::from_pairs(symbol, &pairs)
}

fn make_universe(symbols: usize, days: usize) -> Vec<Series> {
    (0..symbols)
        .map(|i| make_series(&format!("S{i:03}"), days, i))
        .collect()
}

fn label(_: &str) -> Option<String> {
    Some("Bench".to_string())
}

// ── 1. Aggregation ───────────────────────────────────────────────────

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    for symbols in [10, 50, 250] {
        let batch = make_universe(symbols, 252);
        group.bench_with_input(BenchmarkId::from_parameter(symbols), &batch, |b, batch| {
            b.iter(|| aggregate(black_box(batch), &label, &AggregateConfig::default()))
        });
    }
    group.finish();
}

// ── 2. Ranking ───────────────────────────────────────────────────────

fn bench_rank(c: &mut Criterion) {
    let batch = make_universe(250, 252);
    let agg = match aggregate(&batch, &label, &AggregateConfig::default()) {
        Ok(agg) => agg,
        Err(e) => panic!("bench fixture failed to aggregate: {e}"),
    };
    c.bench_function("rank_top_10_of_250", |b| {
        b.iter(|| rank_top_k(black_box(&agg), 10))
    });
}

// ── 3. Alignment ─────────────────────────────────────────────────────

fn bench_align(c: &mut Criterion) {
    let columns: Vec<DatedColumn> = make_universe(100, 252)
        .iter()
        .map(|s| DatedColumn {
            symbol: s.symbol().to_string(),
            points: s.observations().iter().map(|o| (o.date, Some(o.value))).collect(),
        })
        .collect();
    c.bench_function("align_100x252", |b| {
        b.iter(|| align_columns(TableVariant::Level, black_box(&columns)))
    });
}

criterion_group!(benches, bench_aggregate, bench_rank, bench_align);
criterion_main!(benches);
