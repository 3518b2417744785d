//! Markdown report generator.

use sectorscope_core::domain::{SummaryRow, TableVariant};
use sectorscope_core::holdings::Portfolio;

use crate::runner::AnalysisRun;

pub struct MarkdownReportGenerator;

fn pct(v: Option<f64>) -> String {
    v.map(|x| format!("{:+.2}%", x * 100.0))
        .unwrap_or_else(|| "n/a".to_string())
}

fn num(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4}")).unwrap_or_else(|| "n/a".to_string())
}

impl MarkdownReportGenerator {
    pub fn generate(&self, run: &AnalysisRun) -> String {
        let cfg = &run.config;
        let mut report = format!(
            "# SectorScope Report: {}\n\n\
Run ID: `{}`\n\n\
## Summary\n\
- Provider: {}\n\
- Fetched: {}\n\
- Window: {} / {}\n\
- Selected: {}\n\
- Kept: {}\n\
- Skipped: {}\n",
            run.title,
            run.run_id,
            run.provider,
            run.fetched_at.format("%Y-%m-%d %H:%M UTC"),
            cfg.fetch.period,
            cfg.fetch.interval,
            run.selected.len(),
            run.aggregation.symbols().len(),
            run.skipped.len(),
        );

        if run.is_synthetic() {
            report.push_str("- **SYNTHETIC DATA**: figures are not market prices\n");
        }

        // Ranking table
        let rows = &run.aggregation.cumulative_return.summary.rows;
        if !rows.is_empty() {
            report.push_str("\n## Ranking\n\n");
            report.push_str("| # | Symbol | Label | Price | Return | Mean | Volatility |\n");
            report.push_str("|---|--------|-------|-------|--------|------|------------|\n");
            for (i, row) in rows.iter().enumerate() {
                report.push_str(&ranking_line(i + 1, row));
            }
        }

        // Windowed change summary
        let windowed = &run.aggregation.windowed_change.summary.rows;
        if !windowed.is_empty() {
            report.push_str(&format!(
                "\n## {}\n\n",
                TableVariant::WindowedChange.title(cfg.aggregate.window)
            ));
            report.push_str("| Symbol | Mean | Std | Min | Max |\n");
            report.push_str("|--------|------|-----|-----|-----|\n");
            for row in windowed {
                report.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    row.symbol,
                    num(row.mean),
                    num(row.std),
                    num(row.min),
                    num(row.max)
                ));
            }
        }

        if let Some(portfolio) = &run.portfolio {
            report.push_str(&portfolio_section(portfolio));
        }

        if !run.statements.is_empty() {
            report.push_str("\n## Financial Statements\n\n");
            report.push_str("| Statement | Symbols | Periods | Line items | Skipped |\n");
            report.push_str("|-----------|---------|---------|------------|---------|\n");
            for set in &run.statements {
                let skipped: Vec<&str> = set.skipped.iter().map(|s| s.symbol.as_str()).collect();
                report.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    set.table.title(),
                    set.table.symbols().len(),
                    set.table.width(),
                    set.table.height(),
                    if skipped.is_empty() {
                        "-".to_string()
                    } else {
                        skipped.join(", ")
                    },
                ));
            }
        }

        if !run.skipped.is_empty() {
            report.push_str("\n## Skipped\n\n");
            report.push_str("| Symbol | Reason |\n");
            report.push_str("|--------|--------|\n");
            for s in &run.skipped {
                report.push_str(&format!("| {} | {} |\n", s.symbol, s.reason));
            }
        }

        report.push_str(
            "\n## Notes\n\
- Tables, summaries and the level parquet are exported alongside this report.\n\
- Statement CSVs carry two header rows: symbol, then period end.\n\
- Empty cells in the CSVs mean no data on that date.\n",
        );

        report
    }
}

fn portfolio_section(portfolio: &Portfolio) -> String {
    let mut out = String::from("\n## Portfolio\n\n");
    out.push_str("| Symbol | Shares |\n");
    out.push_str("|--------|--------|\n");
    for (symbol, shares) in portfolio.holdings.positions() {
        out.push_str(&format!("| {symbol} | {shares} |\n"));
    }
    let dated = |v: Option<(chrono::NaiveDate, f64)>| {
        v.map(|(d, x)| format!("{x:.2} on {d}"))
            .unwrap_or_else(|| "n/a".to_string())
    };
    out.push_str(&format!(
        "\n- Start value: {}\n- End value: {}\n- Growth: {}\n- CAGR: {}\n",
        dated(portfolio.start),
        dated(portfolio.end),
        pct(portfolio.growth),
        pct(portfolio.cagr),
    ));
    out
}

fn ranking_line(rank: usize, row: &SummaryRow) -> String {
    format!(
        "| {} | {} | {} | {} | {} | {} | {} |\n",
        rank,
        row.symbol,
        row.label,
        row.latest_price
            .map(|p| format!("{p:.2}"))
            .unwrap_or_else(|| "n/a".to_string()),
        pct(row.latest_return),
        pct(row.mean),
        pct(row.std),
    )
}
