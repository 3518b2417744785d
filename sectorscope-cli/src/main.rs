//! SectorScope CLI — sector listing, universe, analysis and valuation commands.
//!
//! Commands:
//! - `sectors` — list sectors and sub-industries, or search by label
//! - `universe init` — write the built-in S&P 500 universe as TOML
//! - `analyze` — fetch, aggregate, rank, chart and export one run
//! - `dcf` — discounted cash flow valuation from the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use sectorscope_core::data::{
    CircuitBreaker, DataProvider, Interval, LogProgress, Period, PriceField, SyntheticProvider,
    YahooProvider,
};
use sectorscope_core::domain::{Frequency, StatementKind, SummaryRow, TableVariant};
use sectorscope_core::present::{PlotlyJsonSink, Trendline};
use sectorscope_core::universe::{SectorPair, Selection, Universe};
use sectorscope_core::valuation::{discounted_cash_flow, wacc, CapitalStructure, DcfInputs};
use sectorscope_core::ClassifyBy;
use sectorscope_runner::{run_analysis, save_artifacts, AnalysisConfig, AnalysisRun, Ranking};

#[derive(Parser)]
#[command(
    name = "sectorscope",
    about = "SectorScope CLI — sector and sub-industry market analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sectors and sub-industries in the universe.
    Sectors {
        /// Universe TOML file. Defaults to the built-in S&P 500 list.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Show only sector/sub-industry pairs matching this label.
        #[arg(long)]
        label: Option<String>,
    },
    /// Universe file management.
    Universe {
        #[command(subcommand)]
        action: UniverseAction,
    },
    /// Aggregate, rank and chart a sector selection.
    Analyze {
        /// Path to a TOML analysis config. Flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Sector to include (repeatable).
        #[arg(long = "sector")]
        sectors: Vec<String>,

        /// Sector/sub-industry pair to include, as "Sector/Sub-Industry" (repeatable).
        #[arg(long = "pair")]
        pairs: Vec<String>,

        /// Label symbols by sector or sub-industry.
        #[arg(long)]
        classify_by: Option<ClassifyBy>,

        /// Lookback period: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max.
        #[arg(long)]
        period: Option<Period>,

        /// Bar interval: 1d, 1wk, 1mo.
        #[arg(long)]
        interval: Option<Interval>,

        /// Report adjusted closes instead of raw closes.
        #[arg(long, default_value_t = false)]
        adj_close: bool,

        /// Keep the K best symbols by latest cumulative return.
        #[arg(long, conflicts_with = "all")]
        top: Option<usize>,

        /// Keep every symbol (no ranking).
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Table drawn as a line chart: level, windowed_change, cumulative_return.
        #[arg(long)]
        series_plot: Option<TableVariant>,

        /// Summary drawn as a scatter: level, windowed_change, cumulative_return.
        #[arg(long)]
        scatter_plot: Option<TableVariant>,

        /// Scatter trendline: none, ols, lowess.
        #[arg(long)]
        trendline: Option<Trendline>,

        /// Fit one trendline across all points instead of one per group.
        #[arg(long, default_value_t = false)]
        single_trendline: bool,

        /// Plot mean on x and volatility on y.
        #[arg(long, default_value_t = false)]
        no_invert: bool,

        /// Chart and report title.
        #[arg(long)]
        title: Option<String>,

        /// Shares held per selected symbol, in universe order. Values the
        /// portfolio when given; a short list repeats its last count.
        #[arg(long, num_args = 1..)]
        shares: Vec<f64>,

        /// Financial statements to collect for kept symbols: financials, cash_flow.
        #[arg(long = "statements", num_args = 1..)]
        statement_kinds: Vec<StatementKind>,

        /// Statement frequency: quarterly, annual (repeatable). Defaults to both.
        #[arg(long = "frequency", num_args = 1..)]
        frequencies: Vec<Frequency>,

        /// Use synthetic random-walk data instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Universe TOML file. Defaults to the built-in S&P 500 list.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Output directory for charts, tables and reports.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Discounted cash flow valuation.
    Dcf {
        /// Base-year free cash flow.
        #[arg(long)]
        cash_flow: f64,

        /// Growth rate for each projected year, e.g. --growth 0.08 0.06 0.05.
        #[arg(long, num_args = 1.., required = true)]
        growth: Vec<f64>,

        /// Perpetual growth after the projection.
        #[arg(long)]
        terminal_growth: f64,

        /// Discount rate. Computed from the capital structure when absent.
        #[arg(long)]
        wacc: Option<f64>,

        /// Market value of equity.
        #[arg(long, required_unless_present = "wacc")]
        equity: Option<f64>,

        /// Market value of debt.
        #[arg(long, required_unless_present = "wacc")]
        debt: Option<f64>,

        /// Cost of equity.
        #[arg(long, required_unless_present = "wacc")]
        cost_of_equity: Option<f64>,

        /// Pre-tax cost of debt.
        #[arg(long, required_unless_present = "wacc")]
        cost_of_debt: Option<f64>,

        /// Corporate tax rate.
        #[arg(long, default_value_t = 0.21)]
        tax_rate: f64,

        /// Debt minus cash.
        #[arg(long, default_value_t = 0.0)]
        net_debt: f64,

        /// Shares outstanding.
        #[arg(long)]
        shares: f64,
    },
}

#[derive(Subcommand)]
enum UniverseAction {
    /// Write the built-in S&P 500 universe to a TOML file.
    Init {
        /// Destination file.
        #[arg(long, default_value = "universe.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sectors { universe, label } => {
            run_sectors(universe.as_deref(), label.as_deref())
        }
        Commands::Universe { action } => match action {
            UniverseAction::Init { path, force } => run_universe_init(&path, force),
        },
        Commands::Analyze {
            config,
            sectors,
            pairs,
            classify_by,
            period,
            interval,
            adj_close,
            top,
            all,
            series_plot,
            scatter_plot,
            trendline,
            single_trendline,
            no_invert,
            title,
            shares,
            statement_kinds,
            frequencies,
            synthetic,
            universe,
            output_dir,
        } => {
            let mut cfg = match &config {
                Some(path) => AnalysisConfig::from_file(path)?,
                None => AnalysisConfig::default(),
            };
            if !sectors.is_empty() && !pairs.is_empty() {
                bail!("--sector and --pair cannot be combined");
            }
            if !sectors.is_empty() {
                cfg.selection = Selection::Sectors(sectors);
            }
            if !pairs.is_empty() {
                let parsed = pairs
                    .iter()
                    .map(|p| {
                        SectorPair::parse(p).with_context(|| {
                            format!("invalid pair '{p}', expected \"Sector/Sub-Industry\"")
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                cfg.selection = Selection::Pairs(parsed);
            }
            if let Some(c) = classify_by {
                cfg.classify_by = c;
            }
            if let Some(p) = period {
                cfg.fetch.period = p;
            }
            if let Some(i) = interval {
                cfg.fetch.interval = i;
            }
            if adj_close {
                cfg.fetch.price_field = PriceField::AdjClose;
            }
            if all {
                cfg.ranking = Ranking::All;
            } else if let Some(k) = top {
                cfg.ranking = Ranking::Top(k);
            }
            if let Some(v) = series_plot {
                cfg.series_plot = v;
            }
            if let Some(v) = scatter_plot {
                cfg.scatter_plot = v;
            }
            if let Some(t) = trendline {
                cfg.render.trendline = t;
            }
            if single_trendline {
                cfg.render.color_by_group = false;
            }
            if no_invert {
                cfg.render.invert_axes = false;
            }
            if title.is_some() {
                cfg.title = title;
            }
            if !shares.is_empty() {
                cfg.shares = shares;
            }
            if !statement_kinds.is_empty() {
                cfg.statements.kinds = statement_kinds;
            }
            if !frequencies.is_empty() {
                cfg.statements.frequencies = frequencies;
            }
            cfg.validate()?;

            run_analyze_cmd(&cfg, universe.as_deref(), synthetic, &output_dir)
        }
        Commands::Dcf {
            cash_flow,
            growth,
            terminal_growth,
            wacc: discount_rate,
            equity,
            debt,
            cost_of_equity,
            cost_of_debt,
            tax_rate,
            net_debt,
            shares,
        } => {
            let discount_rate = match discount_rate {
                Some(r) => r,
                None => {
                    // clap guarantees these when --wacc is absent
                    let (Some(equity), Some(debt), Some(cost_of_equity), Some(cost_of_debt)) =
                        (equity, debt, cost_of_equity, cost_of_debt)
                    else {
                        bail!("either --wacc or the full capital structure is required");
                    };
                    let rate = wacc(&CapitalStructure {
                        equity,
                        debt,
                        cost_of_equity,
                        cost_of_debt,
                        tax_rate,
                    })?;
                    println!("WACC:           {:.2}%", rate * 100.0);
                    rate
                }
            };
            run_dcf(&DcfInputs {
                base_cash_flow: cash_flow,
                growth_rates: growth,
                terminal_growth,
                discount_rate,
                net_debt,
                shares_outstanding: shares,
            })
        }
    }
}

fn load_universe(path: Option<&Path>) -> Result<Universe> {
    match path {
        Some(p) => Universe::from_file(p)
            .with_context(|| format!("failed to load universe {}", p.display())),
        None => Ok(Universe::default_sp500()),
    }
}

fn run_sectors(universe_path: Option<&Path>, label: Option<&str>) -> Result<()> {
    let universe = load_universe(universe_path)?;

    if let Some(label) = label {
        let matches = universe.search_by_label(label);
        if matches.is_empty() {
            println!("No sector or sub-industry matches '{label}'.");
            return Ok(());
        }
        for pair in &matches {
            let symbols: Vec<&str> = universe
                .search_by_pair(pair)
                .iter()
                .map(|c| c.symbol.as_str())
                .collect();
            println!("{pair}: {}", symbols.join(", "));
        }
        return Ok(());
    }

    println!(
        "Universe: {} symbols, {} sectors, {} sub-industries",
        universe.len(),
        universe.sectors().len(),
        universe.sub_industries().len()
    );
    println!();
    println!("{:<28} {:<44} {:>7}", "Sector", "Sub-Industry", "Symbols");
    println!("{}", "-".repeat(81));
    for pair in universe.pairs() {
        let count = universe.search_by_pair(&pair).len();
        println!(
            "{:<28} {:<44} {:>7}",
            pair.sector, pair.sub_industry, count
        );
    }
    Ok(())
}

fn run_universe_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        );
    }
    let universe = Universe::default_sp500();
    std::fs::write(path, universe.to_toml()?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!(
        "Wrote {} symbols across {} sectors to {}",
        universe.len(),
        universe.sectors().len(),
        path.display()
    );
    Ok(())
}

fn run_analyze_cmd(
    cfg: &AnalysisConfig,
    universe_path: Option<&Path>,
    synthetic: bool,
    output_dir: &Path,
) -> Result<()> {
    let universe = load_universe(universe_path)?;

    let provider: Box<dyn DataProvider> = if synthetic {
        Box::new(SyntheticProvider::today())
    } else {
        let breaker = Arc::new(CircuitBreaker::default_provider());
        Box::new(YahooProvider::new(breaker)?.with_price_field(cfg.fetch.price_field))
    };

    let run_id = cfg.run_id()?;
    let chart_dir = output_dir.join(&run_id).join("charts");
    let mut sink = PlotlyJsonSink::new(&chart_dir);

    tracing::info!(
        "analyzing {} ({} / {}) with {}",
        cfg.title(),
        cfg.fetch.period,
        cfg.fetch.interval,
        provider.name()
    );
    let run = run_analysis(cfg, &universe, provider.as_ref(), &mut sink, &LogProgress)?;
    let paths = save_artifacts(output_dir, &run)?;

    print_summary(&run);
    println!("Charts:    {}", chart_dir.display());
    println!("Artifacts: {}", paths.run_dir.display());
    if let Some(portfolio) = &paths.portfolio_csv {
        println!("Portfolio: {}", portfolio.display());
    }
    for statement in &paths.statement_csvs {
        println!("Statement: {}", statement.display());
    }
    if let Some(report) = &paths.report_markdown {
        println!("Report:    {}", report.display());
    }
    Ok(())
}

fn run_dcf(inputs: &DcfInputs) -> Result<()> {
    let valuation = discounted_cash_flow(inputs)?;

    println!();
    println!("=== Discounted Cash Flow ===");
    println!("{:<6} {:>16} {:>16}", "Year", "Cash Flow", "Present Value");
    println!("{}", "-".repeat(40));
    for (i, (cf, pv)) in valuation
        .cash_flows
        .iter()
        .zip(&valuation.present_values)
        .enumerate()
    {
        println!("{:<6} {:>16.2} {:>16.2}", i + 1, cf, pv);
    }
    println!();
    println!("Terminal Value:   {:.2}", valuation.terminal_value);
    println!("Enterprise Value: {:.2}", valuation.enterprise_value);
    println!("Equity Value:     {:.2}", valuation.equity_value);
    println!("Per Share:        {:.2}", valuation.per_share);
    println!();
    Ok(())
}

fn fmt_pct(v: Option<f64>) -> String {
    v.map(|x| format!("{:+.2}%", x * 100.0))
        .unwrap_or_else(|| "n/a".into())
}

fn print_summary(run: &AnalysisRun) {
    println!();
    println!("=== {} ===", run.title);
    println!("Run ID:    {}", run.run_id);
    println!("Provider:  {}", run.provider);
    println!(
        "Symbols:   {} selected, {} kept, {} skipped",
        run.selected.len(),
        run.aggregation.symbols().len(),
        run.skipped.len()
    );
    println!();
    println!(
        "{:<4} {:<8} {:<40} {:>10} {:>10}",
        "#", "Symbol", "Label", "Price", "Return"
    );
    println!("{}", "-".repeat(76));
    for (i, row) in run
        .aggregation
        .cumulative_return
        .summary
        .rows
        .iter()
        .enumerate()
    {
        print_row(i + 1, row);
    }
    if let Some(portfolio) = &run.portfolio {
        println!();
        if let Some((date, value)) = portfolio.end {
            println!("Portfolio: {value:.2} on {date}");
        }
        println!(
            "           growth {}, CAGR {}",
            fmt_pct(portfolio.growth),
            fmt_pct(portfolio.cagr)
        );
    }
    for set in &run.statements {
        println!(
            "{}: {} symbols, {} periods, {} skipped",
            set.table.title(),
            set.table.symbols().len(),
            set.table.width(),
            set.skipped.len()
        );
    }
    if run.is_synthetic() {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    for skip in &run.skipped {
        println!("WARNING: skipped {}: {}", skip.symbol, skip.reason);
    }
    println!();
}

fn print_row(rank: usize, row: &SummaryRow) {
    let price = row
        .latest_price
        .map(|p| format!("{p:.2}"))
        .unwrap_or_else(|| "n/a".into());
    println!(
        "{:<4} {:<8} {:<40} {:>10} {:>10}",
        rank,
        row.symbol,
        row.label,
        price,
        fmt_pct(row.latest_return)
    );
}
