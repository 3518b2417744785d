//! Synthetic data provider for offline runs.
//!
//! Produces a random walk from a starting price of 100.0, seeded from the
//! symbol name so repeated runs agree, and statements with four periods of
//! drifting line items. These figures are clearly fake; the runner tags
//! results built on them.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataProvider, FetchWindow, Interval, Period};
use crate::domain::{Frequency, Observation, Series, Statement, StatementKind};

/// Periods per synthetic statement.
const STATEMENT_PERIODS: usize = 4;

/// Outflow items reported as negative numbers.
const OUTFLOWS: [&str; 5] = [
    "InvestingCashFlow",
    "FinancingCashFlow",
    "CapitalExpenditure",
    "RepurchaseOfCapitalStock",
    "CashDividendsPaid",
];

pub struct SyntheticProvider {
    as_of: NaiveDate,
}

impl SyntheticProvider {
    /// Generate windows ending on `as_of`.
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of }
    }

    /// Generate windows ending today.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    fn start_date(&self, period: Period) -> NaiveDate {
        match period.approx_days() {
            Some(days) => self.as_of - Duration::days(days),
            None if period == Period::YearToDate => {
                NaiveDate::from_ymd_opt(self.as_of.year(), 1, 1).unwrap_or(self.as_of)
            }
            None => self.as_of - Duration::days(3652),
        }
    }

    fn generate(&self, symbol: &str, window: &FetchWindow) -> Vec<Observation> {
        // Deterministic seed from symbol name
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let step = Duration::days(window.interval.step_days());
        let mut observations = Vec::new();
        let mut price = 100.0_f64;
        let mut current = self.start_date(window.period);

        while current <= self.as_of {
            let weekday = current.weekday();
            if window.interval == Interval::Daily && (weekday == Weekday::Sat || weekday == Weekday::Sun)
            {
                current += step;
                continue;
            }

            observations.push(Observation::new(current, price));
            let change: f64 = rng.gen_range(-0.03..0.03);
            price *= 1.0 + change;
            current += step;
        }

        observations
    }

    /// The last `count` quarter or fiscal-year ends on or before `as_of`, ascending.
    fn period_ends(&self, frequency: Frequency, count: usize) -> Vec<NaiveDate> {
        let mut ends = Vec::with_capacity(count);
        let (mut year, mut month) = (self.as_of.year(), self.as_of.month());
        while ends.len() < count {
            let closes = match frequency {
                Frequency::Quarterly => month % 3 == 0,
                Frequency::Annual => month == 12,
            };
            if let Some(end) = month_end(year, month).filter(|d| closes && *d <= self.as_of) {
                ends.push(end);
            }
            if month == 1 {
                month = 12;
                year -= 1;
            } else {
                month -= 1;
            }
        }
        ends.reverse();
        ends
    }

    fn statement(&self, symbol: &str, kind: StatementKind, frequency: Frequency) -> Statement {
        let key = format!("{symbol}:{kind}:{frequency}");
        let seed: [u8; 32] = *blake3::hash(key.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);
        let periods = self.period_ends(frequency, STATEMENT_PERIODS);

        let items = kind
            .line_items()
            .iter()
            .map(|&name| {
                let mut value: f64 = if name == "DilutedEPS" {
                    rng.gen_range(0.5..5.0)
                } else {
                    rng.gen_range(1.0e9..5.0e10)
                };
                if OUTFLOWS.contains(&name) {
                    value = -value;
                }
                let points = periods
                    .iter()
                    .map(|d| {
                        let point = (*d, value);
                        value *= 1.0 + rng.gen_range(-0.05..0.08);
                        point
                    })
                    .collect();
                (name.to_string(), points)
            })
            .collect();

        Statement::from_items(symbol, kind, frequency, items)
    }
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, window: &FetchWindow) -> Result<Series, DataError> {
        let observations = self.generate(symbol, window);
        if observations.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(Series::from_observations(symbol, observations))
    }

    fn fetch_statements(
        &self,
        symbol: &str,
        kind: StatementKind,
        frequency: Frequency,
    ) -> Result<Statement, DataError> {
        Ok(self.statement(symbol, kind, frequency))
    }

    fn is_available(&self) -> bool {
        true
    }
}
