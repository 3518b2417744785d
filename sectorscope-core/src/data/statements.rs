//! Statement collection across many symbols.
//!
//! Same contract as [`fetch_batch`](super::fetch_batch): a symbol that fails,
//! including one that is not an equity, is recorded and skipped.

use super::provider::{DataError, DataProvider, DownloadProgress};
use crate::domain::{Frequency, Statement, StatementKind, StatementTable};

/// Outcome of collecting one statement kind at one frequency.
#[derive(Debug)]
pub struct StatementBatch {
    pub table: StatementTable,
    /// Symbols with no statement, with the reason.
    pub failures: Vec<(String, DataError)>,
}

pub fn collect_statements<S: AsRef<str>>(
    provider: &dyn DataProvider,
    symbols: &[S],
    kind: StatementKind,
    frequency: Frequency,
    progress: &dyn DownloadProgress,
) -> StatementBatch {
    let total = symbols.len();
    let mut statements: Vec<Statement> = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        let symbol = symbol.as_ref();
        progress.on_start(symbol, i, total);

        match provider.fetch_statements(symbol, kind, frequency) {
            Ok(statement) if statement.is_empty() => {
                let e = DataError::Other(format!("no {} {} reported", frequency.key(), kind.key()));
                progress.on_complete(symbol, i, total, &Err(e.clone()));
                failures.push((symbol.to_string(), e));
            }
            Ok(statement) => {
                progress.on_complete(symbol, i, total, &Ok(()));
                statements.push(statement);
            }
            Err(e) => {
                progress.on_complete(symbol, i, total, &Err(e.clone()));
                failures.push((symbol.to_string(), e));
            }
        }

        if !provider.is_available() {
            for sym in &symbols[(i + 1)..total] {
                failures.push((sym.as_ref().to_string(), DataError::CircuitBreakerTripped));
            }
            break;
        }
    }

    progress.on_batch_complete(statements.len(), failures.len(), total);
    StatementBatch {
        table: StatementTable::combine(kind, frequency, &statements),
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{FetchWindow, NoProgress};
    use crate::data::CircuitBreaker;
    use crate::domain::Series;
    use chrono::NaiveDate;
    use std::time::Duration;

    /// `SPY` is a fund; `BAN` gets the provider blocked.
    struct FilingsProvider {
        breaker: CircuitBreaker,
    }

    impl DataProvider for FilingsProvider {
        fn name(&self) -> &str {
            "filings"
        }

        fn fetch(&self, symbol: &str, _window: &FetchWindow) -> Result<Series, DataError> {
            Err(DataError::SymbolNotFound {
                symbol: symbol.into(),
            })
        }

        fn fetch_statements(
            &self,
            symbol: &str,
            kind: StatementKind,
            frequency: Frequency,
        ) -> Result<Statement, DataError> {
            match symbol {
                "SPY" => Err(DataError::NotAnEquity {
                    symbol: symbol.into(),
                    quote_type: "ETF".into(),
                }),
                "BAN" => {
                    self.breaker.trip();
                    Err(DataError::CircuitBreakerTripped)
                }
                _ => {
                    let d = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
                    Ok(Statement::from_items(
                        symbol,
                        kind,
                        frequency,
                        vec![("NetIncome".into(), vec![(d, 1.5)])],
                    ))
                }
            }
        }

        fn is_available(&self) -> bool {
            self.breaker.is_allowed()
        }
    }

    fn provider() -> FilingsProvider {
        FilingsProvider {
            breaker: CircuitBreaker::new(Duration::from_secs(60)),
        }
    }

    #[test]
    fn funds_are_skipped_and_equities_combined() {
        let batch = collect_statements(
            &provider(),
            &["XOM", "SPY", "CVX"],
            StatementKind::Financials,
            Frequency::Quarterly,
            &NoProgress,
        );
        assert_eq!(batch.table.symbols(), vec!["XOM", "CVX"]);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].0, "SPY");
        assert!(matches!(batch.failures[0].1, DataError::NotAnEquity { .. }));
    }

    #[test]
    fn blocked_provider_stops_collection() {
        let batch = collect_statements(
            &provider(),
            &["XOM", "BAN", "CVX", "COP"],
            StatementKind::CashFlow,
            Frequency::Annual,
            &NoProgress,
        );
        assert_eq!(batch.table.symbols(), vec!["XOM"]);
        let failed: Vec<&str> = batch.failures.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(failed, vec!["BAN", "CVX", "COP"]);
        assert!(batch
            .failures
            .iter()
            .all(|(_, e)| *e == DataError::CircuitBreakerTripped));
    }

    #[test]
    fn providers_without_statements_fail_every_symbol() {
        struct PricesOnly;
        impl DataProvider for PricesOnly {
            fn name(&self) -> &str {
                "prices_only"
            }
            fn fetch(&self, symbol: &str, _: &FetchWindow) -> Result<Series, DataError> {
                Err(DataError::SymbolNotFound {
                    symbol: symbol.into(),
                })
            }
            fn is_available(&self) -> bool {
                true
            }
        }

        let batch = collect_statements(
            &PricesOnly,
            &["XOM"],
            StatementKind::Financials,
            Frequency::Annual,
            &NoProgress,
        );
        assert!(batch.table.is_empty());
        assert!(batch.failures[0]
            .1
            .to_string()
            .contains("does not serve annual financials"));
    }
}
