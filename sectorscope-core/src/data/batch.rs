//! Batch fetch — coordinates multi-symbol fetches with progress reporting.
//!
//! A failure for one symbol is recorded and the batch moves on. When the
//! provider stops being available (circuit breaker), the remaining symbols
//! are recorded as failed without being requested.

use super::provider::{DataError, DataProvider, DownloadProgress, FetchWindow};
use crate::domain::Series;

/// Outcome of a batch fetch.
#[derive(Debug, Default)]
pub struct FetchBatch {
    /// Successfully fetched series, in request order.
    pub series: Vec<Series>,
    /// Symbols that could not be fetched, with the reason.
    pub failures: Vec<(String, DataError)>,
}

impl FetchBatch {
    pub fn total(&self) -> usize {
        self.series.len() + self.failures.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn fetch_batch<S: AsRef<str>>(
    provider: &dyn DataProvider,
    symbols: &[S],
    window: &FetchWindow,
    progress: &dyn DownloadProgress,
) -> FetchBatch {
    let total = symbols.len();
    let mut batch = FetchBatch::default();

    for (i, symbol) in symbols.iter().enumerate() {
        let symbol = symbol.as_ref();
        progress.on_start(symbol, i, total);

        match provider.fetch(symbol, window) {
            Ok(series) => {
                progress.on_complete(symbol, i, total, &Ok(()));
                batch.series.push(series);
            }
            Err(e) => {
                progress.on_complete(symbol, i, total, &Err(e.clone()));
                batch.failures.push((symbol.to_string(), e));
            }
        }

        // Bail out early if the circuit breaker tripped
        if !provider.is_available() {
            for sym in &symbols[(i + 1)..total] {
                batch
                    .failures
                    .push((sym.as_ref().to_string(), DataError::CircuitBreakerTripped));
            }
            break;
        }
    }

    progress.on_batch_complete(batch.series.len(), batch.failures.len(), total);
    batch
}
