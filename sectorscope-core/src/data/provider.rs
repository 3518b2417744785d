//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, synthetic
//! random walks) so the pipeline can swap implementations and mock for tests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{Frequency, Series, Statement, StatementKind};

/// How far back a fetch reaches, in the provider's range vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[default]
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
            Self::YearToDate => "ytd",
            Self::Max => "max",
        }
    }

    /// Approximate calendar length, used by the synthetic provider.
    /// `None` for ranges anchored to a date (`ytd`) or unbounded (`max`).
    pub fn approx_days(&self) -> Option<i64> {
        match self {
            Self::OneDay => Some(1),
            Self::FiveDays => Some(5),
            Self::OneMonth => Some(30),
            Self::ThreeMonths => Some(91),
            Self::SixMonths => Some(182),
            Self::OneYear => Some(365),
            Self::TwoYears => Some(730),
            Self::FiveYears => Some(1826),
            Self::TenYears => Some(3652),
            Self::YearToDate | Self::Max => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.code() == lower)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|p| p.code()).collect();
                format!("unknown period '{s}'. Valid: {}", valid.join(", "))
            })
    }
}

/// Bar spacing. Only daily-or-coarser bars fit the date-keyed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
    #[serde(rename = "1mo")]
    Monthly,
}

impl Interval {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Daily => "1d",
            Self::Weekly => "1wk",
            Self::Monthly => "1mo",
        }
    }

    /// Calendar days between consecutive bars.
    pub fn step_days(&self) -> i64 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Monthly => 30,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1d" => Ok(Self::Daily),
            "1wk" => Ok(Self::Weekly),
            "1mo" => Ok(Self::Monthly),
            _ => Err(format!("unknown interval '{s}'. Valid: 1d, 1wk, 1mo")),
        }
    }
}

/// Which price column a provider reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    #[default]
    Close,
    AdjClose,
}

/// Time window for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchWindow {
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub interval: Interval,
}

impl FetchWindow {
    pub fn new(period: Period, interval: Interval) -> Self {
        Self { period, interval }
    }
}

/// Structured error types for data operations.
///
/// Every variant is a per-symbol, recoverable failure from the pipeline's
/// point of view.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("{symbol} is a {quote_type}, not an equity; it has no financial statements")]
    NotAnEquity { symbol: String, quote_type: String },

    #[error("{provider} does not serve {what}")]
    Unsupported { provider: String, what: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for data providers.
///
/// Implementations return a canonical [`Series`] (sorted, one value per date)
/// or a [`DataError`] for the symbol.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch one value series for a symbol over a window.
    fn fetch(&self, symbol: &str, window: &FetchWindow) -> Result<Series, DataError>;

    /// Fetch one financial statement for a symbol.
    ///
    /// Symbols that are not equities (indices, ETFs) fail with
    /// [`DataError::NotAnEquity`].
    fn fetch_statements(
        &self,
        symbol: &str,
        kind: StatementKind,
        frequency: Frequency,
    ) -> Result<Statement, DataError> {
        let _ = symbol;
        Err(DataError::Unsupported {
            provider: self.name().to_string(),
            what: format!("{} {}", frequency.key(), kind.key()),
        })
    }

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;
}

/// Progress callback for multi-symbol operations.
pub trait DownloadProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<(), DataError>);

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that emits tracing events.
pub struct LogProgress;

impl DownloadProgress for LogProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        tracing::debug!("[{}/{}] fetching {symbol}", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: &Result<(), DataError>,
    ) {
        match result {
            Ok(()) => tracing::debug!("fetched {symbol}"),
            Err(e) => tracing::warn!("skipping {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!("fetch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// Progress reporter that does nothing.
pub struct NoProgress;

impl DownloadProgress for NoProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}

    fn on_complete(&self, _: &str, _: usize, _: usize, _: &Result<(), DataError>) {}

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_codes_roundtrip() {
        for p in Period::ALL {
            assert_eq!(p.code().parse::<Period>().unwrap(), p);
        }
        assert!("7y".parse::<Period>().is_err());
    }

    #[test]
    fn interval_parse() {
        assert_eq!("1WK".parse::<Interval>().unwrap(), Interval::Weekly);
        assert!("1m".parse::<Interval>().is_err());
    }

    #[test]
    fn window_defaults_to_ytd_daily() {
        let w = FetchWindow::default();
        assert_eq!(w.period, Period::YearToDate);
        assert_eq!(w.interval, Interval::Daily);
    }

    #[test]
    fn window_deserializes_from_codes() {
        let w: FetchWindow = toml::from_str("period = \"6mo\"\ninterval = \"1wk\"").unwrap();
        assert_eq!(w, FetchWindow::new(Period::SixMonths, Interval::Weekly));
    }
}
