//! Yahoo Finance data provider.
//!
//! Fetches closing prices from Yahoo's v8 chart API using its `range` and
//! `interval` parameters, and financial statements from the
//! fundamentals-timeseries API. Handles rate limiting, retries with
//! exponential backoff, response parsing, and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataProvider, FetchWindow, Interval, Period, PriceField};
use crate::domain::{Frequency, Observation, Series, Statement, StatementKind};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Earliest statement period requested (2016-12-31 UTC).
const STATEMENTS_SINCE: i64 = 1_483_142_400;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "instrumentType")]
    instrument_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    timeseries: TimeseriesResult,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResult {
    result: Option<Vec<TimeseriesEntry>>,
}

/// One requested line item. Its points live under a key equal to the type
/// name, e.g. `quarterlyNetIncome`.
#[derive(Debug, Deserialize)]
struct TimeseriesEntry {
    meta: TimeseriesMeta,
    #[serde(flatten)]
    fields: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesMeta {
    #[serde(rename = "type")]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ReportedPoint {
    #[serde(rename = "asOfDate")]
    as_of_date: NaiveDate,
    #[serde(rename = "reportedValue")]
    reported_value: Option<ReportedValue>,
}

#[derive(Debug, Deserialize)]
struct ReportedValue {
    raw: f64,
}

pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    price_field: PriceField,
    /// `instrumentType` per symbol, looked up once.
    quote_types: Mutex<HashMap<String, String>>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            price_field: PriceField::default(),
            quote_types: Mutex::new(HashMap::new()),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    pub fn with_price_field(mut self, price_field: PriceField) -> Self {
        self.price_field = price_field;
        self
    }

    fn chart_url(symbol: &str, window: &FetchWindow) -> String {
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?range={}&interval={}&includeAdjustedClose=true",
            window.period.code(),
            window.interval.code()
        )
    }

    fn timeseries_url(
        symbol: &str,
        kind: StatementKind,
        frequency: Frequency,
        until: i64,
    ) -> String {
        let types: Vec<String> = kind
            .line_items()
            .iter()
            .map(|item| format!("{}{item}", frequency.key()))
            .collect();
        format!(
            "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries/{symbol}\
             ?symbol={symbol}&type={}&period1={STATEMENTS_SINCE}&period2={until}",
            types.join(",")
        )
    }

    fn first_result(symbol: &str, resp: ChartResponse) -> Result<ChartData, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))
    }

    /// Parse the chart API response into a series.
    fn parse_response(
        symbol: &str,
        resp: ChartResponse,
        price_field: PriceField,
    ) -> Result<Series, DataError> {
        let data = Self::first_result(symbol, resp)?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| DataError::ResponseFormatChanged("no timestamps".into()))?;

        let values = match price_field {
            PriceField::Close => data
                .indicators
                .quote
                .into_iter()
                .next()
                .map(|q| q.close)
                .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?,
            PriceField::AdjClose => data
                .indicators
                .adjclose
                .and_then(|v| v.into_iter().next())
                .map(|a| a.adjclose)
                .ok_or_else(|| DataError::ResponseFormatChanged("no adjclose data".into()))?,
        };

        let mut observations = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            // Holidays and halted sessions come back as nulls
            if let Some(value) = values.get(i).copied().flatten() {
                observations.push(Observation::new(date, value));
            }
        }

        if observations.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(Series::from_observations(symbol, observations))
    }

    /// Read `instrumentType` (`EQUITY`, `ETF`, `INDEX`, ...) from a chart response.
    fn parse_quote_type(symbol: &str, resp: ChartResponse) -> Result<String, DataError> {
        Self::first_result(symbol, resp)?
            .meta
            .and_then(|m| m.instrument_type)
            .ok_or_else(|| DataError::ResponseFormatChanged("no instrumentType in meta".into()))
    }

    /// Parse a fundamentals-timeseries response into a statement.
    ///
    /// Item order follows [`StatementKind::line_items`]; unreported items and
    /// null points are dropped.
    fn parse_statement(
        symbol: &str,
        kind: StatementKind,
        frequency: Frequency,
        resp: TimeseriesResponse,
    ) -> Result<Statement, DataError> {
        let entries = resp.timeseries.result.ok_or_else(|| {
            DataError::ResponseFormatChanged("timeseries result is missing".into())
        })?;

        let mut found: HashMap<String, Vec<(NaiveDate, f64)>> = HashMap::new();
        for mut entry in entries {
            let Some(type_name) = entry.meta.types.first().cloned() else {
                continue;
            };
            let Some(item) = type_name.strip_prefix(frequency.key()) else {
                continue;
            };
            let Some(raw) = entry.fields.remove(&type_name) else {
                continue;
            };
            let points: Vec<Option<ReportedPoint>> = serde_json::from_value(raw)
                .map_err(|e| DataError::ResponseFormatChanged(format!("{type_name}: {e}")))?;
            let values = points
                .into_iter()
                .flatten()
                .filter_map(|p| p.reported_value.map(|v| (p.as_of_date, v.raw)))
                .collect();
            found.insert(item.to_string(), values);
        }

        let items = kind
            .line_items()
            .iter()
            .filter_map(|name| found.remove(*name).map(|v| (name.to_string(), v)))
            .collect();
        Ok(Statement::from_items(symbol, kind, frequency, items))
    }

    fn fetch_with_retry(&self, symbol: &str, window: &FetchWindow) -> Result<Series, DataError> {
        let chart: ChartResponse = self.get_json(symbol, &Self::chart_url(symbol, window))?;
        Self::parse_response(symbol, chart, self.price_field)
    }

    fn quote_type(&self, symbol: &str) -> Result<String, DataError> {
        let cached = self
            .quote_types
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .cloned();
        if let Some(quote_type) = cached {
            return Ok(quote_type);
        }

        let window = FetchWindow::new(Period::FiveDays, Interval::Daily);
        let chart: ChartResponse = self.get_json(symbol, &Self::chart_url(symbol, &window))?;
        let quote_type = Self::parse_quote_type(symbol, chart)?;
        self.quote_types
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.to_string(), quote_type.clone());
        Ok(quote_type)
    }

    /// GET a JSON document with retries, backoff and circuit-breaker bookkeeping.
    fn get_json<T: DeserializeOwned>(&self, symbol: &str, url: &str) -> Result<T, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!("retrying {symbol} in {delay:?} (attempt {attempt})");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::FORBIDDEN {
                        self.circuit_breaker.trip();
                        return Err(DataError::CircuitBreakerTripped);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        self.circuit_breaker.record_failure();
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(DataError::SymbolNotFound {
                            symbol: symbol.to_string(),
                        });
                    }

                    if !status.is_success() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    let body: T = resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to parse response for {symbol}: {e}"
                        ))
                    })?;
                    self.circuit_breaker.record_success();
                    return Ok(body);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, window: &FetchWindow) -> Result<Series, DataError> {
        self.fetch_with_retry(symbol, window)
    }

    fn fetch_statements(
        &self,
        symbol: &str,
        kind: StatementKind,
        frequency: Frequency,
    ) -> Result<Statement, DataError> {
        let quote_type = self.quote_type(symbol)?;
        if !quote_type.eq_ignore_ascii_case("EQUITY") {
            return Err(DataError::NotAnEquity {
                symbol: symbol.to_string(),
                quote_type,
            });
        }
        let url = Self::timeseries_url(symbol, kind, frequency, chrono::Utc::now().timestamp());
        let resp: TimeseriesResponse = self.get_json(symbol, &url)?;
        Self::parse_statement(symbol, kind, frequency, resp)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
