//! Per-symbol value series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// One dated observation from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A named, date-ordered series of values for one symbol.
///
/// Dates are strictly increasing. Construction through
/// [`Series::from_observations`] sorts stably and drops repeated dates,
/// keeping the first occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    symbol: String,
    observations: Vec<Observation>,
}

impl Series {
    pub fn from_observations(symbol: impl Into<String>, mut observations: Vec<Observation>) -> Self {
        // Stable sort keeps duplicates in arrival order, so dedup_by_key keeps the first.
        observations.sort_by_key(|o| o.date);
        observations.dedup_by_key(|o| o.date);
        Self {
            symbol: symbol.into(),
            observations,
        }
    }

    /// Build from parallel date/value slices (test and fixture helper).
    pub fn from_pairs(symbol: impl Into<String>, pairs: &[(NaiveDate, f64)]) -> Self {
        Self::from_observations(
            symbol,
            pairs.iter().map(|&(d, v)| Observation::new(d, v)).collect(),
        )
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.observations.iter().map(|o| o.date)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().map(|o| o.value)
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Check the series can feed the aggregator.
    ///
    /// Rejects empty series, non-finite values, and a zero first value
    /// (cumulative return divides by it).
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let first = self
            .observations
            .first()
            .ok_or_else(|| AnalysisError::invalid_series(&self.symbol, "series is empty"))?;

        if let Some(bad) = self.observations.iter().find(|o| !o.value.is_finite()) {
            return Err(AnalysisError::invalid_series(
                &self.symbol,
                format!("non-finite value on {}", bad.date),
            ));
        }

        if first.value == 0.0 {
            return Err(AnalysisError::invalid_series(
                &self.symbol,
                format!("first value on {} is zero", first.date),
            ));
        }

        Ok(())
    }
}
