//! Analysis error taxonomy.
//!
//! Structural errors (`EmptyInput`, `InvalidParameter`) abort a run. Per-symbol
//! errors (`InvalidSeries`, `DataUnavailable`) name the symbol so callers can
//! skip it and carry on with the rest of the batch.

use thiserror::Error;

use crate::data::DataError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("no symbols supplied")]
    EmptyInput,

    #[error("invalid series for '{symbol}': {reason}")]
    InvalidSeries { symbol: String, reason: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("data unavailable for '{symbol}': {reason}")]
    DataUnavailable { symbol: String, reason: String },
}

impl AnalysisError {
    pub fn invalid_series(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSeries {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Wrap a provider failure for one symbol.
    pub fn data_unavailable(symbol: impl Into<String>, err: &DataError) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: err.to_string(),
        }
    }

    /// The symbol this error is scoped to, if it is a per-symbol error.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::InvalidSeries { symbol, .. } | Self::DataUnavailable { symbol, .. } => {
                Some(symbol)
            }
            Self::EmptyInput | Self::InvalidParameter(_) => None,
        }
    }

    /// Per-symbol errors are recoverable: the rest of the batch can proceed.
    pub fn is_recoverable(&self) -> bool {
        self.symbol().is_some()
    }
}
