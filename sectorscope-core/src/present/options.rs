use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::SummaryRow;
use crate::error::AnalysisError;

/// Trendline the renderer should fit over the scatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trendline {
    None,
    /// Ordinary least squares.
    #[default]
    Ols,
    /// Locally weighted scatterplot smoothing.
    Lowess,
}

impl Trendline {
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Ols => Some("ols"),
            Self::Lowess => Some("lowess"),
        }
    }
}

impl fmt::Display for Trendline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key().unwrap_or("none"))
    }
}

impl FromStr for Trendline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "ols" => Ok(Self::Ols),
            "lowess" => Ok(Self::Lowess),
            other => Err(format!("unknown trendline '{other}' (expected none, ols, lowess)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub trendline: Trendline,
    /// Color scatter points by label and fit one trendline per label.
    pub color_by_group: bool,
    /// Plot volatility on x and mean on y.
    pub invert_axes: bool,
    /// Summary column that sizes scatter points.
    pub point_size_field: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            trendline: Trendline::Ols,
            color_by_group: true,
            invert_axes: true,
            point_size_field: "latest_price".to_string(),
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !SummaryRow::is_numeric_field(&self.point_size_field) {
            return Err(AnalysisError::invalid_parameter(format!(
                "unknown point size field '{}' (expected one of {})",
                self.point_size_field,
                SummaryRow::COLUMNS[2..].join(", ")
            )));
        }
        Ok(())
    }

    /// `(x, y)` summary fields for the scatter.
    pub fn axes(&self) -> (&'static str, &'static str) {
        if self.invert_axes {
            ("std", "mean")
        } else {
            ("mean", "std")
        }
    }
}
