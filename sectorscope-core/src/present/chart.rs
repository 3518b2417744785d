//! Renderer-neutral chart inputs.
//!
//! The core decides what is plotted; fitting trendlines and drawing pixels are
//! left to the sink.

use serde::{Deserialize, Serialize};

use super::options::{RenderOptions, Trendline};
use crate::domain::{SummarySet, WideTable};
use crate::error::AnalysisError;

/// One line per column over the table's date index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    pub title: String,
    pub table: WideTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub symbol: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

/// Whether a trendline is fit per label group or over all points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendlineScope {
    PerGroup,
    Overall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_field: String,
    pub y_field: String,
    pub size_field: String,
    pub points: Vec<ScatterPoint>,
    pub trendline: Trendline,
    pub trendline_scope: TrendlineScope,
    pub color_by_group: bool,
}

impl ScatterChart {
    /// Distinct labels in first-seen order.
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for p in &self.points {
            if !groups.contains(&p.label.as_str()) {
                groups.push(&p.label);
            }
        }
        groups
    }
}

pub fn line_input(title: impl Into<String>, table: &WideTable) -> LineChart {
    LineChart {
        title: title.into(),
        table: table.clone(),
    }
}

/// Build the mean/volatility scatter from a summary.
///
/// Rows missing either plotted statistic or the size field are dropped.
pub fn scatter_input(
    title: impl Into<String>,
    summary: &SummarySet,
    options: &RenderOptions,
) -> Result<ScatterChart, AnalysisError> {
    options.validate()?;
    let (x_field, y_field) = options.axes();
    let size_field = options.point_size_field.as_str();

    let points: Vec<ScatterPoint> = summary
        .rows
        .iter()
        .filter_map(|row| {
            Some(ScatterPoint {
                symbol: row.symbol.clone(),
                label: row.label.clone(),
                x: row.field(x_field)?,
                y: row.field(y_field)?,
                size: row.field(size_field)?,
            })
        })
        .collect();

    if points.len() < summary.len() {
        tracing::debug!(
            dropped = summary.len() - points.len(),
            "scatter rows without data left out"
        );
    }

    Ok(ScatterChart {
        title: title.into(),
        x_field: x_field.to_string(),
        y_field: y_field.to_string(),
        size_field: size_field.to_string(),
        points,
        trendline: options.trendline,
        trendline_scope: if options.color_by_group {
            TrendlineScope::PerGroup
        } else {
            TrendlineScope::Overall
        },
        color_by_group: options.color_by_group,
    })
}
