//! Presenter — renderer-neutral chart inputs and the sinks that draw them.

pub mod chart;
pub mod options;
pub mod sink;

pub use chart::{line_input, scatter_input, LineChart, ScatterChart, ScatterPoint, TrendlineScope};
pub use options::{RenderOptions, Trendline};
pub use sink::{render, ChartSink, PlotlyJsonSink, RenderError};
