//! Chart sinks and the render entry point.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::chart::{line_input, scatter_input, LineChart, ScatterChart, TrendlineScope};
use super::options::RenderOptions;
use crate::domain::{SummarySet, WideTable};
use crate::error::AnalysisError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("write chart {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("encode chart: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Receives renderer-neutral charts and draws them somewhere.
pub trait ChartSink {
    fn render_line(&mut self, chart: &LineChart) -> Result<(), RenderError>;
    fn render_scatter(&mut self, chart: &ScatterChart) -> Result<(), RenderError>;
}

/// Hand a line chart of `table` and a scatter of `summary` to the sink.
///
/// The table and summary may come from different variants.
pub fn render(
    sink: &mut dyn ChartSink,
    table: &WideTable,
    summary: &SummarySet,
    options: &RenderOptions,
    title_prefix: &str,
) -> Result<(), RenderError> {
    let scatter = scatter_input(
        format!("{title_prefix}: {} (mean vs volatility)", summary.variant.label()),
        summary,
        options,
    )?;
    let line = line_input(format!("{title_prefix}: {}", table.variant().label()), table);

    sink.render_line(&line)?;
    sink.render_scatter(&scatter)?;
    Ok(())
}

/// Writes Plotly figure JSON (`line.json`, `scatter.json`) into a directory.
///
/// Trendline requests travel in `layout.meta`; fitting is up to the viewer.
pub struct PlotlyJsonSink {
    dir: PathBuf,
}

impl PlotlyJsonSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn line_path(&self) -> PathBuf {
        self.dir.join("line.json")
    }

    pub fn scatter_path(&self) -> PathBuf {
        self.dir.join("scatter.json")
    }

    fn write(&self, path: &Path, figure: &Value) -> Result<(), RenderError> {
        let io_err = |source| RenderError::Io {
            path: path.display().to_string(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        let body = serde_json::to_string_pretty(figure)?;
        std::fs::write(path, body).map_err(io_err)
    }
}

impl ChartSink for PlotlyJsonSink {
    fn render_line(&mut self, chart: &LineChart) -> Result<(), RenderError> {
        self.write(&self.line_path(), &line_figure(chart))
    }

    fn render_scatter(&mut self, chart: &ScatterChart) -> Result<(), RenderError> {
        self.write(&self.scatter_path(), &scatter_figure(chart))
    }
}

pub fn line_figure(chart: &LineChart) -> Value {
    let dates: Vec<String> = chart.table.index().iter().map(|d| d.to_string()).collect();
    let traces: Vec<Value> = chart
        .table
        .columns()
        .iter()
        .map(|c| {
            json!({
                "type": "scatter",
                "mode": "lines",
                "name": c.symbol,
                "x": dates,
                "y": c.values,
                "connectgaps": false,
            })
        })
        .collect();

    json!({
        "data": traces,
        "layout": {
            "title": { "text": chart.title },
            "xaxis": { "title": { "text": "date" } },
            "yaxis": { "title": { "text": chart.table.variant().label() } },
        },
    })
}

/// Marker area scale so the largest point is about 40px across.
const MAX_MARKER_PX: f64 = 40.0;

pub fn scatter_figure(chart: &ScatterChart) -> Value {
    let max_size = chart
        .points
        .iter()
        .map(|p| p.size.abs())
        .fold(0.0_f64, f64::max);
    let sizeref = if max_size > 0.0 {
        2.0 * max_size / (MAX_MARKER_PX * MAX_MARKER_PX)
    } else {
        1.0
    };

    let groups: Vec<Option<&str>> = if chart.color_by_group {
        chart.groups().into_iter().map(Some).collect()
    } else {
        vec![None]
    };

    let traces: Vec<Value> = groups
        .iter()
        .map(|group| {
            let pts: Vec<_> = chart
                .points
                .iter()
                .filter(|p| group.map_or(true, |g| p.label == g))
                .collect();
            json!({
                "type": "scatter",
                "mode": "markers+text",
                "name": group.unwrap_or("all"),
                "x": pts.iter().map(|p| p.x).collect::<Vec<_>>(),
                "y": pts.iter().map(|p| p.y).collect::<Vec<_>>(),
                "text": pts.iter().map(|p| p.symbol.as_str()).collect::<Vec<_>>(),
                "textposition": "top center",
                "marker": {
                    "size": pts.iter().map(|p| p.size.abs()).collect::<Vec<_>>(),
                    "sizemode": "area",
                    "sizeref": sizeref,
                },
            })
        })
        .collect();

    json!({
        "data": traces,
        "layout": {
            "title": { "text": chart.title },
            "xaxis": { "title": { "text": chart.x_field } },
            "yaxis": { "title": { "text": chart.y_field } },
            "meta": {
                "trendline": chart.trendline.key(),
                "trendline_scope": match chart.trendline_scope {
                    TrendlineScope::PerGroup => "per_group",
                    TrendlineScope::Overall => "overall",
                },
                "size_field": chart.size_field,
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SummaryRow, TableColumn, TableVariant};
    use crate::stats::Describe;
    use chrono::NaiveDate;

    #[derive(Default)]
    struct Recorder {
        lines: Vec<LineChart>,
        scatters: Vec<ScatterChart>,
    }

    impl ChartSink for Recorder {
        fn render_line(&mut self, chart: &LineChart) -> Result<(), RenderError> {
            self.lines.push(chart.clone());
            Ok(())
        }

        fn render_scatter(&mut self, chart: &ScatterChart) -> Result<(), RenderError> {
            self.scatters.push(chart.clone());
            Ok(())
        }
    }

    fn fixtures() -> (WideTable, SummarySet) {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let table = WideTable::new(
            TableVariant::Level,
            vec![d(1), d(2)],
            vec![
                TableColumn {
                    symbol: "A".into(),
                    values: vec![Some(10.0), None],
                },
                TableColumn {
                    symbol: "B".into(),
                    values: vec![Some(5.0), Some(6.0)],
                },
            ],
        );
        let summary = SummarySet::new(
            TableVariant::CumulativeReturn,
            vec![
                SummaryRow::new("A", "Tech", Some(10.0), Some(0.0), Describe::of_present(&[0.0, 1.0])),
                SummaryRow::new("B", "Energy", Some(6.0), Some(0.2), Describe::of_present(&[0.0, 0.2])),
            ],
        );
        (table, summary)
    }

    #[test]
    fn render_mixes_variants() {
        let (table, summary) = fixtures();
        let mut sink = Recorder::default();
        render(&mut sink, &table, &summary, &RenderOptions::default(), "Energy").unwrap();

        assert_eq!(sink.lines[0].title, "Energy: Closing Prices");
        assert_eq!(sink.lines[0].table.variant(), TableVariant::Level);
        assert!(sink.scatters[0].title.starts_with("Energy: Cumulative Returns"));
        assert_eq!(sink.scatters[0].points.len(), 2);
    }

    #[test]
    fn render_rejects_bad_size_field_before_drawing() {
        let (table, summary) = fixtures();
        let mut sink = Recorder::default();
        let opts = RenderOptions {
            point_size_field: "volume".into(),
            ..RenderOptions::default()
        };
        let err = render(&mut sink, &table, &summary, &opts, "x").unwrap_err();
        assert!(matches!(err, RenderError::Analysis(AnalysisError::InvalidParameter(_))));
        assert!(sink.lines.is_empty());
    }

    #[test]
    fn line_figure_keeps_gaps_as_null() {
        let (table, _) = fixtures();
        let fig = line_figure(&line_input("t", &table));
        assert_eq!(fig["data"][0]["y"][1], Value::Null);
        assert_eq!(fig["data"][1]["y"][1], json!(6.0));
    }

    #[test]
    fn scatter_figure_has_one_trace_per_group() {
        let (_, summary) = fixtures();
        let chart = scatter_input("t", &summary, &RenderOptions::default()).unwrap();
        let fig = scatter_figure(&chart);
        assert_eq!(fig["data"].as_array().unwrap().len(), 2);
        assert_eq!(fig["layout"]["meta"]["trendline"], json!("ols"));
        assert_eq!(fig["layout"]["meta"]["trendline_scope"], json!("per_group"));
    }

    #[test]
    fn plotly_sink_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let (table, summary) = fixtures();
        let mut sink = PlotlyJsonSink::new(dir.path().join("charts"));
        render(&mut sink, &table, &summary, &RenderOptions::default(), "x").unwrap();

        let line: Value =
            serde_json::from_str(&std::fs::read_to_string(sink.line_path()).unwrap()).unwrap();
        assert_eq!(line["data"].as_array().unwrap().len(), 2);
        assert!(sink.scatter_path().exists());
    }
}
