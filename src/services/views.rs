//! Page-level computations for the overview, analysis and visualization views.
//!
//! Every view reads the dataset from the [`Session`] it is given. Each section
//! is computed on its own; a failing section becomes an inline notice and the
//! rest of the page still renders.

use serde::{Deserialize, Serialize};
use crate::error::DiagnosticsError;
use crate::models::{
    selection, ChartRequest, ColumnMap, CorrelationMatrix, Dataset, DescribeTable, PlotKind, Profile,
    ValueCounts,
};
use crate::services::charts::{build_chart, ChartOutcome};
use crate::services::preview::{preview, Preview};
use crate::services::profiler::profile;
use crate::services::statistics::{correlate, describe, value_counts};
use crate::session::Session;

pub const OVERVIEW_PREVIEW_ROWS: usize = 50;
pub const ANALYSIS_PREVIEW_ROWS: usize = 100;
pub const NO_DATA_MESSAGE: &str = "No data found. Upload a file or select a sample to continue.";

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum View<T> {
    NoData { message: String },
    Ready(T),
}

impl<T> View<T> {
    fn render(session: &Session, page: impl FnOnce(&Dataset) -> T) -> Self {
        match session.dataset() {
            Some(dataset) => View::Ready(page(dataset)),
            None => View::NoData {
                message: NO_DATA_MESSAGE.to_string(),
            },
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            View::Ready(page) => Some(page),
            View::NoData { .. } => None,
        }
    }
}

/// One independently computed part of a page.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    Ready(T),
    Notice { message: String },
}

impl<T> Section<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            Section::Notice { .. } => None,
        }
    }

    pub fn notice(&self) -> Option<&str> {
        match self {
            Section::Ready(_) => None,
            Section::Notice { message } => Some(message),
        }
    }
}

impl<T> From<Result<T, DiagnosticsError>> for Section<T> {
    fn from(result: Result<T, DiagnosticsError>) -> Self {
        match result {
            Ok(value) => Section::Ready(value),
            Err(e) => {
                tracing::debug!("Section rendered as notice: {}", e);
                Section::Notice {
                    message: e.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OverviewPage {
    pub name: String,
    pub preview: Section<Preview>,
    pub profile: Profile,
    pub summary: Section<DescribeTable>,
    pub null_counts: ColumnMap<usize>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisPage {
    pub name: String,
    pub shape: String,
    pub rows: usize,
    pub cols: usize,
    pub preview: Section<Preview>,
    pub summary: Section<DescribeTable>,
    pub null_counts: ColumnMap<usize>,
    pub columns: Vec<String>,
    pub selected_column: Option<String>,
    pub value_counts: Section<ValueCounts>,
    pub correlation: Section<CorrelationMatrix>,
}

#[derive(Debug, Serialize)]
pub struct VisualizationPage {
    pub columns: Vec<String>,
    pub plot_kinds: Vec<PlotKind>,
    pub chart: Section<ChartOutcome>,
}

/// Raw widget values from the visualization page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartSelection {
    pub x: Option<String>,
    pub y: Option<String>,
    pub color: Option<String>,
    pub kind: Option<String>,
}

impl ChartSelection {
    /// Fills in defaults: first column for x, scatter for the kind.
    fn to_request(&self, dataset: &Dataset) -> Result<ChartRequest, DiagnosticsError> {
        let kind = match selection(self.kind.as_deref()) {
            Some(kind) => kind.parse()?,
            None => PlotKind::default(),
        };
        let x = selection(self.x.as_deref())
            .or_else(|| dataset.column_names().into_iter().next())
            .ok_or_else(|| DiagnosticsError::ChartConstruction("the dataset has no columns".to_string()))?;

        Ok(ChartRequest::new(x, kind)
            .with_y(self.y.as_deref())
            .with_color(self.color.as_deref()))
    }
}

pub fn overview(session: &Session) -> View<OverviewPage> {
    View::render(session, |dataset| {
        let profile = profile(dataset);
        OverviewPage {
            name: dataset.name().to_string(),
            preview: preview(dataset, OVERVIEW_PREVIEW_ROWS).into(),
            null_counts: profile.null_counts.clone(),
            profile,
            summary: describe(dataset).into(),
        }
    })
}

/// `column` is the value-counts selection; it defaults to the first column.
pub fn analysis(session: &Session, column: Option<&str>) -> View<AnalysisPage> {
    View::render(session, |dataset| {
        let profile = profile(dataset);
        let selected_column = selection(column).or_else(|| profile.columns.first().cloned());
        let value_counts = match &selected_column {
            Some(column) => value_counts(dataset, column).into(),
            None => Section::Notice {
                message: "The dataset has no columns.".to_string(),
            },
        };

        AnalysisPage {
            name: dataset.name().to_string(),
            shape: format!("{} rows × {} columns", profile.rows, profile.cols),
            rows: profile.rows,
            cols: profile.cols,
            preview: preview(dataset, ANALYSIS_PREVIEW_ROWS).into(),
            summary: describe(dataset).into(),
            null_counts: profile.null_counts,
            columns: profile.columns,
            selected_column,
            value_counts,
            correlation: correlate(dataset).into(),
        }
    })
}

pub fn visualization(session: &Session, chart: &ChartSelection) -> View<VisualizationPage> {
    View::render(session, |dataset| {
        let outcome = chart
            .to_request(dataset)
            .and_then(|request| build_chart(dataset, &request));

        VisualizationPage {
            columns: dataset.column_names(),
            plot_kinds: PlotKind::ALL.to_vec(),
            chart: outcome.into(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::loader::load;
    use crate::services::samples::load_sample;
    use bytes::Bytes;

    fn session(csv: &str) -> Session {
        Session::with_dataset(load(Bytes::from(csv.to_string()), Some("view.csv")).unwrap())
    }

    #[test]
    fn test_views_without_data_compute_nothing() {
        let empty = Session::default();
        assert!(matches!(overview(&empty), View::NoData { .. }));
        assert!(matches!(analysis(&empty, Some("a")), View::NoData { .. }));
        assert!(matches!(
            visualization(&empty, &ChartSelection::default()),
            View::NoData { ref message } if message == NO_DATA_MESSAGE
        ));
    }

    #[test]
    fn test_overview_of_iris() {
        let iris = Session::with_dataset(load_sample("iris").unwrap().unwrap());
        let view = overview(&iris);
        let page = view.ready().unwrap();

        assert_eq!(page.profile.rows, 150);
        assert_eq!(page.preview.ready().unwrap().rows.len(), OVERVIEW_PREVIEW_ROWS);
        assert_eq!(page.summary.ready().unwrap().columns.len(), 5);
        assert_eq!(page.null_counts.values().sum::<usize>(), 0);
    }

    #[test]
    fn test_text_only_dataset_keeps_other_sections() {
        let text = session("name,city\nana,Lisbon\nrui,\n");
        let view = analysis(&text, None);
        let page = view.ready().unwrap();

        assert_eq!(page.summary.notice(), Some("No numeric columns detected."));
        assert_eq!(page.correlation.notice(), Some("Need at least 2 numeric columns for correlation."));
        assert_eq!(page.selected_column.as_deref(), Some("name"));
        assert_eq!(page.value_counts.ready().unwrap().entries.len(), 2);
        assert_eq!(page.null_counts.get("city"), Some(&1));
        assert_eq!(page.shape, "2 rows × 2 columns");
    }

    #[test]
    fn test_stale_value_count_selection_is_inline() {
        let data = session("a,b\n1,2\n3,4\n");
        let view = analysis(&data, Some("dropped"));
        let page = view.ready().unwrap();

        assert_eq!(page.value_counts.notice(), Some("Unknown column: dropped"));
        assert!(page.correlation.ready().is_some());
        assert!(page.summary.ready().is_some());
    }

    #[test]
    fn test_visualization_defaults_and_errors() {
        let data = session("x,y,label\n1.0,2.0,a\n2.0,4.0,b\n");

        let default_view = visualization(&data, &ChartSelection::default());
        let page = default_view.ready().unwrap();
        assert_eq!(page.columns, vec!["x", "y", "label"]);
        assert!(matches!(page.chart.ready(), Some(ChartOutcome::NoOp { .. })));

        let bad_kind = ChartSelection {
            kind: Some("Pie".to_string()),
            ..Default::default()
        };
        let view = visualization(&data, &bad_kind);
        assert!(view.ready().unwrap().chart.notice().unwrap().contains("unsupported plot kind"));

        let rejected = ChartSelection {
            x: Some("label".to_string()),
            kind: Some("Box".to_string()),
            ..Default::default()
        };
        let view = visualization(&data, &rejected);
        assert!(view.ready().unwrap().chart.notice().unwrap().starts_with("Plot failed:"));
    }

    #[test]
    fn test_view_serialization_tags() {
        let json = serde_json::to_value(overview(&Session::default())).unwrap();
        assert_eq!(json["status"], "no_data");

        let data = session("x,y\n1,2\n2,3\n");
        let chart = ChartSelection {
            y: Some("y".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(visualization(&data, &chart)).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["chart"]["status"], "ready");
        assert_eq!(json["chart"]["outcome"], "spec");
        assert_eq!(json["chart"]["y"]["column"], "y");
    }
}
