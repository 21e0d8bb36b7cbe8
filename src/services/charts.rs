//! Declarative chart specifications for the client-side chart engine.
//!
//! Each plot kind has its own builder. Builders validate the column roles
//! for their kind and copy the referenced columns into the spec, so the
//! renderer never needs access to the dataset itself.

use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use crate::error::DiagnosticsError;
use crate::models::{ChartRequest, Dataset, PlotKind};
use crate::services::preview::column_json;
use crate::services::profiler::dtype_name;
use crate::services::statistics::value_counts;

/// Axis name used for the tallies of a count plot.
pub const COUNT_AXIS: &str = "count";
pub const INVALID_AXES_MESSAGE: &str = "Select a valid combination of axes.";

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub column: String,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub kind: PlotKind,
    pub x: Axis,
    pub y: Option<Axis>,
    /// Categorical split passed through to the renderer.
    pub color: Option<Axis>,
    /// `true` when `y` holds value counts of `x` rather than a table column.
    pub counts: bool,
}

impl ChartSpec {
    pub fn referenced_columns(&self) -> SmallVec<[&str; 3]> {
        let mut columns = SmallVec::new();
        columns.push(self.x.column.as_str());
        if let Some(y) = &self.y {
            if !self.counts {
                columns.push(y.column.as_str());
            }
        }
        if let Some(color) = &self.color {
            columns.push(color.column.as_str());
        }
        columns
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChartOutcome {
    Spec(ChartSpec),
    NoOp { message: String },
}

impl ChartOutcome {
    fn no_op() -> Self {
        ChartOutcome::NoOp {
            message: INVALID_AXES_MESSAGE.to_string(),
        }
    }

    pub fn spec(&self) -> Option<&ChartSpec> {
        match self {
            ChartOutcome::Spec(spec) => Some(spec),
            ChartOutcome::NoOp { .. } => None,
        }
    }
}

fn axis(dataset: &Dataset, column: &str) -> Result<Axis, DiagnosticsError> {
    let series = dataset.column(column)?;
    Ok(Axis {
        column: column.to_string(),
        values: column_json(series)?,
    })
}

fn require_numeric(dataset: &Dataset, kind: PlotKind, column: &str) -> Result<(), DiagnosticsError> {
    let dtype = dataset.column(column)?.dtype();
    if dtype.is_numeric() {
        Ok(())
    } else {
        Err(DiagnosticsError::ChartConstruction(format!(
            "{} plot needs a numeric column, but '{}' is {}",
            kind,
            column,
            dtype_name(dtype)
        )))
    }
}

fn color_axis(dataset: &Dataset, request: &ChartRequest) -> Result<Option<Axis>, DiagnosticsError> {
    request
        .color
        .as_deref()
        .map(|column| axis(dataset, column))
        .transpose()
}

fn encode(dataset: &Dataset, request: &ChartRequest, y: Option<&str>) -> Result<ChartSpec, DiagnosticsError> {
    Ok(ChartSpec {
        kind: request.kind,
        x: axis(dataset, &request.x)?,
        y: y.map(|column| axis(dataset, column)).transpose()?,
        color: color_axis(dataset, request)?,
        counts: false,
    })
}

/// x against y; nothing to draw without a y column.
fn paired(dataset: &Dataset, request: &ChartRequest) -> Result<ChartOutcome, DiagnosticsError> {
    match request.y.as_deref() {
        Some(y) => Ok(ChartOutcome::Spec(encode(dataset, request, Some(y))?)),
        None => Ok(ChartOutcome::no_op()),
    }
}

fn scatter(dataset: &Dataset, request: &ChartRequest) -> Result<ChartOutcome, DiagnosticsError> {
    paired(dataset, request)
}

fn line(dataset: &Dataset, request: &ChartRequest) -> Result<ChartOutcome, DiagnosticsError> {
    paired(dataset, request)
}

fn histogram(dataset: &Dataset, request: &ChartRequest) -> Result<ChartOutcome, DiagnosticsError> {
    Ok(ChartOutcome::Spec(encode(dataset, request, None)?))
}

fn box_plot(dataset: &Dataset, request: &ChartRequest) -> Result<ChartOutcome, DiagnosticsError> {
    require_numeric(dataset, request.kind, &request.x)?;
    Ok(ChartOutcome::Spec(encode(dataset, request, None)?))
}

/// Value bars of x against y, or a count plot of x when y is unset.
fn bar(dataset: &Dataset, request: &ChartRequest) -> Result<ChartOutcome, DiagnosticsError> {
    if let Some(y) = request.y.as_deref() {
        require_numeric(dataset, request.kind, y)?;
        return Ok(ChartOutcome::Spec(encode(dataset, request, Some(y))?));
    }

    let counts = value_counts(dataset, &request.x)?;
    let (values, tallies): (Vec<Value>, Vec<Value>) = counts
        .entries
        .into_iter()
        .map(|entry| (entry.value.map_or(Value::Null, Value::String), Value::from(entry.count)))
        .unzip();

    Ok(ChartOutcome::Spec(ChartSpec {
        kind: PlotKind::Bar,
        x: Axis {
            column: counts.column,
            values,
        },
        y: Some(Axis {
            column: COUNT_AXIS.to_string(),
            values: tallies,
        }),
        color: None,
        counts: true,
    }))
}

/// Turns user selections into a chart spec, or a no-op when the axes do not
/// make a chart for the requested kind.
pub fn build_chart(dataset: &Dataset, request: &ChartRequest) -> Result<ChartOutcome, DiagnosticsError> {
    let outcome = match request.kind {
        PlotKind::Scatter => scatter(dataset, request),
        PlotKind::Line => line(dataset, request),
        PlotKind::Histogram => histogram(dataset, request),
        PlotKind::Box => box_plot(dataset, request),
        PlotKind::Bar => bar(dataset, request),
    };

    if let Err(e) = &outcome {
        tracing::debug!("Chart {} on {:?} rejected: {}", request.kind, request.x, e);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::loader::load;
    use bytes::Bytes;
    use serde_json::json;

    fn points() -> Dataset {
        load(
            Bytes::from("x,y,label\n1.0,2.5,a\n2.0,3.5,b\n3.0,1.5,a\n4.0,,c\n"),
            Some("points.csv"),
        )
        .unwrap()
    }

    #[test]
    fn test_scatter_references_requested_roles() {
        let request = ChartRequest::new("x", PlotKind::Scatter)
            .with_y(Some("y"))
            .with_color(Some("label"));
        let outcome = build_chart(&points(), &request).unwrap();
        let spec = outcome.spec().unwrap();

        assert_eq!(spec.kind, PlotKind::Scatter);
        assert_eq!(spec.x.column, "x");
        assert_eq!(spec.y.as_ref().unwrap().column, "y");
        assert_eq!(spec.color.as_ref().unwrap().column, "label");
        assert_eq!(spec.referenced_columns().as_slice(), &["x", "y", "label"]);
        assert_eq!(spec.y.as_ref().unwrap().values[3], Value::Null);
    }

    #[test]
    fn test_scatter_and_line_without_y_are_no_ops() {
        for kind in [PlotKind::Scatter, PlotKind::Line] {
            let request = ChartRequest::new("x", kind).with_y(Some("(none)"));
            let outcome = build_chart(&points(), &request).unwrap();
            assert!(matches!(outcome, ChartOutcome::NoOp { ref message } if message == INVALID_AXES_MESSAGE));
        }
    }

    #[test]
    fn test_histogram_and_box_need_only_x() {
        let histogram = build_chart(&points(), &ChartRequest::new("label", PlotKind::Histogram)).unwrap();
        let spec = histogram.spec().unwrap();
        assert!(spec.y.is_none());
        assert_eq!(spec.x.values.len(), 4);

        let box_outcome = build_chart(
            &points(),
            &ChartRequest::new("y", PlotKind::Box).with_color(Some("label")),
        )
        .unwrap();
        assert_eq!(box_outcome.spec().unwrap().referenced_columns().as_slice(), &["y", "label"]);
    }

    #[test]
    fn test_box_on_text_column_is_a_chart_error() {
        let err = build_chart(&points(), &ChartRequest::new("label", PlotKind::Box)).unwrap_err();
        assert!(matches!(err, DiagnosticsError::ChartConstruction(_)));
    }

    #[test]
    fn test_count_plot_matches_value_counts() {
        let dataset = points();
        let outcome = build_chart(&dataset, &ChartRequest::new("label", PlotKind::Bar)).unwrap();
        let spec = outcome.spec().unwrap();
        let counts = value_counts(&dataset, "label").unwrap();

        assert!(spec.counts);
        assert_eq!(spec.x.column, "label");
        assert_eq!(spec.y.as_ref().unwrap().column, COUNT_AXIS);
        let expected_x: Vec<Value> = counts.entries.iter().map(|e| json!(e.value)).collect();
        let expected_y: Vec<Value> = counts.entries.iter().map(|e| json!(e.count)).collect();
        assert_eq!(spec.x.values, expected_x);
        assert_eq!(spec.y.as_ref().unwrap().values, expected_y);
        assert_eq!(spec.x.values[0], json!("a"));
    }

    #[test]
    fn test_value_bar_requires_numeric_y() {
        let ok = build_chart(&points(), &ChartRequest::new("label", PlotKind::Bar).with_y(Some("y"))).unwrap();
        assert!(!ok.spec().unwrap().counts);

        let err = build_chart(&points(), &ChartRequest::new("x", PlotKind::Bar).with_y(Some("label"))).unwrap_err();
        assert!(matches!(err, DiagnosticsError::ChartConstruction(_)));
    }

    #[test]
    fn test_stale_column_is_unknown() {
        let request = ChartRequest::new("x", PlotKind::Scatter).with_y(Some("gone"));
        assert!(matches!(
            build_chart(&points(), &request),
            Err(DiagnosticsError::UnknownColumn(name)) if name == "gone"
        ));
    }

    #[test]
    fn test_spec_serialization_shape() {
        let outcome = build_chart(&points(), &ChartRequest::new("x", PlotKind::Histogram)).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "spec");
        assert_eq!(json["kind"], "histogram");
        assert_eq!(json["x"]["column"], "x");
        assert_eq!(json["x"]["values"][0], 1.0);
    }
}
