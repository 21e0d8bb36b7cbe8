use polars::prelude::*;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::DiagnosticsError;

/// Placeholder the selection widgets use for "no column chosen".
pub const NONE_SELECTION: &str = "(none)";

/// A fully loaded table. Immutable once built; a new load replaces it.
///
/// Float NaN cells are stored as nulls, so every view counts them as missing.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    frame: DataFrame,
}

fn nan_as_null(series: &Series) -> Option<Series> {
    let mut cleaned = match series.dtype() {
        DataType::Float64 => {
            let ca = series.f64().ok()?;
            if ca.into_iter().any(|v| v.is_some_and(|f| f.is_nan())) {
                ca.into_iter()
                    .map(|v| v.filter(|f| !f.is_nan()))
                    .collect::<Float64Chunked>()
                    .into_series()
            } else {
                return None;
            }
        }
        DataType::Float32 => {
            let ca = series.f32().ok()?;
            if ca.into_iter().any(|v| v.is_some_and(|f| f.is_nan())) {
                ca.into_iter()
                    .map(|v| v.filter(|f| !f.is_nan()))
                    .collect::<Float32Chunked>()
                    .into_series()
            } else {
                return None;
            }
        }
        _ => return None,
    };
    cleaned.rename(series.name());
    Some(cleaned)
}

impl Dataset {
    pub fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        let cleaned: Vec<Option<Series>> = frame.get_columns().iter().map(nan_as_null).collect();
        let frame = if cleaned.iter().any(Option::is_some) {
            let columns = frame
                .get_columns()
                .iter()
                .zip(cleaned)
                .map(|(original, cleaned)| cleaned.unwrap_or_else(|| original.clone()))
                .collect();
            DataFrame::new(columns).unwrap_or(frame)
        } else {
            frame
        };

        Self {
            name: name.into(),
            frame,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn row_count(&self) -> usize {
        self.frame.height()
    }

    pub fn column_count(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn columns(&self) -> &[Series] {
        self.frame.get_columns()
    }

    pub fn column(&self, name: &str) -> Result<&Series, DiagnosticsError> {
        self.frame
            .column(name)
            .map_err(|_| DiagnosticsError::UnknownColumn(name.to_string()))
    }

    /// Columns whose inferred type is numeric, in table order. Booleans are not numeric.
    pub fn numeric_columns(&self) -> Vec<&Series> {
        self.columns()
            .iter()
            .filter(|series| series.dtype().is_numeric())
            .collect()
    }

    pub fn missing_cells(&self) -> usize {
        self.columns().iter().map(|series| series.null_count()).sum()
    }
}

/// Column-keyed values that keep table order when serialized as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap<T>(pub Vec<(String, T)>);

impl<T> ColumnMap<T> {
    pub fn get(&self, column: &str) -> Option<&T> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Serialize> Serialize for ColumnMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Profile {
    pub rows: usize,
    pub cols: usize,
    pub columns: Vec<String>,
    pub dtypes: ColumnMap<String>,
    pub null_counts: ColumnMap<usize>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub q50: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DescribeTable {
    pub columns: Vec<ColumnSummary>,
}

impl DescribeTable {
    pub fn get(&self, column: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|summary| summary.column == column)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ValueCount {
    /// Rendered cell value; `None` is the missing-value bucket.
    pub value: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ValueCounts {
    pub column: String,
    pub entries: Vec<ValueCount>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    #[default]
    Scatter,
    Line,
    Histogram,
    Box,
    Bar,
}

impl PlotKind {
    pub const ALL: [PlotKind; 5] = [
        PlotKind::Scatter,
        PlotKind::Line,
        PlotKind::Histogram,
        PlotKind::Box,
        PlotKind::Bar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlotKind::Scatter => "scatter",
            PlotKind::Line => "line",
            PlotKind::Histogram => "histogram",
            PlotKind::Box => "box",
            PlotKind::Bar => "bar",
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlotKind {
    type Err = DiagnosticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PlotKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| DiagnosticsError::ChartConstruction(format!("unsupported plot kind: {}", s)))
    }
}

/// User selections for one chart render.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub x: String,
    pub y: Option<String>,
    pub color: Option<String>,
    pub kind: PlotKind,
}

impl ChartRequest {
    pub fn new(x: impl Into<String>, kind: PlotKind) -> Self {
        Self {
            x: x.into(),
            y: None,
            color: None,
            kind,
        }
    }

    pub fn with_y(mut self, y: Option<&str>) -> Self {
        self.y = selection(y);
        self
    }

    pub fn with_color(mut self, color: Option<&str>) -> Self {
        self.color = selection(color);
        self
    }
}

/// Maps a widget value to a column choice, treating blanks and `(none)` as unset.
pub fn selection(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != NONE_SELECTION)
        .map(str::to_string)
}
