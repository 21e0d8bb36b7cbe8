use polars::prelude::*;
use serde::Serialize;
use serde_json::Value;
use crate::error::DiagnosticsError;
use crate::models::Dataset;

#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// JSON rendering of one cell. Missing and non-finite values become `null`.
pub fn cell_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(v) => Value::Bool(v),
        AnyValue::Int32(v) => Value::from(v),
        AnyValue::Int64(v) => Value::from(v),
        AnyValue::UInt32(v) => Value::from(v),
        AnyValue::UInt64(v) => Value::from(v),
        AnyValue::Float32(v) => serde_json::Number::from_f64(v as f64).map_or(Value::Null, Value::Number),
        AnyValue::Float64(v) => serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number),
        AnyValue::String(v) => Value::String(v.to_string()),
        other => Value::String(other.to_string()),
    }
}

/// Every cell of a column, in row order.
pub fn column_json(series: &Series) -> Result<Vec<Value>, DiagnosticsError> {
    (0..series.len())
        .map(|idx| series.get(idx).map(cell_json).map_err(DiagnosticsError::from))
        .collect()
}

/// The first `limit` rows of the table, row-major.
pub fn preview(dataset: &Dataset, limit: usize) -> Result<Preview, DiagnosticsError> {
    let head = dataset.frame().head(Some(limit));
    let columns = head
        .get_columns()
        .iter()
        .map(column_json)
        .collect::<Result<Vec<_>, _>>()?;

    let rows = (0..head.height())
        .map(|row_idx| columns.iter().map(|column| column[row_idx].clone()).collect())
        .collect();

    Ok(Preview {
        columns: dataset.column_names(),
        rows,
    })
}
