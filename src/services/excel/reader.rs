use super::utils::*;
use std::collections::HashSet;
use std::io::{Cursor, Read, Seek};
use bytes::Bytes;
use calamine::{open_workbook_auto_from_rs, open_workbook_from_rs, Data, Range, Reader, Xls, Xlsx};
use polars::prelude::*;
use crate::error::DiagnosticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookKind {
    Xlsx,
    Xls,
    /// Let the container signature decide.
    Detect,
}

/// Reads the first worksheet of a workbook into a frame.
pub fn read_workbook(content: &Bytes, kind: WorkbookKind) -> Result<DataFrame, DiagnosticsError> {
    let cursor = Cursor::new(content.clone());
    let range = match kind {
        WorkbookKind::Xlsx => {
            let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)
                .map_err(|e| open_failed(format!("{}", e)))?;
            first_sheet(&mut workbook)?
        }
        WorkbookKind::Xls => {
            let mut workbook: Xls<_> = open_workbook_from_rs(cursor)
                .map_err(|e| open_failed(format!("{}", e)))?;
            first_sheet(&mut workbook)?
        }
        WorkbookKind::Detect => {
            let mut workbook = open_workbook_auto_from_rs(cursor)
                .map_err(|e| open_failed(format!("{}", e)))?;
            first_sheet(&mut workbook)?
        }
    };

    let rows: Vec<&[Data]> = range.rows().collect();
    tracing::debug!("Worksheet holds {} rows including header", rows.len());
    create_dataframe(&rows)
}

fn open_failed(reason: String) -> DiagnosticsError {
    tracing::debug!("Failed to open workbook: {}", reason);
    DiagnosticsError::UnsupportedFormat(format!("Failed to open Excel file: {}", reason))
}

fn first_sheet<RS, R>(workbook: &mut R) -> Result<Range<Data>, DiagnosticsError>
where
    RS: Read + Seek,
    R: Reader<RS>,
{
    let sheet_names = workbook.sheet_names();
    let sheet_name = sheet_names
        .first()
        .ok_or_else(|| DiagnosticsError::UnsupportedFormat("No sheets found in workbook".to_string()))?;

    workbook
        .worksheet_range(sheet_name)
        .map_err(|e| DiagnosticsError::UnsupportedFormat(format!("Failed to read worksheet {}: {:?}", sheet_name, e)))
}

fn create_dataframe(rows: &[&[Data]]) -> Result<DataFrame, DiagnosticsError> {
    let Some(header_row) = rows.first() else {
        return Ok(DataFrame::default());
    };

    let mut existing_names = HashSet::new();
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| header_name(cell, idx, &mut existing_names))
        .collect();

    let mut columns = Vec::with_capacity(headers.len());
    for (col_idx, header) in headers.iter().enumerate() {
        let values: Vec<Data> = rows.iter()
            .skip(1) // Skip header row
            .map(|row| row.get(col_idx).cloned().unwrap_or(Data::Empty))
            .collect();

        columns.push(build_series(header, &values)?);
    }

    Ok(DataFrame::new(columns)?)
}

fn build_series(name: &str, values: &[Data]) -> Result<Series, DiagnosticsError> {
    let series = match detect_column_type(values) {
        ColumnKind::Integer => {
            let ints: Vec<Option<i64>> = values.iter()
                .map(|v| cell_number(v).map(|f| f as i64))
                .collect();
            Series::new(name, ints)
        }
        ColumnKind::Float => {
            let nums: Vec<Option<f64>> = values.iter().map(cell_number).collect();
            Series::new(name, nums)
        }
        ColumnKind::Date => {
            let millis: Vec<Option<i64>> = values.iter().map(cell_timestamp_millis).collect();
            Series::new(name, millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        ColumnKind::Boolean => {
            let flags: Vec<Option<bool>> = values.iter()
                .map(|v| match v {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name, flags)
        }
        ColumnKind::Text => {
            let strings: Vec<Option<String>> = values.iter()
                .map(|v| match v {
                    Data::Empty => None,
                    Data::String(s) if s.is_empty() => None,
                    other => Some(other.to_string()),
                })
                .collect();
            Series::new(name, strings)
        }
    };

    Ok(series)
}
