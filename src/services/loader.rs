use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use bytes::Bytes;
use polars::prelude::*;
use crate::error::DiagnosticsError;
use crate::models::Dataset;
use crate::services::excel::{read_workbook, WorkbookKind};

const UNNAMED_UPLOAD: &str = "upload";

/// One way of turning raw file content into a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    DelimitedText,
    Spreadsheet(WorkbookKind),
}

impl Decoder {
    /// Decoders to try, in order, for a file with the given name.
    pub fn candidates(filename: Option<&str>) -> Vec<Decoder> {
        let extension = filename
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => vec![Decoder::DelimitedText],
            Some("xlsx") => vec![Decoder::Spreadsheet(WorkbookKind::Xlsx)],
            Some("xls") => vec![Decoder::Spreadsheet(WorkbookKind::Xls)],
            _ => vec![
                Decoder::DelimitedText,
                Decoder::Spreadsheet(WorkbookKind::Detect),
            ],
        }
    }

    pub fn decode(self, content: &Bytes) -> Result<DataFrame, DiagnosticsError> {
        match self {
            Decoder::DelimitedText => read_delimited(content),
            Decoder::Spreadsheet(kind) => read_workbook(content, kind),
        }
    }
}

fn read_delimited(content: &Bytes) -> Result<DataFrame, DiagnosticsError> {
    std::str::from_utf8(content)
        .map_err(|e| DiagnosticsError::UnsupportedFormat(format!("Not UTF-8 text: {}", e)))?;

    CsvReader::new(Cursor::new(content.clone()))
        .has_header(true)
        // Scan every row so a late value cannot contradict the inferred type
        .infer_schema(None)
        .finish()
        .map_err(|e| DiagnosticsError::UnsupportedFormat(format!("Failed to parse CSV: {}", e)))
}

/// Decodes uploaded content into a [`Dataset`].
///
/// The extension picks the decoder; without a recognised one, delimited text is
/// tried before spreadsheet formats. Each attempt reads the content from the start.
pub fn load(content: Bytes, filename: Option<&str>) -> Result<Dataset, DiagnosticsError> {
    let start = std::time::Instant::now();
    if content.is_empty() {
        return Err(DiagnosticsError::UnsupportedFormat("The file is empty".to_string()));
    }

    let name = filename
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNNAMED_UPLOAD);
    let mut failures = Vec::new();

    for decoder in Decoder::candidates(filename) {
        match decoder.decode(&content) {
            Ok(frame) => {
                tracing::info!(
                    "Loaded {} with {:?} in {:?}: {} rows x {} columns",
                    name,
                    decoder,
                    start.elapsed(),
                    frame.height(),
                    frame.width()
                );
                return Ok(Dataset::new(name, frame));
            }
            Err(e) => {
                tracing::debug!("Decoder {:?} rejected {}: {}", decoder, name, e);
                failures.push(match e {
                    DiagnosticsError::UnsupportedFormat(reason) => reason,
                    other => other.to_string(),
                });
            }
        }
    }

    tracing::warn!("No decoder could read {}", name);
    Err(DiagnosticsError::UnsupportedFormat(failures.join("; ")))
}

/// Same as [`load`], reading the whole stream from its beginning first.
pub fn load_reader<R: Read + Seek>(reader: &mut R, filename: Option<&str>) -> Result<Dataset, DiagnosticsError> {
    let mut buffer = Vec::new();
    reader
        .seek(SeekFrom::Start(0))
        .and_then(|_| reader.read_to_end(&mut buffer))
        .map_err(|e| DiagnosticsError::UnsupportedFormat(format!("Failed to read file: {}", e)))?;
    load(Bytes::from(buffer), filename)
}
