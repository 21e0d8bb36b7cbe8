//! Built-in datasets that can be loaded without an upload.

use std::io::Cursor;
use once_cell::sync::OnceCell;
use polars::prelude::*;
use serde::Serialize;
use crate::error::DiagnosticsError;
use crate::models::Dataset;

pub struct Sample {
    pub key: &'static str,
    pub label: &'static str,
    csv: &'static str,
    frame: OnceCell<DataFrame>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleInfo {
    pub key: &'static str,
    pub label: &'static str,
}

static CATALOG: [Sample; 2] = [
    Sample {
        key: "iris",
        label: "Iris (classification)",
        csv: include_str!("../../data/iris.csv"),
        frame: OnceCell::new(),
    },
    Sample {
        key: "anscombe",
        label: "Anscombe (regression-like)",
        csv: include_str!("../../data/anscombe.csv"),
        frame: OnceCell::new(),
    },
];

impl Sample {
    /// Parses the embedded CSV the first time, then hands out cheap clones.
    fn frame(&self) -> Result<DataFrame, DiagnosticsError> {
        let frame = self.frame.get_or_try_init(|| {
            tracing::debug!("Parsing built-in sample {}", self.key);
            CsvReader::new(Cursor::new(self.csv.as_bytes()))
                .has_header(true)
                .finish()
        })?;
        Ok(frame.clone())
    }
}

pub fn catalog() -> Vec<SampleInfo> {
    CATALOG
        .iter()
        .map(|sample| SampleInfo {
            key: sample.key,
            label: sample.label,
        })
        .collect()
}

/// Looks a sample up by key. `None` means the key is not in the catalog.
pub fn load_sample(key: &str) -> Option<Result<Dataset, DiagnosticsError>> {
    let sample = CATALOG.iter().find(|sample| sample.key == key)?;
    Some(sample.frame().map(|frame| Dataset::new(sample.label, frame)))
}
