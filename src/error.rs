use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde_json::json;
use axum::Json;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Failures raised by the load → profile → present pipeline.
///
/// None of these are fatal to a session; views turn them into inline notices.
#[derive(Debug, Error)]
pub enum DiagnosticsError {
    #[error("Could not read the file: {0}")]
    UnsupportedFormat(String),
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("Need at least 2 numeric columns for correlation.")]
    InsufficientData,
    #[error("No numeric columns detected.")]
    NoNumericColumns,
    #[error("Plot failed: {0}")]
    ChartConstruction(String),
    #[error("DataFrame error: {0}")]
    Frame(#[from] PolarsError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Diagnostics(#[from] DiagnosticsError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Diagnostics(DiagnosticsError::Frame(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Diagnostics(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_maps_to_unprocessable() {
        let err = AppError::from(DiagnosticsError::UnsupportedFormat("bad bytes".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_not_found_status() {
        let err = AppError::NotFound("sample tips".to_string());
        assert_eq!(err.to_string(), "Not found: sample tips");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_transparent_display() {
        let err = AppError::from(DiagnosticsError::UnknownColumn("age".to_string()));
        assert_eq!(err.to_string(), "Unknown column: age");
    }
}
