use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    routing::{get, post},
    Router,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::{
    AppState,
    error::AppError,
    models::Dataset,
    services::{
        loader,
        samples,
        views::{self, AnalysisPage, ChartSelection, OverviewPage, View, VisualizationPage},
    },
};
use tower_http::cors::{CorsLayer, Any};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/samples", get(list_samples))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", axum::routing::delete(delete_session))
        .route("/sessions/:id/upload", post(upload_file))
        .route("/sessions/:id/samples/:key", post(load_sample))
        .route("/sessions/:id/overview", get(overview))
        .route("/sessions/:id/analysis", get(analysis))
        .route("/sessions/:id/visualization", get(visualization))
        .layer(cors)
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisParams {
    column: Option<String>,
}

/// The "Loaded: name • shape" banner.
#[derive(Debug, Serialize)]
pub struct LoadSummary {
    name: String,
    rows: usize,
    cols: usize,
}

impl LoadSummary {
    fn of(dataset: &Dataset) -> Self {
        Self {
            name: dataset.name().to_string(),
            rows: dataset.row_count(),
            cols: dataset.column_count(),
        }
    }
}

fn install(state: &AppState, id: &str, dataset: Dataset) -> LoadSummary {
    let summary = LoadSummary::of(&dataset);
    let mut session = state.sessions.open(id);
    session.replace(dataset);
    state.sessions.commit(id, session);
    tracing::info!(
        "Session {} now holds {}: {} rows x {} columns",
        id,
        summary.name,
        summary.rows,
        summary.cols
    );
    summary
}

async fn list_samples() -> Json<Vec<samples::SampleInfo>> {
    Json(samples::catalog())
}

async fn create_session(State(state): State<Arc<AppState>>) -> (StatusCode, Json<SessionCreated>) {
    let session_id = state.sessions.create();
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    state.sessions.remove(&id);
    StatusCode::NO_CONTENT
}

async fn upload_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<LoadSummary>, AppError> {
    tracing::info!(
        "Upload for session {}: {:?}, {}KB",
        id,
        params.filename,
        body.len() / 1024
    );

    let dataset = loader::load(body, params.filename.as_deref()).map_err(|e| {
        tracing::warn!("Upload for session {} rejected: {}", id, e);
        AppError::from(e)
    })?;

    Ok(Json(install(&state, &id, dataset)))
}

async fn load_sample(
    State(state): State<Arc<AppState>>,
    Path((id, key)): Path<(String, String)>,
) -> Result<Json<LoadSummary>, AppError> {
    let dataset = samples::load_sample(&key)
        .ok_or_else(|| AppError::NotFound(format!("sample {}", key)))??;

    Ok(Json(install(&state, &id, dataset)))
}

async fn overview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<View<OverviewPage>> {
    let session = state.sessions.open(&id);
    Json(views::overview(&session))
}

async fn analysis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<AnalysisParams>,
) -> Json<View<AnalysisPage>> {
    let session = state.sessions.open(&id);
    Json(views::analysis(&session, params.column.as_deref()))
}

async fn visualization(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(selection): Query<ChartSelection>,
) -> Json<View<VisualizationPage>> {
    let session = state.sessions.open(&id);
    Json(views::visualization(&session, &selection))
}
