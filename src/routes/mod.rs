use axum::{extract::DefaultBodyLimit, response::Html, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use crate::AppState;

pub mod sessions;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
}

/// Full application router with state, body limit and request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    let max_upload = state.config.max_file_size;
    Router::new()
        .merge(routes())
        .merge(sessions::routes())
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
