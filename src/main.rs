use anyhow::Result;
use std::sync::Arc;

use data_diagnostics::{config, logging, routes, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::load_config()?;
    let addr = config.addr;
    tracing::info!(
        "Upload limit {}KB, sessions idle out after {:?}",
        config.max_file_size / 1024,
        config.session_idle
    );

    let state = Arc::new(AppState::new(config));
    let app = routes::app(state);

    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
