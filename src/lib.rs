//! Lightweight data diagnostics: load a CSV or Excel file (or a built-in
//! sample), then inspect its profile, summary statistics, value counts,
//! correlations and chart specifications over a small JSON API.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;

use session::SessionStore;

// Application state
pub struct AppState {
    pub config: config::Config,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        let sessions = SessionStore::new(&config);
        Self { config, sessions }
    }
}
