use std::sync::Arc;
use moka::sync::Cache;
use uuid::Uuid;
use crate::config::Config;
use crate::models::Dataset;

/// Per-user context handed explicitly to every view.
///
/// Holds at most one dataset. A load swaps in a new one wholesale, so
/// readers only ever see absent or fully loaded data.
#[derive(Debug, Clone, Default)]
pub struct Session {
    dataset: Option<Arc<Dataset>>,
}

impl Session {
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            dataset: Some(Arc::new(dataset)),
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_deref()
    }

    pub fn has_data(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn replace(&mut self, dataset: Dataset) {
        self.dataset = Some(Arc::new(dataset));
    }
}

/// Live sessions by id. Idle sessions expire together with their data.
pub struct SessionStore {
    sessions: Cache<String, Session>,
}

impl SessionStore {
    pub fn new(config: &Config) -> Self {
        let sessions = Cache::builder()
            .max_capacity(config.max_sessions)
            .time_to_idle(config.session_idle)
            .build();
        Self { sessions }
    }

    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), Session::default());
        tracing::debug!("Created session {}", id);
        id
    }

    /// Snapshot of the session; unknown or expired ids read as "no data loaded".
    pub fn open(&self, id: &str) -> Session {
        self.sessions.get(id).unwrap_or_default()
    }

    pub fn commit(&self, id: &str, session: Session) {
        self.sessions.insert(id.to_string(), session);
    }

    pub fn remove(&self, id: &str) {
        self.sessions.invalidate(id);
    }
}
