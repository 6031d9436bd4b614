// src/state.rs
use std::sync::Arc;
use std::time::Duration;

use crate::services::agent::{DemoCollectionsAgent, Responder};
use crate::services::session_manager::SessionManager;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub sessions: SessionManager,
    pub responder: Arc<dyn Responder>,
}

impl AppState {
    pub fn new(session_ttl: Duration) -> Self {
        Self::with_responder(session_ttl, Arc::new(DemoCollectionsAgent::default()))
    }

    pub fn with_responder(session_ttl: Duration, responder: Arc<dyn Responder>) -> Self {
        Self {
            sessions: SessionManager::new(session_ttl),
            responder,
        }
    }
}
