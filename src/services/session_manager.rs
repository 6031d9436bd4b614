// src/services/session_manager.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;

use super::promise::PromiseCase;

pub const DEFAULT_SESSION: &str = "default";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: Instant,
}

#[derive(Clone, Debug)]
struct Conversation {
    turns: Vec<Turn>,
    case: PromiseCase,
    last_active: Instant,
}

impl Conversation {
    fn new() -> Self {
        Self { turns: Vec::new(), case: PromiseCase::default(), last_active: Instant::now() }
    }
}

/// Per-session chat history, dropped after `ttl` without activity.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<RwLock<HashMap<String, Conversation>>>,
    ttl: Duration,
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Blank ids share the default conversation.
pub fn session_key(session_id: &str) -> &str {
    let trimmed = session_id.trim();
    if trimmed.is_empty() { DEFAULT_SESSION } else { trimmed }
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // Record a turn, creating the conversation on first use. Returns the history length.
    pub async fn record(&self, session_id: &str, role: Role, content: impl Into<String>) -> usize {
        let now = Instant::now();
        let mut guard = self.inner.write().await;
        let conversation = guard
            .entry(session_key(session_id).to_string())
            .or_insert_with(Conversation::new);
        conversation.turns.push(Turn { role, content: content.into(), timestamp: now });
        conversation.last_active = now;
        conversation.turns.len()
    }

    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        let guard = self.inner.read().await;
        guard
            .get(session_key(session_id))
            .map(|c| c.turns.clone())
            .unwrap_or_default()
    }

    /// Where the session's negotiation stands; a fresh case if unknown.
    pub async fn case(&self, session_id: &str) -> PromiseCase {
        let guard = self.inner.read().await;
        guard
            .get(session_key(session_id))
            .map(|c| c.case.clone())
            .unwrap_or_default()
    }

    pub async fn set_case(&self, session_id: &str, case: PromiseCase) {
        let mut guard = self.inner.write().await;
        let conversation = guard
            .entry(session_key(session_id).to_string())
            .or_insert_with(Conversation::new);
        conversation.case = case;
        conversation.last_active = Instant::now();
    }

    /// Drop conversations idle for longer than the ttl. Returns how many went.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let now = Instant::now();
        let before = guard.len();
        guard.retain(|_, c| now.duration_since(c.last_active) < self.ttl);
        before - guard.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_ids_share_default_conversation() {
        let mgr = SessionManager::new(Duration::from_secs(60));
        mgr.record("", Role::User, "hola").await;
        let len = mgr.record("   ", Role::Assistant, "¿Cuál es tu cédula?").await;

        assert_eq!(len, 2);
        assert_eq!(mgr.len().await, 1);
        assert_eq!(mgr.history(DEFAULT_SESSION).await[1].role, Role::Assistant);
    }
}
