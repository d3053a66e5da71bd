//! Session registry.
//!
//! Sessions are keyed by an externally supplied id (customer id, chat
//! id). Each session owns one [`ConversationContext`] behind a mutex,
//! so concurrent turns for the same session run one at a time. The
//! registry never expires sessions on its own; eviction and durable
//! persistence belong to the [`ContextStore`](convo_core::ContextStore)
//! collaborator.

use std::collections::HashMap;
use std::sync::Arc;

use convo_core::ConversationContext;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// One live session.
pub struct Session {
    /// External session id.
    pub id: String,
    /// The session's conversation state. Held for the whole of a turn.
    pub context: Mutex<ConversationContext>,
}

impl Session {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            context: Mutex::new(ConversationContext::new()),
        }
    }
}

/// Registry of live sessions.
///
/// Sessions are created lazily on first reference and live until the
/// process exits; the registry itself never drops one.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the session for an id, creating it if absent.
    pub async fn get_or_create(&self, id: &str) -> Arc<Session> {
        let mut sessions = self.sessions.write().await;

        if let Some(session) = sessions.get(id) {
            return session.clone();
        }

        debug!("Creating session {}", id);
        let session = Arc::new(Session::new(id));
        sessions.insert(id.to_string(), session.clone());
        session
    }

    /// Look up a session without creating it.
    pub async fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Clear a session's history, preserving its memory. Returns whether
    /// the session existed.
    pub async fn clear_history(&self, id: &str) -> bool {
        let session = match self.get(id).await {
            Some(session) => session,
            None => return false,
        };
        session.context.lock().await.clear_history();
        true
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
