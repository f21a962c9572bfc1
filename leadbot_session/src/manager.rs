use async_trait::async_trait;
use leadbot_core::{Session, SessionPatch, SessionStore};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Process-lifetime session map keyed by contact id.
///
/// Entries are created lazily on the first merge and never removed; a
/// restart through the `menu` keyword re-enters the greeting state instead.
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        info!("InMemorySessionStore initialized");
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Contact ids with a stored session, in no particular order.
    pub async fn contacts(&self) -> Vec<String> {
        self.sessions.lock().await.keys().cloned().collect()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, contact_id: &str) -> anyhow::Result<Session> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(contact_id).cloned().unwrap_or_default())
    }

    async fn merge(&self, contact_id: &str, patch: SessionPatch) -> anyhow::Result<Session> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(contact_id.to_owned()).or_default();
        session.apply(patch);

        debug!(
            "Merged session for {}: state={}",
            contact_id, session.state
        );
        Ok(session.clone())
    }
}
