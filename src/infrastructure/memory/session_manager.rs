//! In-Memory Editor Session Manager Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{EditorSessionManagerPort, SessionError};
use crate::application::session::EditorSession;

/// 内存会话管理器
pub struct InMemoryEditorSessionManager {
    sessions: DashMap<String, EditorSession>,
}

impl InMemoryEditorSessionManager {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryEditorSessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSessionManagerPort for InMemoryEditorSessionManager {
    fn create(&self, session: EditorSession) -> Result<String, SessionError> {
        let session_id = session.id().to_string();
        if self.sessions.contains_key(&session_id) {
            return Err(SessionError::AlreadyExists(session_id));
        }
        self.sessions.insert(session_id.clone(), session);
        tracing::debug!(session_id = %session_id, "Session created");
        Ok(session_id)
    }

    fn get(&self, id: &str) -> Result<EditorSession, SessionError> {
        self.sessions
            .get(id)
            .map(|s| s.clone())
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    fn modify(&self, id: &str, f: &mut dyn FnMut(&mut EditorSession)) -> Result<(), SessionError> {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        f(&mut session);
        Ok(())
    }

    fn is_valid(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    fn close(&self, id: &str) -> Result<(), SessionError> {
        self.sessions
            .remove(id)
            .map(|_| {
                tracing::debug!(session_id = %id, "Session removed");
            })
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    fn get_expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String> {
        let now = Utc::now();
        let timeout = chrono::Duration::seconds(idle_timeout_secs as i64);

        self.sessions
            .iter()
            .filter_map(|entry| {
                let elapsed = now - entry.last_activity();
                if elapsed > timeout {
                    Some(entry.key().clone())
                } else {
                    None
                }
            })
            .collect()
    }

    fn list_all(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }
}
