use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, Result},
    models::session::{NewSession, Session, SessionPatch},
    repositories::session::SessionStore,
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    sessions: Vec<Session>,
}

/// A process-local `SessionStore`.
///
/// Ids are assigned sequentially from 1, the same way a `BIGSERIAL` column
/// hands them out. Every write is checked against the session invariants
/// while the write lock is held, so concurrent updates cannot both set `end`.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<Inner>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, new: NewSession) -> Result<Session> {
        new.validate()?;
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let session = Session {
            id: inner.next_id,
            start: new.start,
            end: new.end,
            focused: new.focused,
            tag: new.tag,
            description: new.description,
        };
        inner.sessions.push(session.clone());
        Ok(session)
    }

    async fn list(&self) -> Result<Vec<Session>> {
        let inner = self.inner.read().await;
        let mut sessions = inner.sessions.clone();
        sessions.sort_by(|a, b| b.start.cmp(&a.start).then(b.id.cmp(&a.id)));
        Ok(sessions)
    }

    async fn get(&self, id: i64) -> Result<Option<Session>> {
        let inner = self.inner.read().await;
        Ok(inner.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn update(&self, id: i64, patch: SessionPatch) -> Result<Session> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(AppError::NotFound(id))?;

        *slot = slot.merged(&patch)?;
        Ok(slot.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.sessions.retain(|s| s.id != id);
        Ok(())
    }
}
