use std::sync::Arc;

use thiserror::Error;

use crate::{
    clock::{Clock, SystemClock},
    error::AppError,
    models::session::{NewSession, Session, SessionPatch},
    repositories::session::SessionStore,
};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Store error: {0}")]
    Store(AppError),
}

impl From<AppError> for TrackerError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Http(e) => TrackerError::Network(e.to_string()),
            other => TrackerError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

/// Client-side owner of the session list and the in-progress session.
///
/// Invariant: `current`, when set, names a session in `sessions` whose `end`
/// is unset, and there is never more than one. Every mutation goes to the
/// store first; the in-memory list only changes once the store call
/// succeeded.
pub struct SessionTracker<S: SessionStore> {
    store: S,
    clock: Arc<dyn Clock>,
    sessions: Vec<Session>,
    current: Option<i64>,
}

impl<S: SessionStore> SessionTracker<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            sessions: Vec::new(),
            current: None,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn current(&self) -> Option<&Session> {
        let id = self.current?;
        self.sessions.iter().find(|s| s.id == id)
    }

    /// The one session whose description may be edited: the most recent.
    pub fn editable_session_id(&self) -> Option<i64> {
        self.sessions
            .iter()
            .max_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)))
            .map(|s| s.id)
    }

    /// Replaces the in-memory list with what the store holds.
    pub async fn load(&mut self) -> Result<()> {
        let sessions = self.store.list().await?;
        tracing::debug!("Loaded {} sessions", sessions.len());
        self.sessions = sessions;
        if let Some(id) = self.current {
            if !self.sessions.iter().any(|s| s.id == id && s.is_in_progress()) {
                self.current = None;
            }
        }
        Ok(())
    }

    pub async fn start_session(&mut self, tag: &str, description: &str) -> Result<&Session> {
        if tag.is_empty() || description.is_empty() {
            return Err(TrackerError::Validation(
                "tag and description are required".to_string(),
            ));
        }
        if let Some(id) = self.current {
            return Err(TrackerError::Validation(format!(
                "session {} is still in progress",
                id
            )));
        }

        let new = NewSession::in_progress(
            self.clock.now(),
            tag.to_string(),
            description.to_string(),
        );
        let session = self.store.create(new).await.inspect_err(|e| {
            tracing::error!("Error creating session: {}", e);
        })?;

        tracing::info!("▶️ Session {} started ({})", session.id, session.tag);
        self.current = Some(session.id);
        self.sessions.insert(0, session);
        Ok(&self.sessions[0])
    }

    /// Closes the current session with `elapsed_seconds` of focus.
    ///
    /// Returns `Ok(None)` without touching the store when nothing is in
    /// progress. `focused` is clamped to the wall-clock span.
    pub async fn complete_session(&mut self, elapsed_seconds: i64) -> Result<Option<&Session>> {
        let Some(id) = self.current else {
            return Ok(None);
        };
        let Some(start) = self.sessions.iter().find(|s| s.id == id).map(|s| s.start) else {
            self.current = None;
            return Ok(None);
        };

        let end = self.clock.now().max(start);
        let span = (end - start).num_seconds();
        let focused = elapsed_seconds.clamp(0, span);

        let updated = self
            .store
            .update(id, SessionPatch::completion(end, focused))
            .await
            .inspect_err(|e| tracing::error!("Error completing session {}: {}", id, e))?;

        tracing::info!("⏹️ Session {} completed, {}s focused", id, focused);
        self.current = None;
        Ok(Some(self.replace(updated)))
    }

    pub async fn delete_session(&mut self, id: i64) -> Result<()> {
        self.store
            .delete(id)
            .await
            .inspect_err(|e| tracing::error!("Error deleting session {}: {}", id, e))?;

        self.sessions.retain(|s| s.id != id);
        if self.current == Some(id) {
            self.current = None;
        }
        Ok(())
    }

    pub async fn edit_description(&mut self, id: i64, description: &str) -> Result<&Session> {
        if self.editable_session_id() != Some(id) {
            return Err(TrackerError::Validation(format!(
                "session {} is not editable",
                id
            )));
        }
        if description.is_empty() {
            return Err(TrackerError::Validation(
                "description cannot be empty".to_string(),
            ));
        }

        let updated = self
            .store
            .update(id, SessionPatch::description(description.to_string()))
            .await
            .inspect_err(|e| tracing::error!("Error updating session {}: {}", id, e))?;

        Ok(self.replace(updated))
    }

    fn replace(&mut self, updated: Session) -> &Session {
        match self.sessions.iter().position(|s| s.id == updated.id) {
            Some(index) => {
                self.sessions[index] = updated;
                &self.sessions[index]
            }
            None => {
                self.sessions.insert(0, updated);
                &self.sessions[0]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Result as StoreResult, repositories::memory::MemorySessionStore};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    };

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn at(t: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(t)))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    /// Wraps the memory store, counting calls and failing on demand.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemorySessionStore,
        calls: AtomicUsize,
        failing: AtomicBool,
    }

    impl FlakyStore {
        fn enter(&self) -> StoreResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(AppError::Internal("store unavailable".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl SessionStore for Arc<FlakyStore> {
        async fn create(&self, new: NewSession) -> StoreResult<Session> {
            self.enter()?;
            self.inner.create(new).await
        }
        async fn list(&self) -> StoreResult<Vec<Session>> {
            self.enter()?;
            self.inner.list().await
        }
        async fn get(&self, id: i64) -> StoreResult<Option<Session>> {
            self.enter()?;
            self.inner.get(id).await
        }
        async fn update(&self, id: i64, patch: SessionPatch) -> StoreResult<Session> {
            self.enter()?;
            self.inner.update(id, patch).await
        }
        async fn delete(&self, id: i64) -> StoreResult<()> {
            self.enter()?;
            self.inner.delete(id).await
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
    }

    fn tracker() -> (SessionTracker<Arc<FlakyStore>>, Arc<FlakyStore>, Arc<ManualClock>) {
        let store = Arc::new(FlakyStore::default());
        let clock = ManualClock::at(t0());
        let tracker = SessionTracker::with_clock(store.clone(), clock.clone());
        (tracker, store, clock)
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_before_any_store_call() {
        let (mut tracker, store, _) = tracker();

        assert!(matches!(
            tracker.start_session("", "write").await,
            Err(TrackerError::Validation(_))
        ));
        assert!(matches!(
            tracker.start_session("Work", "").await,
            Err(TrackerError::Validation(_))
        ));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
        assert!(tracker.sessions().is_empty());
    }

    #[tokio::test]
    async fn started_session_becomes_current_and_is_prepended() {
        let (mut tracker, _, clock) = tracker();
        tracker.start_session("Work", "first").await.unwrap();
        tracker.complete_session(0).await.unwrap();
        clock.advance(Duration::minutes(5));

        let started = tracker.start_session("Study", "second").await.unwrap().clone();
        assert_eq!(started.start, t0() + Duration::minutes(5));
        assert!(started.is_in_progress());
        assert_eq!(tracker.current().map(|s| s.id), Some(started.id));
        assert_eq!(tracker.sessions()[0].id, started.id);
        assert_eq!(tracker.sessions().len(), 2);
    }

    #[tokio::test]
    async fn only_one_session_can_be_in_progress() {
        let (mut tracker, _, _) = tracker();
        tracker.start_session("Work", "first").await.unwrap();
        assert!(matches!(
            tracker.start_session("Work", "second").await,
            Err(TrackerError::Validation(_))
        ));
        assert_eq!(tracker.sessions().len(), 1);
    }

    #[tokio::test]
    async fn completing_without_current_is_a_noop() {
        let (mut tracker, store, _) = tracker();
        assert!(tracker.complete_session(120).await.unwrap().is_none());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn completion_sets_end_and_focused() {
        let (mut tracker, _, clock) = tracker();
        let id = tracker.start_session("Work", "report").await.unwrap().id;
        clock.advance(Duration::minutes(95));

        let done = tracker.complete_session(90 * 60).await.unwrap().unwrap().clone();
        assert_eq!(done.id, id);
        assert_eq!(done.end, Some(t0() + Duration::minutes(95)));
        assert_eq!(done.focused, Some(5400));
        assert!(tracker.current().is_none());
        assert_eq!(tracker.sessions()[0], done);
    }

    #[tokio::test]
    async fn focused_time_is_clamped_to_wall_clock() {
        let (mut tracker, _, clock) = tracker();
        tracker.start_session("Work", "report").await.unwrap();
        clock.advance(Duration::seconds(30));

        let done = tracker.complete_session(5400).await.unwrap().unwrap();
        assert_eq!(done.focused, Some(30));
    }

    #[tokio::test]
    async fn failed_start_leaves_state_unchanged() {
        let (mut tracker, store, clock) = tracker();
        tracker.start_session("Work", "first").await.unwrap();
        clock.advance(Duration::minutes(25));
        tracker.complete_session(1500).await.unwrap();
        let before = tracker.sessions().to_vec();

        store.failing.store(true, Ordering::SeqCst);
        assert!(matches!(
            tracker.start_session("Study", "second").await,
            Err(TrackerError::Store(_))
        ));
        assert_eq!(tracker.sessions(), before.as_slice());
        assert!(tracker.current().is_none());

        store.failing.store(false, Ordering::SeqCst);
        let started = tracker.start_session("Study", "second").await.unwrap().id;
        assert_eq!(tracker.current().map(|s| s.id), Some(started));
    }

    #[tokio::test]
    async fn failed_completion_leaves_state_unchanged() {
        let (mut tracker, store, clock) = tracker();
        let id = tracker.start_session("Work", "report").await.unwrap().id;
        clock.advance(Duration::minutes(10));
        store.failing.store(true, Ordering::SeqCst);

        assert!(matches!(
            tracker.complete_session(600).await,
            Err(TrackerError::Store(_))
        ));
        assert_eq!(tracker.current().map(|s| s.id), Some(id));
        assert!(tracker.sessions()[0].is_in_progress());
    }

    #[tokio::test]
    async fn delete_removes_only_that_session() {
        let (mut tracker, _, clock) = tracker();
        for n in 0..6 {
            tracker.start_session("Work", &format!("block {}", n)).await.unwrap();
            clock.advance(Duration::minutes(30));
            tracker.complete_session(1800).await.unwrap();
        }
        let before: Vec<i64> = tracker.sessions().iter().map(|s| s.id).collect();

        tracker.delete_session(5).await.unwrap();

        let after: Vec<i64> = tracker.sessions().iter().map(|s| s.id).collect();
        let expected: Vec<i64> = before.into_iter().filter(|id| *id != 5).collect();
        assert_eq!(after, expected);
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_list() {
        let (mut tracker, store, _) = tracker();
        let id = tracker.start_session("Work", "report").await.unwrap().id;
        store.failing.store(true, Ordering::SeqCst);

        assert!(tracker.delete_session(id).await.is_err());
        assert_eq!(tracker.sessions().len(), 1);
    }

    #[tokio::test]
    async fn only_the_most_recent_session_is_editable() {
        let (mut tracker, store, clock) = tracker();
        let older = tracker.start_session("Work", "old").await.unwrap().id;
        clock.advance(Duration::minutes(1));
        tracker.complete_session(60).await.unwrap();
        clock.advance(Duration::minutes(1));
        let newer = tracker.start_session("Work", "new").await.unwrap().id;

        assert_eq!(tracker.editable_session_id(), Some(newer));
        assert!(tracker.edit_description(older, "nope").await.is_err());

        let edited = tracker.edit_description(newer, "renamed").await.unwrap();
        assert_eq!(edited.description, "renamed");

        store.failing.store(true, Ordering::SeqCst);
        assert!(tracker.edit_description(newer, "again").await.is_err());
        assert_eq!(tracker.sessions()[0].description, "renamed");
    }

    #[tokio::test]
    async fn load_replaces_the_list() {
        let (mut tracker, store, clock) = tracker();
        store
            .inner
            .create(NewSession::in_progress(t0(), "a".into(), "b".into()))
            .await
            .unwrap();
        clock.advance(Duration::minutes(1));

        tracker.load().await.unwrap();
        assert_eq!(tracker.sessions().len(), 1);
        assert!(tracker.current().is_none());
    }
}
