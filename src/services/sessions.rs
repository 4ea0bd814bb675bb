use crate::{
    error::{AppError, Result},
    models::session::{NewSession, Session, SessionPatch},
    state::AppState,
};

/// Lists every session, most recent first.
pub async fn list_sessions(state: &AppState) -> Result<Vec<Session>> {
    state.store.list().await
}

/// Creates a new session.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `new` - The session to insert.
///
/// # Returns
///
/// A `Result` containing the created `Session`. Nothing is written when
/// validation fails.
pub async fn create_session(state: &AppState, new: NewSession) -> Result<Session> {
    new.validate()?;
    state.store.create(new).await
}

/// Gets a session by id.
pub async fn get_session(state: &AppState, id: i64) -> Result<Session> {
    state.store.get(id).await?.ok_or(AppError::NotFound(id))
}

/// Applies a partial update to a session.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `id` - The id of the session to update.
/// * `patch` - The fields to replace.
///
/// # Returns
///
/// A `Result` containing the merged `Session`.
pub async fn update_session(state: &AppState, id: i64, patch: SessionPatch) -> Result<Session> {
    let existing = get_session(state, id).await?;
    let merged = existing.merged(&patch)?;

    if patch.is_empty() {
        return Ok(merged);
    }

    state.store.update(id, patch).await
}

/// Deletes a session.
pub async fn delete_session(state: &AppState, id: i64) -> Result<()> {
    state.store.delete(id).await
}
