use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    models::session::{NewSession, SessionPatch},
    services::sessions as session_service,
    state::AppState,
};

/// The request payload for creating a session.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[garde(skip)]
    pub start: Option<DateTime<Utc>>,
    #[garde(skip)]
    pub end: Option<DateTime<Utc>>,
    #[garde(range(min = 0))]
    pub focused: Option<i64>,
    #[garde(length(min = 1))]
    pub tag: Option<String>,
    #[garde(length(min = 1))]
    pub description: Option<String>,
}

impl TryFrom<CreateSessionRequest> for NewSession {
    type Error = AppError;

    fn try_from(req: CreateSessionRequest) -> Result<Self> {
        req.validate()
            .map_err(|report| AppError::Validation(format!("Missing required fields: {}", report)))?;

        let missing: Vec<&str> = [
            ("start", req.start.is_none()),
            ("tag", req.tag.is_none()),
            ("description", req.description.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();

        let (Some(start), Some(tag), Some(description)) = (req.start, req.tag, req.description)
        else {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        Ok(NewSession {
            start,
            end: req.end,
            focused: req.focused,
            tag,
            description,
        })
    }
}

/// The request payload for updating a session.
///
/// `id` is read from the body on `PUT /api/sessions` and ignored on
/// `PUT /api/sessions/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSessionRequest {
    #[garde(skip)]
    pub id: Option<i64>,
    #[garde(length(min = 1))]
    pub description: Option<String>,
    #[garde(skip)]
    pub end: Option<DateTime<Utc>>,
    #[garde(range(min = 0))]
    pub focused: Option<i64>,
}

impl UpdateSessionRequest {
    fn into_patch(self) -> Result<(Option<i64>, SessionPatch)> {
        self.validate()
            .map_err(|report| AppError::Validation(report.to_string()))?;

        Ok((
            self.id,
            SessionPatch {
                description: self.description,
                end: self.end,
                focused: self.focused,
            },
        ))
    }
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("Invalid session id '{}'", raw)))
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response> {
    let body = sonic_rs::to_string(value)?;
    Ok((status, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Lists all sessions, most recent first.
#[axum::debug_handler]
pub async fn list_sessions(State(state): State<AppState>) -> Result<Response> {
    let sessions = session_service::list_sessions(&state).await?;
    tracing::debug!("📋 Listing {} sessions", sessions.len());
    json_response(StatusCode::OK, &sessions)
}

/// Creates a new session.
#[axum::debug_handler]
pub async fn create_session(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let req: CreateSessionRequest = sonic_rs::from_slice(&body)?;
    let new = NewSession::try_from(req)?;

    let session = session_service::create_session(&state, new).await?;
    tracing::info!("✅ Session {} created ({})", session.id, session.tag);

    json_response(StatusCode::CREATED, &session)
}

/// Updates the session whose id is given in the body.
#[axum::debug_handler]
pub async fn update_session(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let req: UpdateSessionRequest = sonic_rs::from_slice(&body)?;
    let (id, patch) = req.into_patch()?;
    let id = id.ok_or_else(|| AppError::Validation("Missing session id".to_string()))?;

    let session = session_service::update_session(&state, id, patch).await?;
    tracing::info!("✏️ Session {} updated", session.id);

    json_response(StatusCode::OK, &session)
}

/// Gets one session.
#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let session = session_service::get_session(&state, parse_id(&id)?).await?;
    json_response(StatusCode::OK, &session)
}

/// Updates the session named in the path.
#[axum::debug_handler]
pub async fn update_session_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let req: UpdateSessionRequest = sonic_rs::from_slice(&body)?;
    let (_, patch) = req.into_patch()?;

    let session = session_service::update_session(&state, id, patch).await?;
    tracing::info!("✏️ Session {} updated", session.id);

    json_response(StatusCode::OK, &session)
}

/// Deletes a session.
#[axum::debug_handler]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    session_service::delete_session(&state, id).await?;
    tracing::info!("🗑️ Session {} deleted", id);
    Ok(StatusCode::NO_CONTENT.into_response())
}
