use axum::{routing::get, Router};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::{handlers, state::AppState};

/// The session API with request tracing.
///
/// CORS and the static fallback are added by the server binary.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/sessions",
            get(handlers::sessions::list_sessions)
                .post(handlers::sessions::create_session)
                .put(handlers::sessions::update_session),
        )
        .route(
            "/api/sessions/{id}",
            get(handlers::sessions::get_session)
                .put(handlers::sessions::update_session_by_id)
                .delete(handlers::sessions::delete_session),
        )
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
}
