use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tokio::net::TcpListener;

use deepwork::{
    config::Config,
    error::AppError,
    models::session::{NewSession, SessionPatch},
    repositories::{http::HttpSessionStore, memory::MemorySessionStore, session::SessionStore},
    routes::api_router,
    state::AppState,
};

// Serves the API on a local port and returns a client store pointed at it
async fn serve_api() -> HttpSessionStore {
    let state = AppState::with_store(Arc::new(MemorySessionStore::new()), Config::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, api_router(state)).await.unwrap();
    });

    HttpSessionStore::new(format!("http://{}", addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_unknown_session_is_none() {
        let store = serve_api().await;
        assert!(store.get(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_round_trip_through_the_api() {
        let store = serve_api().await;
        let start = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();

        // Step 1: create and read back
        let created = store
            .create(NewSession::in_progress(start, "Work".into(), "report".into()))
            .await
            .unwrap();
        assert_eq!(store.get(created.id).await.unwrap(), Some(created.clone()));

        // Step 2: complete it
        let end = start + Duration::minutes(45);
        let done = store
            .update(created.id, SessionPatch::completion(end, 2400))
            .await
            .unwrap();
        assert_eq!(done.end, Some(end));
        assert_eq!(done.focused, Some(2400));

        // Step 3: a different end is refused and the stored one survives
        let rewrite = SessionPatch::completion(start + Duration::hours(5), 10);
        let err = store.update(created.id, rewrite).await.unwrap_err();
        assert!(matches!(err, AppError::Api { status: 500, .. }));
        assert_eq!(store.get(created.id).await.unwrap().unwrap().end, Some(end));

        // Step 4: delete it
        store.delete(created.id).await.unwrap();
        assert!(store.get(created.id).await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
    }
}
