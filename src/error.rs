use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// The connection pool could not be built.
    #[error("Pool creation error: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    /// A request or response body could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] sonic_rs::Error),

    /// The session API could not be reached.
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The session API answered with an error.
    #[error("API error ({status}): {details}")]
    Api { status: u16, details: String },

    /// No session with the given id.
    #[error("Session {0} not found")]
    NotFound(i64),

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Every failure is reported as a 500; only the log level differs.
        match self {
            AppError::Database(ref e) => tracing::error!("Database error: {}", e),
            AppError::Pool(ref e) => tracing::error!("Pool error: {}", e),
            AppError::CreatePool(ref e) => tracing::error!("Pool creation error: {}", e),
            AppError::Json(ref e) => tracing::warn!("Malformed JSON: {}", e),
            AppError::Http(ref e) => tracing::error!("Network error: {}", e),
            AppError::Api { status, ref details } => {
                tracing::error!("Upstream API error {}: {}", status, details)
            }
            AppError::NotFound(id) => tracing::debug!("Session {} not found", id),
            AppError::Validation(ref msg) => tracing::debug!("Validation error: {}", msg),
            AppError::Internal(ref msg) => tracing::error!("Internal error: {}", msg),
        }

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": "Internal Server Error",
            "details": self.to_string()
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal Server Error"}"#.to_string());

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
