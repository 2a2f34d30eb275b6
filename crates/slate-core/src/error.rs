//! Core error type for the Slate platform.
//!
//! `ServerError` is used throughout the core domain (stores, workflow, etc.).
//! When the `axum` feature is enabled, it also implements `IntoResponse`
//! so it can be used directly as an axum handler error type.
//!
//! Generation-call failures are deliberately *not* represented here: they are
//! absorbed into section fallbacks inside the agent layer (`AgentError`) and
//! never abort a workflow run.

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// axum integration (opt-in via feature flag)
// ---------------------------------------------------------------------------

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            ServerError::UnsupportedFile(_)
            | ServerError::Extraction(_)
            | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Database(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = self.to_string();
        let body = serde_json::json!({
            "success": false,
            "error": message,
            "message": message,
        });
        (status, axum::Json(body)).into_response()
    }
}
