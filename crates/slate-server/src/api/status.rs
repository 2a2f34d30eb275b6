use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use slate_core::error::ServerError;
use slate_core::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/workflow-status/{thread_id}", get(workflow_status))
}

/// Status snapshot for a workflow thread: completion flags only, no payloads.
async fn workflow_status(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let snapshot = state
        .workflow
        .state(&thread_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Workflow not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Status retrieved successfully",
        "thread_id": thread_id,
        "task_complete": snapshot.task_complete,
        "human_review_complete": snapshot.human_review_complete,
        "analyses_complete": snapshot.analyses_complete,
        "needs_revision": snapshot.needs_revision,
    })))
}
