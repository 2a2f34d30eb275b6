use std::collections::HashMap;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use slate_core::error::ServerError;
use slate_core::state::AppState;
use slate_core::workflow::graph::ReviewFeedback;

use super::analysis_response;

pub fn router() -> Router<AppState> {
    Router::new().route("/submit-feedback", post(submit_feedback))
}

#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    thread_id: String,
    #[serde(default)]
    feedback: HashMap<String, String>,
    #[serde(default)]
    needs_revision: HashMap<String, bool>,
}

/// Submit reviewer feedback and trigger revisions for the flagged sections.
async fn submit_feedback(
    State(state): State<AppState>,
    Json(body): Json<FeedbackRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let requested: Vec<&String> = body
        .needs_revision
        .iter()
        .filter(|(_, &v)| v)
        .map(|(k, _)| k)
        .collect();
    tracing::info!(thread_id = %body.thread_id, ?requested, "processing reviewer feedback");

    // No revisions requested means approval: close the review without
    // re-running any agent.
    if requested.is_empty() {
        let result = state.workflow.approve(&body.thread_id).await?;
        return Ok(Json(analysis_response(
            &body.thread_id,
            &result,
            "All analyses approved. Analysis complete!",
        )));
    }

    let feedback = ReviewFeedback {
        feedback: body.feedback,
        needs_revision: body.needs_revision,
    };
    let result = state.workflow.resume(&body.thread_id, Some(feedback)).await?;

    let message = if result.task_complete {
        "All revisions complete!"
    } else {
        "Revisions processed. Please review the updated results."
    };
    Ok(Json(analysis_response(&body.thread_id, &result, message)))
}
