use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use slate_core::error::ServerError;
use slate_core::extract;
use slate_core::state::AppState;
use slate_core::workflow::graph::new_thread_id;

use super::analysis_response;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze-script-file", post(analyze_script_file))
        .route("/analyze-script", post(analyze_script))
}

/// Analyze a script from an uploaded PDF or text file.
async fn analyze_script_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ServerError> {
    let mut filename = None;
    let mut bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(String::from);
            bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Failed to read upload: {e}")))?,
            );
            break;
        }
    }

    let filename =
        filename.ok_or_else(|| ServerError::BadRequest("Missing file upload".to_string()))?;
    let bytes =
        bytes.ok_or_else(|| ServerError::BadRequest("Uploaded file is empty".to_string()))?;

    let kind = extract::source_kind(&filename)?;
    let script_content = extract::extract_script_text(&bytes, kind)?;

    let thread_id = new_thread_id();
    tracing::info!(thread_id, filename, "starting analysis for uploaded file");

    let result = state.workflow.run(&script_content, None, &thread_id).await?;

    let mut response = analysis_response(
        &thread_id,
        &result,
        &format!("Analysis completed for {filename}. Please review the results."),
    );
    response["filename"] = serde_json::Value::from(filename);
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct ScriptRequest {
    script_content: String,
}

/// Analyze script text submitted directly in the request body.
async fn analyze_script(
    State(state): State<AppState>,
    Json(body): Json<ScriptRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let thread_id = new_thread_id();
    tracing::info!(thread_id, "starting analysis for submitted text");

    let result = state
        .workflow
        .run(&body.script_content, None, &thread_id)
        .await?;

    Ok(Json(analysis_response(
        &thread_id,
        &result,
        "Initial analysis completed. Please review the results.",
    )))
}
