pub mod analyze;
pub mod feedback;
pub mod status;

use axum::Router;
use serde_json::{json, Value};

use slate_core::state::AppState;
use slate_core::workflow::ScriptState;

/// Build the complete API router with all sub-routes.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(analyze::router())
        .merge(feedback::router())
        .merge(status::router())
}

/// The full analysis payload returned under `data` in every response.
pub(crate) fn state_payload(state: &ScriptState) -> Value {
    json!({
        "raw_data": state.raw_data,
        "cost_analysis": state.cost_analysis,
        "character_analysis": state.character_analysis,
        "location_analysis": state.location_analysis,
        "props_analysis": state.props_analysis,
        "scene_analysis": state.scene_analysis,
        "timeline_analysis": state.timeline_analysis,
        "task_complete": state.task_complete,
        "human_review_complete": state.human_review_complete,
        "analyses_complete": state.analyses_complete,
        "errors": state.errors,
    })
}

/// Standard success envelope wrapping a finished workflow state.
pub(crate) fn analysis_response(thread_id: &str, state: &ScriptState, message: &str) -> Value {
    json!({
        "success": true,
        "message": message,
        "thread_id": thread_id,
        "needs_human_review": !state.task_complete,
        "data": state_payload(state),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use slate_core::agents::{AgentError, Generator};
    use slate_core::db::Database;
    use slate_core::state::AppStateInner;

    use crate::build_router;

    struct AlwaysFail;

    #[async_trait]
    impl Generator for AlwaysFail {
        async fn generate(&self, _: &str, _: &str) -> Result<String, AgentError> {
            Err(AgentError::Http("timeout".to_string()))
        }
    }

    fn test_app() -> axum::Router {
        let db = Database::open_in_memory().unwrap();
        let state = Arc::new(AppStateInner::new(db, Arc::new(AlwaysFail)));
        build_router(state, None)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    const SCRIPT: &str =
        "INT. KITCHEN - DAY\nJOHN\nHi.\nEXT. STREET - NIGHT\nAn explosion.\nINT. OFFICE - DAY\nMARY\nBye.\n";

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_analyze_script_then_status_then_feedback() {
        let app = test_app();

        let request = Request::post("/analyze-script")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "script_content": SCRIPT }).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["needs_human_review"], false);
        let thread_id = body["thread_id"].as_str().unwrap().to_string();
        assert!(thread_id.starts_with("script_"));
        assert_eq!(
            body["data"]["cost_analysis"]["scene_costs"]
                .as_array()
                .unwrap()
                .len(),
            3
        );

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/workflow-status/{thread_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["task_complete"], true);
        assert_eq!(body["analyses_complete"]["scene"], true);

        let feedback = serde_json::json!({
            "thread_id": thread_id,
            "feedback": HashMap::from([("scene", "add more action")]),
            "needs_revision": HashMap::from([("scene", true)]),
        });
        let request = Request::post("/submit-feedback")
            .header("content-type", "application/json")
            .body(Body::from(feedback.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["needs_human_review"], false);
    }

    const BOUNDARY: &str = "slate-test-boundary";

    fn multipart_request(field_name: &str, filename: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::post("/analyze-script-file")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_analyze_script_file_upload() {
        let app = test_app();
        let response = app
            .oneshot(multipart_request("file", "pilot.txt", SCRIPT))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["filename"], "pilot.txt");
        assert!(body["thread_id"].as_str().unwrap().starts_with("script_"));
        assert_eq!(
            body["data"]["cost_analysis"]["scene_costs"]
                .as_array()
                .unwrap()
                .len(),
            3
        );
    }

    #[tokio::test]
    async fn test_analyze_script_file_rejects_unsupported_extension() {
        let app = test_app();
        let response = app
            .oneshot(multipart_request("file", "pilot.docx", SCRIPT))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_analyze_script_file_requires_file_field() {
        let app = test_app();
        let response = app
            .oneshot(multipart_request("attachment", "pilot.txt", SCRIPT))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Bad request: Missing file upload");
    }

    #[tokio::test]
    async fn test_analyze_script_rejects_short_content() {
        let app = test_app();
        let request = Request::post("/analyze-script")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "script_content": "hi" }).to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_status_unknown_thread_is_404() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::get("/workflow-status/script_missing0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
