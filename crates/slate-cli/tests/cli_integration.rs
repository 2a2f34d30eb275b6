//! Integration tests for the slate-cli commands.
//!
//! These tests verify the command code paths end to end, using in-memory
//! SQLite databases and a scripted generation backend for isolation.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;

use slate_core::agents::{AgentError, Generator};
use slate_core::extract;
use slate_core::state::{AppState, AppStateInner};
use slate_core::workflow::graph::ReviewFeedback;
use slate_core::Database;

struct AlwaysFail;

#[async_trait]
impl Generator for AlwaysFail {
    async fn generate(&self, _: &str, _: &str) -> Result<String, AgentError> {
        Err(AgentError::Http("timeout".to_string()))
    }
}

/// Create an in-memory AppState for testing.
fn test_state() -> AppState {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    Arc::new(AppStateInner::new(db, Arc::new(AlwaysFail)))
}

const THREE_SCENE_SCRIPT: &str = "\
INT. KITCHEN - DAY
JOHN
Morning already?
EXT. STREET - NIGHT
An explosion rocks the block.
INT. OFFICE - DAY
MARY
Sign here please.
";

#[tokio::test]
async fn test_analyze_reaches_review_with_fallbacks() {
    let state = test_state();

    let result = state
        .workflow
        .run(THREE_SCENE_SCRIPT, None, "script_test0001")
        .await
        .expect("workflow run failed");

    assert!(result.extraction_complete);
    assert!(result.human_review_complete);
    assert!(result.task_complete);

    let cost = result.cost_analysis.as_ref().expect("cost analysis missing");
    assert_eq!(cost.scene_costs.len(), 3);
    assert!(result
        .errors
        .iter()
        .any(|e| e.starts_with("Error in cost analysis")));
}

#[tokio::test]
async fn test_analyze_from_text_file() {
    let state = test_state();

    let mut file = tempfile::Builder::new()
        .suffix(".txt")
        .tempfile()
        .expect("tempfile");
    file.write_all(THREE_SCENE_SCRIPT.as_bytes()).expect("write");

    let path = file.path().to_string_lossy().to_string();
    let bytes = std::fs::read(&path).expect("read back");
    let kind = extract::source_kind(&path).expect("kind");
    let content = extract::extract_script_text(&bytes, kind).expect("extract");

    let result = state
        .workflow
        .run(&content, None, "script_test0002")
        .await
        .expect("workflow run failed");
    assert_eq!(result.raw_data.unwrap().total_scene_count, 3);
}

#[test]
fn test_unsupported_extension_is_rejected() {
    assert!(extract::source_kind("notes.docx").is_err());
    assert!(extract::source_kind("script.fountain").is_ok());
}

#[tokio::test]
async fn test_feedback_flow_matches_status() {
    let state = test_state();
    let thread_id = "script_test0003";

    state
        .workflow
        .run(THREE_SCENE_SCRIPT, None, thread_id)
        .await
        .expect("workflow run failed");

    let before = state
        .workflow
        .state(thread_id)
        .await
        .expect("status lookup failed")
        .expect("missing thread");
    assert!(before.task_complete);

    let feedback = ReviewFeedback {
        feedback: HashMap::from([("scene".to_string(), "add more action".to_string())]),
        needs_revision: HashMap::from([("scene".to_string(), true)]),
    };
    let after = state
        .workflow
        .resume(thread_id, Some(feedback))
        .await
        .expect("resume failed");

    assert!(after.task_complete);
    assert_eq!(after.human_feedback["scene"], "add more action");

    // Sections that were not flagged survive the revision untouched.
    assert_eq!(
        serde_json::to_string(&after.props_analysis).unwrap(),
        serde_json::to_string(&before.props_analysis).unwrap()
    );

    let persisted = state
        .workflow
        .state(thread_id)
        .await
        .expect("status lookup failed")
        .expect("missing thread");
    assert!(persisted.task_complete);
    assert!(persisted.analyses_complete.values().all(|&v| v));
}

#[tokio::test]
async fn test_approve_without_revisions() {
    let state = test_state();
    let thread_id = "script_test0004";

    state
        .workflow
        .run(THREE_SCENE_SCRIPT, None, thread_id)
        .await
        .expect("workflow run failed");

    let approved = state.workflow.approve(thread_id).await.expect("approve failed");
    assert!(approved.human_review_complete);
    assert!(approved.task_complete);
}
