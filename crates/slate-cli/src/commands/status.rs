//! `slate status` — Show the status of an analysis thread.

use slate_core::state::AppState;

use super::print_json;

pub async fn run(state: &AppState, thread_id: &str) -> Result<(), String> {
    let snapshot = state
        .workflow
        .state(thread_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("No workflow state found for thread: {thread_id}"))?;

    let history = state
        .workflow
        .node_history(thread_id)
        .await
        .map_err(|e| e.to_string())?;

    print_json(&serde_json::json!({
        "thread_id": thread_id,
        "task_complete": snapshot.task_complete,
        "human_review_complete": snapshot.human_review_complete,
        "analyses_complete": snapshot.analyses_complete,
        "needs_revision": snapshot.needs_revision,
        "node_history": history,
        "errors": snapshot.errors,
    }));
    Ok(())
}
