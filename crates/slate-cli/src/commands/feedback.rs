//! `slate feedback` — Submit reviewer feedback or approve a run.

use std::collections::HashMap;

use slate_core::state::AppState;
use slate_core::workflow::graph::ReviewFeedback;
use slate_core::workflow::Section;

use super::print_json;

pub async fn run(
    state: &AppState,
    thread_id: &str,
    section: Option<&str>,
    note: Option<&str>,
    approve: bool,
) -> Result<(), String> {
    let result = if approve || section.is_none() {
        state
            .workflow
            .approve(thread_id)
            .await
            .map_err(|e| e.to_string())?
    } else {
        let section = section.unwrap();
        Section::from_str(section)
            .ok_or_else(|| format!("Unknown section: {section}"))?;

        let feedback = ReviewFeedback {
            feedback: note
                .map(|n| HashMap::from([(section.to_string(), n.to_string())]))
                .unwrap_or_default(),
            needs_revision: HashMap::from([(section.to_string(), true)]),
        };
        state
            .workflow
            .resume(thread_id, Some(feedback))
            .await
            .map_err(|e| e.to_string())?
    };

    print_json(&serde_json::json!({
        "thread_id": thread_id,
        "task_complete": result.task_complete,
        "human_review_complete": result.human_review_complete,
        "analyses_complete": result.analyses_complete,
        "errors": result.errors,
    }));
    Ok(())
}
