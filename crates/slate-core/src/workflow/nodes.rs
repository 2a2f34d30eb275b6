//! Workflow nodes: data gathering, the six analysis sections, and the review
//! gate. Each node returns a partial [`StateUpdate`] merged via the rules in
//! [`super::state`]; the review gate writes its verdict directly.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;

use crate::agents::{self, Generator};
use crate::workflow::state::{ScriptState, StateUpdate};
use crate::workflow::Section;

/// Extract scenes and aggregate script data from the raw text.
pub async fn run_gathering(generator: &dyn Generator, state: &ScriptState) -> StateUpdate {
    let started = Utc::now();
    let raw = agents::gather::extract_script_data(generator, &state.script_content).await;
    let elapsed = (Utc::now() - started).num_milliseconds();

    tracing::info!(
        scenes = raw.total_scene_count,
        characters = raw.total_characters.len(),
        locations = raw.total_locations.len(),
        elapsed_ms = elapsed,
        "script data extraction complete"
    );

    StateUpdate {
        current_agent: Some("info_gathering".to_string()),
        raw_data: Some(raw),
        extraction_complete: true,
        processing_metadata: HashMap::from([
            ("extraction_ms".to_string(), Value::from(elapsed)),
            (
                "extraction_timestamp".to_string(),
                Value::from(started.to_rfc3339()),
            ),
        ]),
        ..Default::default()
    }
}

/// Run one analysis section against the gathered data. A fallback result
/// still completes the section; only the error list records the difference.
pub async fn run_section(
    generator: &dyn Generator,
    section: Section,
    state: &ScriptState,
) -> StateUpdate {
    let name = section.as_str();

    let raw = match &state.raw_data {
        Some(raw) => raw,
        None => {
            return StateUpdate {
                current_agent: Some(format!("{name}_analysis")),
                errors: vec![format!("No raw data available for {name} analysis")],
                ..Default::default()
            };
        }
    };

    if let Some(feedback) = state.human_feedback.get(name) {
        tracing::info!(section = name, feedback, "re-running section with feedback");
    }

    let mut update = StateUpdate {
        current_agent: Some(format!("{name}_analysis")),
        analyses_complete: HashMap::from([(name.to_string(), true)]),
        needs_revision: HashMap::from([(name.to_string(), false)]),
        processing_metadata: HashMap::from([(
            format!("{name}_completed_at"),
            Value::from(Utc::now().to_rfc3339()),
        )]),
        ..Default::default()
    };

    let reason = match section {
        Section::Cost => {
            let (value, reason) = agents::cost::analyze(generator, raw).await.into_parts();
            update.cost_analysis = Some(value);
            reason
        }
        Section::Props => {
            let (value, reason) = agents::props::analyze(generator, raw).await.into_parts();
            update.props_analysis = Some(value);
            reason
        }
        Section::Location => {
            let (value, reason) = agents::location::analyze(generator, raw).await.into_parts();
            update.location_analysis = Some(value);
            reason
        }
        Section::Character => {
            let (value, reason) = agents::character::analyze(generator, raw).await.into_parts();
            update.character_analysis = Some(value);
            reason
        }
        Section::Scene => {
            let (value, reason) = agents::scene::analyze(generator, raw).await.into_parts();
            update.scene_analysis = Some(value);
            reason
        }
        Section::Timeline => {
            let (value, reason) = agents::timeline::analyze(generator, raw).await.into_parts();
            update.timeline_analysis = Some(value);
            reason
        }
    };

    if let Some(reason) = reason {
        tracing::warn!(section = name, %reason, "section fell back to placeholder result");
        update.errors.push(reason);
    }

    update
}

/// The review gate. Completion flags are derived here and nowhere else:
/// the task is complete only when every section has a result and no
/// revision request is outstanding.
pub fn human_review(state: &mut ScriptState) {
    state.current_agent = Some("human_review".to_string());

    let pending = state.sections_to_revise();
    if pending.is_empty() {
        state.human_review_complete = true;
        state.task_complete = state.all_analyses_complete();
        state.processing_metadata.insert(
            "review_completed_at".to_string(),
            Value::from(Utc::now().to_rfc3339()),
        );
    } else {
        tracing::info!(?pending, "revisions requested, review stays open");
        state.human_review_complete = false;
        state.task_complete = false;
        state
            .processing_metadata
            .insert("revision_in_progress".to_string(), Value::Bool(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentError;
    use async_trait::async_trait;

    struct AlwaysFail;

    #[async_trait]
    impl Generator for AlwaysFail {
        async fn generate(&self, _: &str, _: &str) -> Result<String, AgentError> {
            Err(AgentError::Http("timeout".to_string()))
        }
    }

    const SCRIPT: &str = "INT. KITCHEN - DAY\nJOHN\nHi.\nEXT. STREET - NIGHT\nAn explosion.\nINT. OFFICE - DAY\nMARY\nBye.\n";

    #[tokio::test]
    async fn test_gathering_then_failing_cost_section() {
        let mut state = ScriptState::new(SCRIPT.to_string());
        state.apply(run_gathering(&AlwaysFail, &state).await);

        assert!(state.extraction_complete);
        assert_eq!(state.raw_data.as_ref().unwrap().total_scene_count, 3);

        state.apply(run_section(&AlwaysFail, Section::Cost, &state).await);

        let cost = state.cost_analysis.as_ref().unwrap();
        assert_eq!(cost.scene_costs.len(), 3);
        assert!(state.analyses_complete["cost"]);
        assert_eq!(
            state
                .errors
                .iter()
                .filter(|e| e.starts_with("Error in cost analysis"))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_review_gate_completes_only_when_all_sections_done() {
        let mut state = ScriptState::new(SCRIPT.to_string());
        state.apply(run_gathering(&AlwaysFail, &state).await);

        for section in Section::ALL {
            state.apply(run_section(&AlwaysFail, section, &state).await);
        }

        human_review(&mut state);
        assert!(state.human_review_complete);
        assert!(state.task_complete);
    }

    #[tokio::test]
    async fn test_review_gate_stays_open_while_revision_flagged() {
        let mut state = ScriptState::new(SCRIPT.to_string());
        state.needs_revision.insert("scene".to_string(), true);

        human_review(&mut state);
        assert!(!state.human_review_complete);
        assert!(!state.task_complete);
    }

    #[tokio::test]
    async fn test_section_without_raw_data_records_error() {
        let state = ScriptState::new(SCRIPT.to_string());
        let update = run_section(&AlwaysFail, Section::Props, &state).await;
        assert!(update.props_analysis.is_none());
        assert_eq!(update.errors.len(), 1);
        assert!(update.analyses_complete.is_empty());
    }
}
