//! The workflow runner: gathering fans out into six concurrent analysis
//! sections, a review gate closes the run, and every node boundary is
//! checkpointed so a thread can resume after reviewer feedback.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agents::Generator;
use crate::error::ServerError;
use crate::store::SessionStore;
use crate::workflow::nodes;
use crate::workflow::state::ScriptState;
use crate::workflow::Section;

/// Upper bound on review rounds within one invocation. Each round clears the
/// revision flags it runs, so this only trips on a logic error.
const MAX_REVIEW_ROUNDS: usize = 25;

const MIN_SCRIPT_CHARS: usize = 10;

/// Reviewer feedback payload: notes and revision flags keyed by section name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewFeedback {
    #[serde(default)]
    pub feedback: HashMap<String, String>,
    #[serde(default)]
    pub needs_revision: HashMap<String, bool>,
}

/// A fresh thread identifier, e.g. `script_3fa4b2c1`.
pub fn new_thread_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("script_{}", &hex[..8])
}

pub struct ScriptWorkflow {
    generator: Arc<dyn Generator>,
    sessions: SessionStore,
}

impl ScriptWorkflow {
    pub fn new(generator: Arc<dyn Generator>, sessions: SessionStore) -> Self {
        Self {
            generator,
            sessions,
        }
    }

    /// Run a full analysis from raw script text, checkpointing under
    /// `thread_id`. Optional feedback pre-flags sections for revision.
    pub async fn run(
        &self,
        script_content: &str,
        feedback: Option<ReviewFeedback>,
        thread_id: &str,
    ) -> Result<ScriptState, ServerError> {
        if script_content.trim().len() < MIN_SCRIPT_CHARS {
            return Err(ServerError::BadRequest(
                "Script content is too short or empty".to_string(),
            ));
        }

        tracing::info!(thread_id, "starting script analysis workflow");

        let mut state = ScriptState::new(script_content.to_string());
        if let Some(fb) = feedback {
            state.apply_feedback(fb.feedback, fb.needs_revision);
        }

        let update = nodes::run_gathering(self.generator.as_ref(), &state).await;
        state.apply(update);
        self.sessions
            .append(thread_id, "info_gathering", &state)
            .await?;

        self.drive_to_review(&mut state, thread_id).await?;
        Ok(state)
    }

    /// Reload the latest checkpoint for a thread and continue, optionally
    /// applying new reviewer feedback first. Only flagged (or never-run)
    /// sections are re-invoked.
    pub async fn resume(
        &self,
        thread_id: &str,
        feedback: Option<ReviewFeedback>,
    ) -> Result<ScriptState, ServerError> {
        let mut state = self.sessions.latest(thread_id).await?.ok_or_else(|| {
            ServerError::NotFound(format!("No workflow state found for thread: {thread_id}"))
        })?;

        tracing::info!(thread_id, "resuming workflow from checkpoint");

        if let Some(fb) = feedback {
            state.apply_feedback(fb.feedback, fb.needs_revision);
            self.sessions.append(thread_id, "feedback", &state).await?;
        }

        if state.raw_data.is_none() {
            let update = nodes::run_gathering(self.generator.as_ref(), &state).await;
            state.apply(update);
            self.sessions
                .append(thread_id, "info_gathering", &state)
                .await?;
        }

        self.drive_to_review(&mut state, thread_id).await?;
        Ok(state)
    }

    /// The latest checkpointed state for a thread, if any.
    pub async fn state(&self, thread_id: &str) -> Result<Option<ScriptState>, ServerError> {
        self.sessions.latest(thread_id).await
    }

    /// The node checkpoints recorded for a thread, in write order.
    pub async fn node_history(&self, thread_id: &str) -> Result<Vec<String>, ServerError> {
        self.sessions.node_history(thread_id).await
    }

    /// Approve a thread as-is: clear any revision flags and close the review
    /// gate without re-running agents.
    pub async fn approve(&self, thread_id: &str) -> Result<ScriptState, ServerError> {
        let mut state = self.sessions.latest(thread_id).await?.ok_or_else(|| {
            ServerError::NotFound(format!("No workflow state found for thread: {thread_id}"))
        })?;

        for flag in state.needs_revision.values_mut() {
            *flag = false;
        }
        nodes::human_review(&mut state);
        self.sessions.append(thread_id, "human_review", &state).await?;
        Ok(state)
    }

    /// Run pending sections and the review gate until the gate closes.
    async fn drive_to_review(
        &self,
        state: &mut ScriptState,
        thread_id: &str,
    ) -> Result<(), ServerError> {
        for _ in 0..MAX_REVIEW_ROUNDS {
            let pending = self.pending_sections(state);

            if pending.is_empty() {
                nodes::human_review(state);
                self.sessions.append(thread_id, "human_review", state).await?;
                return Ok(());
            }

            if pending.len() == Section::ALL.len() {
                // Fresh run: fan all six out concurrently. They only read the
                // gathered data, so the merged result is order-independent.
                let generator = self.generator.as_ref();
                let (cost, props, location, character, scene, timeline) = tokio::join!(
                    nodes::run_section(generator, Section::Cost, state),
                    nodes::run_section(generator, Section::Props, state),
                    nodes::run_section(generator, Section::Location, state),
                    nodes::run_section(generator, Section::Character, state),
                    nodes::run_section(generator, Section::Scene, state),
                    nodes::run_section(generator, Section::Timeline, state),
                );
                for (section, update) in
                    Section::ALL.into_iter().zip([cost, props, location, character, scene, timeline])
                {
                    state.apply(update);
                    self.sessions
                        .append(thread_id, &format!("{}_node", section.as_str()), state)
                        .await?;
                }
            } else {
                for section in pending {
                    let update =
                        nodes::run_section(self.generator.as_ref(), section, state).await;
                    state.apply(update);
                    self.sessions
                        .append(thread_id, &format!("{}_node", section.as_str()), state)
                        .await?;
                }
            }
        }

        Err(ServerError::Internal(
            "workflow exceeded the review round limit".to_string(),
        ))
    }

    /// Sections flagged for revision, or, on a fresh run, sections that have
    /// never produced a result.
    fn pending_sections(&self, state: &ScriptState) -> Vec<Section> {
        let flagged = state.sections_to_revise();
        if !flagged.is_empty() {
            return flagged;
        }
        Section::ALL
            .into_iter()
            .filter(|s| {
                !state
                    .analyses_complete
                    .get(s.as_str())
                    .copied()
                    .unwrap_or(false)
            })
            .collect()
    }
}
