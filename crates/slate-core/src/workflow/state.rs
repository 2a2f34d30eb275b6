//! Shared workflow state and the merge rules that keep concurrent section
//! updates commutative.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
    CharacterBreakdown, CostBreakdown, LocationBreakdown, PropsBreakdown, RawScriptData,
    SceneBreakdown, TimelineBreakdown,
};
use crate::workflow::Section;

/// The single record threaded through an analysis run. Persisted as a JSON
/// snapshot at every node boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptState {
    pub script_content: String,

    pub current_agent: Option<String>,
    pub task_complete: bool,

    pub raw_data: Option<RawScriptData>,
    pub extraction_complete: bool,

    pub cost_analysis: Option<CostBreakdown>,
    pub props_analysis: Option<PropsBreakdown>,
    pub location_analysis: Option<LocationBreakdown>,
    pub character_analysis: Option<CharacterBreakdown>,
    pub scene_analysis: Option<SceneBreakdown>,
    pub timeline_analysis: Option<TimelineBreakdown>,

    pub human_review_complete: bool,
    /// Revision notes keyed by section name.
    pub human_feedback: HashMap<String, String>,
    /// Which sections the reviewer wants redone. Always holds all six keys.
    pub needs_revision: HashMap<String, bool>,
    /// Which sections have produced a result. Always holds all six keys.
    pub analyses_complete: HashMap<String, bool>,

    pub processing_metadata: HashMap<String, Value>,
    pub errors: Vec<String>,
}

fn all_sections_false() -> HashMap<String, bool> {
    Section::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), false))
        .collect()
}

impl ScriptState {
    pub fn new(script_content: String) -> Self {
        Self {
            script_content,
            current_agent: None,
            task_complete: false,
            raw_data: None,
            extraction_complete: false,
            cost_analysis: None,
            props_analysis: None,
            location_analysis: None,
            character_analysis: None,
            scene_analysis: None,
            timeline_analysis: None,
            human_review_complete: false,
            human_feedback: HashMap::new(),
            needs_revision: all_sections_false(),
            analyses_complete: all_sections_false(),
            processing_metadata: HashMap::new(),
            errors: Vec::new(),
        }
    }

    /// Merge one node's partial update into the state. Field rules: maps are
    /// key-wise unions (later value wins per key), lists concatenate, booleans
    /// OR, options take the new value when present. Section results are each
    /// written by exactly one node, so these rules make concurrent section
    /// updates commutative.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(agent) = update.current_agent {
            self.current_agent = Some(agent);
        }
        if let Some(raw) = update.raw_data {
            self.raw_data = Some(raw);
        }
        self.extraction_complete |= update.extraction_complete;

        if let Some(v) = update.cost_analysis {
            self.cost_analysis = Some(v);
        }
        if let Some(v) = update.props_analysis {
            self.props_analysis = Some(v);
        }
        if let Some(v) = update.location_analysis {
            self.location_analysis = Some(v);
        }
        if let Some(v) = update.character_analysis {
            self.character_analysis = Some(v);
        }
        if let Some(v) = update.scene_analysis {
            self.scene_analysis = Some(v);
        }
        if let Some(v) = update.timeline_analysis {
            self.timeline_analysis = Some(v);
        }

        self.analyses_complete.extend(update.analyses_complete);
        self.needs_revision.extend(update.needs_revision);
        self.processing_metadata.extend(update.processing_metadata);
        self.errors.extend(update.errors);
    }

    /// Apply reviewer feedback. Unlike node updates this is a direct write:
    /// the review gate reopens and the requested sections are flagged for
    /// another pass, replacing any earlier revision requests.
    pub fn apply_feedback(
        &mut self,
        feedback: HashMap<String, String>,
        needs_revision: HashMap<String, bool>,
    ) {
        self.human_feedback.extend(feedback);
        self.needs_revision = all_sections_false();
        self.needs_revision.extend(needs_revision);
        self.human_review_complete = false;
        self.task_complete = false;
        self.processing_metadata
            .insert("revision_mode".to_string(), Value::Bool(true));
    }

    pub fn all_analyses_complete(&self) -> bool {
        Section::ALL
            .iter()
            .all(|s| self.analyses_complete.get(s.as_str()).copied().unwrap_or(false))
    }

    pub fn any_revision_requested(&self) -> bool {
        self.needs_revision.values().any(|&v| v)
    }

    /// Sections still flagged for another pass, in canonical order.
    pub fn sections_to_revise(&self) -> Vec<Section> {
        Section::ALL
            .iter()
            .copied()
            .filter(|s| self.needs_revision.get(s.as_str()).copied().unwrap_or(false))
            .collect()
    }
}

/// A partial update produced by one workflow node.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub current_agent: Option<String>,
    pub raw_data: Option<RawScriptData>,
    pub extraction_complete: bool,

    pub cost_analysis: Option<CostBreakdown>,
    pub props_analysis: Option<PropsBreakdown>,
    pub location_analysis: Option<LocationBreakdown>,
    pub character_analysis: Option<CharacterBreakdown>,
    pub scene_analysis: Option<SceneBreakdown>,
    pub timeline_analysis: Option<TimelineBreakdown>,

    pub analyses_complete: HashMap<String, bool>,
    pub needs_revision: HashMap<String, bool>,
    pub processing_metadata: HashMap<String, Value>,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost_update() -> StateUpdate {
        StateUpdate {
            current_agent: Some("cost_analysis".to_string()),
            analyses_complete: HashMap::from([("cost".to_string(), true)]),
            errors: vec!["cost warning".to_string()],
            ..Default::default()
        }
    }

    fn props_update() -> StateUpdate {
        StateUpdate {
            current_agent: Some("props_analysis".to_string()),
            analyses_complete: HashMap::from([("props".to_string(), true)]),
            errors: vec!["props warning".to_string()],
            ..Default::default()
        }
    }

    fn location_update() -> StateUpdate {
        StateUpdate {
            current_agent: Some("location_analysis".to_string()),
            analyses_complete: HashMap::from([("location".to_string(), true)]),
            needs_revision: HashMap::from([("location".to_string(), false)]),
            processing_metadata: HashMap::from([(
                "location_completed_at".to_string(),
                Value::String("t1".to_string()),
            )]),
            errors: vec!["location warning".to_string()],
            ..Default::default()
        }
    }

    /// Fold two updates into one, using the same field rules as
    /// `ScriptState::apply`.
    fn combine(mut a: StateUpdate, b: StateUpdate) -> StateUpdate {
        if b.current_agent.is_some() {
            a.current_agent = b.current_agent;
        }
        if b.raw_data.is_some() {
            a.raw_data = b.raw_data;
        }
        a.extraction_complete |= b.extraction_complete;
        if b.cost_analysis.is_some() {
            a.cost_analysis = b.cost_analysis;
        }
        if b.props_analysis.is_some() {
            a.props_analysis = b.props_analysis;
        }
        if b.location_analysis.is_some() {
            a.location_analysis = b.location_analysis;
        }
        if b.character_analysis.is_some() {
            a.character_analysis = b.character_analysis;
        }
        if b.scene_analysis.is_some() {
            a.scene_analysis = b.scene_analysis;
        }
        if b.timeline_analysis.is_some() {
            a.timeline_analysis = b.timeline_analysis;
        }
        a.analyses_complete.extend(b.analyses_complete);
        a.needs_revision.extend(b.needs_revision);
        a.processing_metadata.extend(b.processing_metadata);
        a.errors.extend(b.errors);
        a
    }

    #[test]
    fn test_map_and_bool_merges_commute() {
        let mut ab = ScriptState::new("x".to_string());
        ab.apply(cost_update());
        ab.apply(props_update());

        let mut ba = ScriptState::new("x".to_string());
        ba.apply(props_update());
        ba.apply(cost_update());

        assert_eq!(ab.analyses_complete, ba.analyses_complete);
        assert_eq!(ab.extraction_complete, ba.extraction_complete);
        assert!(ab.analyses_complete["cost"]);
        assert!(ab.analyses_complete["props"]);

        // List merge preserves both sides regardless of order.
        let mut ab_errors = ab.errors.clone();
        let mut ba_errors = ba.errors.clone();
        ab_errors.sort();
        ba_errors.sort();
        assert_eq!(ab_errors, ba_errors);
    }

    #[test]
    fn test_merge_is_associative_across_three_sections() {
        let mut left = ScriptState::new("x".to_string());
        left.apply(combine(combine(cost_update(), props_update()), location_update()));

        let mut right = ScriptState::new("x".to_string());
        right.apply(combine(cost_update(), combine(props_update(), location_update())));

        assert_eq!(left.analyses_complete, right.analyses_complete);
        assert_eq!(left.needs_revision, right.needs_revision);
        assert_eq!(left.processing_metadata, right.processing_metadata);
        assert_eq!(left.extraction_complete, right.extraction_complete);
        assert_eq!(left.current_agent, right.current_agent);
        assert_eq!(left.errors, right.errors);

        // Either grouping matches applying the updates one at a time.
        let mut sequential = ScriptState::new("x".to_string());
        sequential.apply(cost_update());
        sequential.apply(props_update());
        sequential.apply(location_update());
        assert_eq!(left.analyses_complete, sequential.analyses_complete);
        assert_eq!(left.errors, sequential.errors);
    }

    #[test]
    fn test_apply_never_drops_earlier_results() {
        let mut state = ScriptState::new("x".to_string());
        state.apply(cost_update());
        state.apply(props_update());

        assert!(state.analyses_complete["cost"]);
        assert_eq!(state.errors.len(), 2);
        assert_eq!(state.current_agent.as_deref(), Some("props_analysis"));
    }

    #[test]
    fn test_feedback_reopens_review_and_replaces_revision_flags() {
        let mut state = ScriptState::new("x".to_string());
        for section in Section::ALL {
            state
                .analyses_complete
                .insert(section.as_str().to_string(), true);
        }
        state.human_review_complete = true;
        state.task_complete = true;
        state.needs_revision.insert("cost".to_string(), true);

        state.apply_feedback(
            HashMap::from([("scene".to_string(), "add more action".to_string())]),
            HashMap::from([("scene".to_string(), true)]),
        );

        assert!(!state.human_review_complete);
        assert!(!state.task_complete);
        assert_eq!(state.sections_to_revise(), vec![Section::Scene]);
        assert!(!state.needs_revision["cost"]);
        assert_eq!(state.human_feedback["scene"], "add more action");
    }

    #[test]
    fn test_all_analyses_complete_requires_all_six() {
        let mut state = ScriptState::new("x".to_string());
        assert!(!state.all_analyses_complete());
        for section in Section::ALL {
            state
                .analyses_complete
                .insert(section.as_str().to_string(), true);
        }
        assert!(state.all_analyses_complete());
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let state = ScriptState::new("INT. A - DAY".to_string());
        let json = serde_json::to_string(&state).unwrap();
        let back: ScriptState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.script_content, state.script_content);
        assert_eq!(back.needs_revision.len(), 6);
    }
}
