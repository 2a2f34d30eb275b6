//! Per-section breakdown records: one entry per scene plus one aggregate,
//! always fully populated (real or fallback).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─── Cost ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneCostBreakdown {
    pub scene_number: usize,
    /// Low/Medium/High location cost.
    pub location_cost_category: String,
    pub equipment_needs: Vec<String>,
    /// Minimal/Standard/Large crew requirement.
    pub crew_size_needed: String,
    pub estimated_shoot_hours: u32,
    pub complexity_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub scene_costs: Vec<SceneCostBreakdown>,
    /// Low/Medium/High/Premium budget category.
    pub total_budget_range: String,
    pub estimated_total_days: u32,
    pub major_cost_drivers: Vec<String>,
    pub cost_optimization_tips: Vec<String>,
}

// ─── Props ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenePropsBreakdown {
    pub scene_number: usize,
    pub props_needed: Vec<String>,
    pub costume_requirements: Vec<String>,
    pub set_decoration: Vec<String>,
    /// Simple/Moderate/Complex prop requirements.
    pub prop_complexity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropsBreakdown {
    pub scene_props: Vec<ScenePropsBreakdown>,
    pub master_props_list: Vec<String>,
    pub props_by_category: HashMap<String, Vec<String>>,
    pub costume_by_character: HashMap<String, Vec<String>>,
    /// Low/Medium/High props budget category.
    pub prop_budget_estimate: String,
}

// ─── Location ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneLocationBreakdown {
    pub scene_number: usize,
    pub location_name: String,
    /// INT/EXT and specific type.
    pub location_type: String,
    pub time_of_day: String,
    /// Simple/Moderate/Complex setup.
    pub setup_complexity: String,
    pub permit_needed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationBreakdown {
    pub scene_locations: Vec<SceneLocationBreakdown>,
    pub unique_locations: Vec<String>,
    pub locations_by_type: HashMap<String, Vec<String>>,
    /// Recommended shooting groups by location.
    pub location_shooting_groups: Vec<String>,
    pub permit_requirements: Vec<String>,
}

// ─── Character ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneCharacterBreakdown {
    pub scene_number: usize,
    pub characters_in_scene: Vec<String>,
    pub character_interactions: Vec<String>,
    /// Simple/Moderate/Complex dialogue requirements.
    pub dialogue_complexity: String,
    pub emotional_beats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterBreakdown {
    pub scene_characters: Vec<SceneCharacterBreakdown>,
    pub main_characters: Vec<String>,
    pub supporting_characters: Vec<String>,
    /// Number of scenes each character appears in.
    pub character_scene_count: HashMap<String, usize>,
    pub casting_requirements: Vec<String>,
}

// ─── Scene structure ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedSceneBreakdown {
    pub scene_number: usize,
    pub scene_purpose: String,
    /// Low/Medium/High dramatic importance.
    pub dramatic_weight: String,
    pub emotional_tone: String,
    /// Primarily action, dialogue, or balanced.
    pub action_vs_dialogue_ratio: String,
    /// Simple/Moderate/Complex to shoot.
    pub production_complexity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneBreakdown {
    pub detailed_scenes: Vec<DetailedSceneBreakdown>,
    pub three_act_structure: Vec<String>,
    pub pacing_analysis: String,
    pub key_dramatic_scenes: Vec<String>,
    pub action_heavy_scenes: Vec<String>,
    pub dialogue_heavy_scenes: Vec<String>,
}

// ─── Timeline ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneTimelineBreakdown {
    pub scene_number: usize,
    /// Estimated shooting time in hours.
    pub estimated_shoot_time: u32,
    /// Setup time required in hours.
    pub setup_time: u32,
    pub crew_requirements: Vec<String>,
    /// High/Medium/Low scheduling priority.
    pub scheduling_priority: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineBreakdown {
    pub scene_timelines: Vec<SceneTimelineBreakdown>,
    pub total_shooting_days: u32,
    pub shooting_schedule_by_location: Vec<String>,
    /// Which scenes each actor is needed for.
    pub cast_scheduling: HashMap<String, Vec<usize>>,
    pub pre_production_timeline: Vec<String>,
    pub post_production_timeline: Vec<String>,
}
