use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Interior vs exterior scene setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SceneKind {
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "EXT")]
    Ext,
}

impl SceneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Ext => "EXT",
        }
    }

    pub fn from_str(s: &str) -> Self {
        if s.trim().to_ascii_uppercase().starts_with("EXT") {
            Self::Ext
        } else {
            Self::Int
        }
    }
}

/// One scene of the script, in order of appearance.
///
/// Scene order is fixed at extraction time and never re-sorted afterwards;
/// `scene_number` is 1-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneData {
    pub scene_number: usize,
    /// Complete scene heading line, e.g. `INT. KITCHEN - NIGHT`.
    pub scene_header: String,
    pub location: String,
    /// DAY/NIGHT/DAWN/DUSK as written in the heading.
    pub time_of_day: String,
    pub scene_type: SceneKind,
    pub characters_present: Vec<String>,
    /// Sample dialogue lines (capped, truncated).
    pub dialogue_lines: Vec<String>,
    /// Sample action/description lines (capped, truncated).
    pub action_lines: Vec<String>,
    /// Rough page count derived from word count.
    pub estimated_pages: f64,
    pub props_mentioned: Vec<String>,
    /// Effects, stunts, or other technical requirements spotted in the text.
    pub special_requirements: Vec<String>,
}

/// Aggregate extraction result for a whole script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawScriptData {
    pub scenes: Vec<SceneData>,
    pub total_characters: Vec<String>,
    pub total_locations: Vec<String>,
    /// Locations grouped under "INT" / "EXT" keys.
    pub locations_by_type: HashMap<String, Vec<String>>,
    pub language_detected: String,
    pub estimated_total_pages: f64,
    pub total_scene_count: usize,
}
