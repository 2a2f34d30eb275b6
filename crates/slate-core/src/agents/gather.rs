//! Information gathering: turn raw script text into structured scene data.
//!
//! Each scene chunk is sent to the generation backend for structured
//! extraction; when the call fails the scene is parsed manually instead, so
//! gathering always produces a usable `RawScriptData`. This is a computed
//! fallback, unlike the canned placeholders used by the analysis sections.

use crate::agents::{call_structured, Generator};
use crate::models::{RawScriptData, SceneData};
use crate::script;

const SCENE_CHAR_LIMIT: usize = 2000;

const SCENE_SYSTEM: &str = "\
Extract scene data from the screenplay excerpt: header details, characters, dialogue samples, \
action lines, props mentioned, and special requirements. Be precise and thorough. \
Respond with a single JSON object and nothing else:
{\"scene_number\": 1, \"scene_header\": \"INT. KITCHEN - DAY\", \"location\": \"KITCHEN\", \
\"time_of_day\": \"DAY\", \"scene_type\": \"INT\", \"characters_present\": [\"NAME\"], \
\"dialogue_lines\": [\"...\"], \"action_lines\": [\"...\"], \"estimated_pages\": 1.0, \
\"props_mentioned\": [\"...\"], \"special_requirements\": [\"...\"]}";

/// Extract raw data from script content, organised by scene.
pub async fn extract_script_data(generator: &dyn Generator, script_content: &str) -> RawScriptData {
    let chunks = script::split_scenes(script_content);
    if chunks.is_empty() {
        tracing::warn!("No scene headings found, using whole-script fallback extraction");
        return script::fallback_extraction(script_content);
    }

    tracing::info!("Found {} scenes to process", chunks.len());

    let mut scenes: Vec<SceneData> = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let limited: String = chunk.chars().take(SCENE_CHAR_LIMIT).collect();
        let prompt = format!("Scene {}:\n{}", i + 1, limited);

        let scene = match call_structured::<SceneData>(generator, SCENE_SYSTEM, &prompt).await {
            Ok(mut scene) => {
                scene.scene_number = i + 1;
                scene
            }
            Err(e) => {
                tracing::warn!("Structured extraction failed for scene {}: {}", i + 1, e);
                script::parse_scene(chunk, i)
            }
        };
        scenes.push(scene);
    }

    script::aggregate(scenes, script_content)
}
