//! Character analysis: per-scene dynamics plus casting guidance.

use std::collections::HashMap;

use crate::agents::{call_structured, AgentOutcome, Generator};
use crate::models::{CharacterBreakdown, RawScriptData, SceneCharacterBreakdown, SceneData};

/// A character appearing in more than this share of scenes counts as main cast.
const MAIN_CAST_SCENE_SHARE: f64 = 0.3;

const SCENE_SYSTEM: &str = "\
Analyze character dynamics in this scene focusing on interactions, dialogue complexity, and \
emotional content for casting and directing needs. \
Respond with a single JSON object and nothing else:
{\"scene_number\": 1, \"characters_in_scene\": [\"NAME\"], \
\"character_interactions\": [\"...\"], \"dialogue_complexity\": \"Simple|Moderate|Complex\", \
\"emotional_beats\": [\"...\"]}";

const OVERALL_SYSTEM: &str = "\
Analyze overall character requirements across the script for comprehensive casting and \
character direction guidance. Respond with a single JSON object and nothing else:
{\"scene_characters\": [], \"main_characters\": [\"...\"], \"supporting_characters\": [\"...\"], \
\"character_scene_count\": {\"NAME\": 1}, \"casting_requirements\": [\"...\"]}";

/// Analyze characters scene by scene, then overall.
pub async fn analyze(
    generator: &dyn Generator,
    raw: &RawScriptData,
) -> AgentOutcome<CharacterBreakdown> {
    let mut scene_characters: Vec<SceneCharacterBreakdown> = Vec::with_capacity(raw.scenes.len());

    for scene in &raw.scenes {
        let prompt = format!(
            "Scene {}: {}\nCharacters: {}\nDialogue: {}",
            scene.scene_number,
            scene.scene_header,
            scene.characters_present.join(", "),
            scene
                .dialogue_lines
                .iter()
                .take(3)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" | "),
        );

        match call_structured::<SceneCharacterBreakdown>(generator, SCENE_SYSTEM, &prompt).await {
            Ok(mut chars) => {
                chars.scene_number = scene.scene_number;
                scene_characters.push(chars);
            }
            Err(e) => {
                tracing::warn!(
                    "Character analysis failed for scene {}: {}",
                    scene.scene_number,
                    e
                );
                scene_characters.push(fallback_scene_character(scene));
            }
        }
    }

    let char_counts = count_appearances(raw);

    let overall_prompt = format!(
        "Characters and scene counts: {:?}\nTotal scenes: {}",
        char_counts, raw.total_scene_count,
    );

    match call_structured::<CharacterBreakdown>(generator, OVERALL_SYSTEM, &overall_prompt).await {
        Ok(mut breakdown) => {
            breakdown.scene_characters = scene_characters;
            // Always use the locally counted appearances, not the model's guess.
            breakdown.character_scene_count = char_counts;
            AgentOutcome::Success(breakdown)
        }
        Err(e) => AgentOutcome::Fallback {
            value: fallback_breakdown(scene_characters, char_counts, raw),
            reason: format!("Error in character analysis: {}", e),
        },
    }
}

fn count_appearances(raw: &RawScriptData) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for scene in &raw.scenes {
        for character in &scene.characters_present {
            *counts.entry(character.clone()).or_insert(0) += 1;
        }
    }
    counts
}

fn fallback_scene_character(scene: &SceneData) -> SceneCharacterBreakdown {
    let character_interactions = if scene.characters_present.len() > 1 {
        vec![format!(
            "Interaction between {}",
            scene.characters_present.join(", ")
        )]
    } else {
        Vec::new()
    };

    let emotional_beats = if scene.dialogue_lines.is_empty() {
        Vec::new()
    } else {
        vec!["Character development moment".to_string()]
    };

    SceneCharacterBreakdown {
        scene_number: scene.scene_number,
        characters_in_scene: scene.characters_present.clone(),
        character_interactions,
        dialogue_complexity: "Moderate".to_string(),
        emotional_beats,
    }
}

fn fallback_breakdown(
    scene_characters: Vec<SceneCharacterBreakdown>,
    char_counts: HashMap<String, usize>,
    raw: &RawScriptData,
) -> CharacterBreakdown {
    let threshold = raw.total_scene_count as f64 * MAIN_CAST_SCENE_SHARE;

    let mut main_characters = Vec::new();
    let mut supporting_characters = Vec::new();
    for character in &raw.total_characters {
        let count = char_counts.get(character).copied().unwrap_or(0);
        let entry = format!("{} - appears in {} scenes", character, count);
        if count as f64 > threshold {
            main_characters.push(entry);
        } else {
            supporting_characters.push(entry);
        }
    }

    let casting_requirements = raw
        .total_characters
        .iter()
        .map(|c| {
            format!(
                "Cast {} - {} scenes",
                c,
                char_counts.get(c).copied().unwrap_or(0)
            )
        })
        .collect();

    CharacterBreakdown {
        scene_characters,
        main_characters,
        supporting_characters,
        character_scene_count: char_counts,
        casting_requirements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentError;
    use crate::script;
    use async_trait::async_trait;

    struct AlwaysFail;

    #[async_trait]
    impl Generator for AlwaysFail {
        async fn generate(&self, _: &str, _: &str) -> Result<String, AgentError> {
            Err(AgentError::Http("timeout".to_string()))
        }
    }

    #[tokio::test]
    async fn test_main_vs_supporting_split() {
        let text = "\
INT. A - DAY\nJOHN\nOne.\nINT. B - DAY\nJOHN\nTwo.\nINT. C - DAY\nJOHN\nThree.\n\
INT. D - DAY\nJOHN\nFour.\nMARY\nHello.\n";
        let scenes = script::split_scenes(text)
            .iter()
            .enumerate()
            .map(|(i, chunk)| script::parse_scene(chunk, i))
            .collect();
        let raw = script::aggregate(scenes, text);

        let outcome = analyze(&AlwaysFail, &raw).await;
        let breakdown = outcome.value();

        assert_eq!(breakdown.character_scene_count["JOHN"], 4);
        assert!(breakdown.main_characters.iter().any(|m| m.contains("JOHN")));
        assert!(breakdown
            .supporting_characters
            .iter()
            .any(|s| s.contains("MARY")));
    }
}
