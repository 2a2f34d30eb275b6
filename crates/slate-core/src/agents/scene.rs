//! Scene structure analysis: dramatic weight, pacing, and act structure.

use crate::agents::{call_structured, AgentOutcome, Generator};
use crate::models::{DetailedSceneBreakdown, RawScriptData, SceneBreakdown, SceneData};

const SCENE_SYSTEM: &str = "\
Analyze this scene's narrative and production elements focusing on story purpose, dramatic \
importance, and production complexity. Respond with a single JSON object and nothing else:
{\"scene_number\": 1, \"scene_purpose\": \"...\", \"dramatic_weight\": \"Low|Medium|High\", \
\"emotional_tone\": \"...\", \"action_vs_dialogue_ratio\": \"Action-heavy|Dialogue-heavy|Balanced\", \
\"production_complexity\": \"Simple|Moderate|Complex\"}";

const OVERALL_SYSTEM: &str = "\
Analyze overall script structure and provide comprehensive script analysis for directors and \
producers. Respond with a single JSON object and nothing else:
{\"detailed_scenes\": [], \"three_act_structure\": [\"...\"], \"pacing_analysis\": \"...\", \
\"key_dramatic_scenes\": [\"...\"], \"action_heavy_scenes\": [\"...\"], \
\"dialogue_heavy_scenes\": [\"...\"]}";

/// Analyze scene structure and dramatic elements.
pub async fn analyze(generator: &dyn Generator, raw: &RawScriptData) -> AgentOutcome<SceneBreakdown> {
    let mut detailed_scenes: Vec<DetailedSceneBreakdown> = Vec::with_capacity(raw.scenes.len());

    for scene in &raw.scenes {
        let prompt = format!(
            "Scene {}: {}\nCharacters: {}\nDialogue: {}\nSpecial requirements: {}",
            scene.scene_number,
            scene.scene_header,
            scene.characters_present.join(", "),
            scene
                .dialogue_lines
                .iter()
                .take(2)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" | "),
            scene.special_requirements.join(", "),
        );

        match call_structured::<DetailedSceneBreakdown>(generator, SCENE_SYSTEM, &prompt).await {
            Ok(mut detailed) => {
                detailed.scene_number = scene.scene_number;
                detailed_scenes.push(detailed);
            }
            Err(e) => {
                tracing::warn!(
                    "Scene breakdown failed for scene {}: {}",
                    scene.scene_number,
                    e
                );
                detailed_scenes.push(fallback_scene(scene));
            }
        }
    }

    let overall_prompt = format!(
        "Total scenes: {}\nScene complexities: {:?}\nDramatic weights: {:?}",
        raw.total_scene_count,
        detailed_scenes
            .iter()
            .map(|ds| ds.production_complexity.as_str())
            .collect::<Vec<_>>(),
        detailed_scenes
            .iter()
            .map(|ds| ds.dramatic_weight.as_str())
            .collect::<Vec<_>>(),
    );

    match call_structured::<SceneBreakdown>(generator, OVERALL_SYSTEM, &overall_prompt).await {
        Ok(mut breakdown) => {
            breakdown.detailed_scenes = detailed_scenes;
            AgentOutcome::Success(breakdown)
        }
        Err(e) => AgentOutcome::Fallback {
            value: fallback_breakdown(detailed_scenes),
            reason: format!("Error in scene analysis: {}", e),
        },
    }
}

fn fallback_scene(scene: &SceneData) -> DetailedSceneBreakdown {
    let production_complexity = if !scene.special_requirements.is_empty() {
        "Complex"
    } else if scene.characters_present.len() > 3 {
        "Moderate"
    } else {
        "Simple"
    };

    let action_vs_dialogue_ratio = if scene.dialogue_lines.len() > scene.action_lines.len() {
        "Dialogue-heavy"
    } else if !scene.special_requirements.is_empty() {
        "Action-heavy"
    } else {
        "Balanced"
    };

    DetailedSceneBreakdown {
        scene_number: scene.scene_number,
        scene_purpose: "Story progression".to_string(),
        dramatic_weight: "Medium".to_string(),
        emotional_tone: "Neutral".to_string(),
        action_vs_dialogue_ratio: action_vs_dialogue_ratio.to_string(),
        production_complexity: production_complexity.to_string(),
    }
}

fn fallback_breakdown(detailed_scenes: Vec<DetailedSceneBreakdown>) -> SceneBreakdown {
    let total = detailed_scenes.len();
    let act1_end = total / 4;
    let act2_end = total * 3 / 4;

    let three_act_structure = vec![
        format!("Act 1: Scenes 1-{}", act1_end),
        format!("Act 2: Scenes {}-{}", act1_end + 1, act2_end),
        format!("Act 3: Scenes {}-{}", act2_end + 1, total),
    ];

    let action_heavy_scenes: Vec<String> = detailed_scenes
        .iter()
        .filter(|ds| ds.action_vs_dialogue_ratio == "Action-heavy")
        .map(|ds| format!("Scene {}", ds.scene_number))
        .collect();
    let dialogue_heavy_scenes: Vec<String> = detailed_scenes
        .iter()
        .filter(|ds| ds.action_vs_dialogue_ratio == "Dialogue-heavy")
        .map(|ds| format!("Scene {}", ds.scene_number))
        .collect();
    let mut key_dramatic_scenes: Vec<String> = detailed_scenes
        .iter()
        .filter(|ds| ds.dramatic_weight == "High")
        .map(|ds| format!("Scene {}", ds.scene_number))
        .collect();

    if key_dramatic_scenes.is_empty() {
        key_dramatic_scenes = vec![format!("Scene {}", total / 2)];
    }

    SceneBreakdown {
        detailed_scenes,
        three_act_structure,
        pacing_analysis: "Balanced pacing with mix of action and dialogue".to_string(),
        key_dramatic_scenes,
        action_heavy_scenes,
        dialogue_heavy_scenes,
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
    async fn test_fallback_has_three_acts_and_all_scenes() {
        let text = "INT. A - DAY\nJOHN\nHi.\nEXT. B - NIGHT\nAn explosion rocks the street.\n";
        let scenes = script::split_scenes(text)
            .iter()
            .enumerate()
            .map(|(i, chunk)| script::parse_scene(chunk, i))
            .collect();
        let raw = script::aggregate(scenes, text);

        let outcome = analyze(&AlwaysFail, &raw).await;
        assert!(outcome.is_fallback());

        let breakdown = outcome.value();
        assert_eq!(breakdown.detailed_scenes.len(), 2);
        assert_eq!(breakdown.three_act_structure.len(), 3);
        assert_eq!(breakdown.detailed_scenes[1].production_complexity, "Complex");
        assert!(!breakdown.key_dramatic_scenes.is_empty());
    }
}
