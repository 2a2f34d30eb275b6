//! Props and costume analysis.

use std::collections::{BTreeSet, HashMap};

use crate::agents::{call_structured, AgentOutcome, Generator};
use crate::models::{PropsBreakdown, RawScriptData, SceneData, ScenePropsBreakdown};

const SCENE_SYSTEM: &str = "\
Analyze props, costumes, and set decoration for this scene. Be thorough and practical for \
production planning. Respond with a single JSON object and nothing else:
{\"scene_number\": 1, \"props_needed\": [\"...\"], \"costume_requirements\": [\"...\"], \
\"set_decoration\": [\"...\"], \"prop_complexity\": \"Simple|Moderate|Complex\"}";

const OVERALL_SYSTEM: &str = "\
Analyze overall props requirements and provide actionable props department planning. \
Respond with a single JSON object and nothing else:
{\"scene_props\": [], \"master_props_list\": [\"...\"], \
\"props_by_category\": {\"Category\": [\"...\"]}, \
\"costume_by_character\": {\"NAME\": [\"...\"]}, \
\"prop_budget_estimate\": \"Low|Medium|High\"}";

/// Analyze props and costumes scene by scene, then overall.
pub async fn analyze(generator: &dyn Generator, raw: &RawScriptData) -> AgentOutcome<PropsBreakdown> {
    let mut scene_props: Vec<ScenePropsBreakdown> = Vec::with_capacity(raw.scenes.len());

    for scene in &raw.scenes {
        let prompt = format!(
            "Scene {}: {}\nLocation: {}\nCharacters: {}\nProps mentioned: {}",
            scene.scene_number,
            scene.scene_header,
            scene.location,
            scene.characters_present.join(", "),
            scene.props_mentioned.join(", "),
        );

        match call_structured::<ScenePropsBreakdown>(generator, SCENE_SYSTEM, &prompt).await {
            Ok(mut props) => {
                props.scene_number = scene.scene_number;
                scene_props.push(props);
            }
            Err(e) => {
                tracing::warn!("Props analysis failed for scene {}: {}", scene.scene_number, e);
                scene_props.push(fallback_scene_props(scene));
            }
        }
    }

    let all_props: BTreeSet<&str> = scene_props
        .iter()
        .flat_map(|sp| sp.props_needed.iter().map(String::as_str))
        .collect();

    let overall_prompt = format!(
        "All props from scenes: {}\nCharacters: {}\nLocations: {}",
        all_props.into_iter().collect::<Vec<_>>().join(", "),
        raw.total_characters.join(", "),
        raw.total_locations.join(", "),
    );

    match call_structured::<PropsBreakdown>(generator, OVERALL_SYSTEM, &overall_prompt).await {
        Ok(mut breakdown) => {
            breakdown.scene_props = scene_props;
            AgentOutcome::Success(breakdown)
        }
        Err(e) => AgentOutcome::Fallback {
            value: fallback_breakdown(scene_props, raw),
            reason: format!("Error in props analysis: {}", e),
        },
    }
}

fn fallback_scene_props(scene: &SceneData) -> ScenePropsBreakdown {
    let mut props: BTreeSet<String> = scene.props_mentioned.iter().cloned().collect();

    // Seed obvious set dressing from the location name.
    let location_lower = scene.location.to_lowercase();
    if location_lower.contains("office") {
        props.extend(["desk", "chair", "computer"].map(String::from));
    } else if location_lower.contains("kitchen") {
        props.extend(["table", "chairs", "dishes"].map(String::from));
    }

    ScenePropsBreakdown {
        scene_number: scene.scene_number,
        props_needed: props.into_iter().collect(),
        costume_requirements: scene
            .characters_present
            .iter()
            .map(|c| format!("Costume for {}", c))
            .collect(),
        set_decoration: vec![format!("Dress {}", scene.location)],
        prop_complexity: "Moderate".to_string(),
    }
}

fn fallback_breakdown(scene_props: Vec<ScenePropsBreakdown>, raw: &RawScriptData) -> PropsBreakdown {
    let master_props: Vec<String> = scene_props
        .iter()
        .flat_map(|sp| sp.props_needed.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let furniture_keywords = ["chair", "table", "desk"];
    let electronics_keywords = ["phone", "computer"];

    let furniture: Vec<String> = master_props
        .iter()
        .filter(|p| furniture_keywords.iter().any(|k| p.to_lowercase().contains(k)))
        .cloned()
        .collect();
    let electronics: Vec<String> = master_props
        .iter()
        .filter(|p| electronics_keywords.iter().any(|k| p.to_lowercase().contains(k)))
        .cloned()
        .collect();
    let other: Vec<String> = master_props
        .iter()
        .filter(|p| !furniture.contains(p) && !electronics.contains(p))
        .cloned()
        .collect();

    let props_by_category = HashMap::from([
        ("Furniture".to_string(), furniture),
        ("Electronics".to_string(), electronics),
        ("Other".to_string(), other),
    ]);

    let costume_by_character: HashMap<String, Vec<String>> = raw
        .total_characters
        .iter()
        .map(|c| (c.clone(), vec![format!("Costume for {}", c)]))
        .collect();

    PropsBreakdown {
        scene_props,
        master_props_list: master_props,
        props_by_category,
        costume_by_character,
        prop_budget_estimate: "Medium".to_string(),
    }
}
