//! Location analysis: per-scene setup needs plus an overall shooting strategy.

use std::collections::HashMap;

use crate::agents::{call_structured, AgentOutcome, Generator};
use crate::models::{LocationBreakdown, RawScriptData, SceneData, SceneKind, SceneLocationBreakdown};

const SCENE_SYSTEM: &str = "\
Analyze location requirements for this scene including setup needs, permits, and logistics. \
Provide practical location management guidance. \
Respond with a single JSON object and nothing else:
{\"scene_number\": 1, \"location_name\": \"...\", \"location_type\": \"INT - ...\", \
\"time_of_day\": \"DAY\", \"setup_complexity\": \"Simple|Moderate|Complex\", \
\"permit_needed\": false}";

const OVERALL_SYSTEM: &str = "\
Analyze overall location strategy for efficient shooting and comprehensive location department \
planning. Respond with a single JSON object and nothing else:
{\"scene_locations\": [], \"unique_locations\": [\"...\"], \
\"locations_by_type\": {\"INT\": [], \"EXT\": []}, \
\"location_shooting_groups\": [\"...\"], \"permit_requirements\": [\"...\"]}";

/// Analyze locations scene by scene, then overall.
pub async fn analyze(
    generator: &dyn Generator,
    raw: &RawScriptData,
) -> AgentOutcome<LocationBreakdown> {
    let mut scene_locations: Vec<SceneLocationBreakdown> = Vec::with_capacity(raw.scenes.len());

    for scene in &raw.scenes {
        let prompt = format!(
            "Scene {}: {}\nLocation: {} ({})\nTime: {}",
            scene.scene_number,
            scene.scene_header,
            scene.location,
            scene.scene_type.as_str(),
            scene.time_of_day,
        );

        match call_structured::<SceneLocationBreakdown>(generator, SCENE_SYSTEM, &prompt).await {
            Ok(mut loc) => {
                loc.scene_number = scene.scene_number;
                scene_locations.push(loc);
            }
            Err(e) => {
                tracing::warn!(
                    "Location analysis failed for scene {}: {}",
                    scene.scene_number,
                    e
                );
                scene_locations.push(fallback_scene_location(scene));
            }
        }
    }

    let empty = Vec::new();
    let overall_prompt = format!(
        "All locations: {}\nINT locations: {}\nEXT locations: {}",
        raw.total_locations.join(", "),
        raw.locations_by_type.get("INT").unwrap_or(&empty).join(", "),
        raw.locations_by_type.get("EXT").unwrap_or(&empty).join(", "),
    );

    match call_structured::<LocationBreakdown>(generator, OVERALL_SYSTEM, &overall_prompt).await {
        Ok(mut breakdown) => {
            breakdown.scene_locations = scene_locations;
            AgentOutcome::Success(breakdown)
        }
        Err(e) => AgentOutcome::Fallback {
            value: fallback_breakdown(scene_locations, raw),
            reason: format!("Error in location analysis: {}", e),
        },
    }
}

fn fallback_scene_location(scene: &SceneData) -> SceneLocationBreakdown {
    let permit_needed =
        scene.scene_type == SceneKind::Ext || scene.location.to_lowercase().contains("public");

    SceneLocationBreakdown {
        scene_number: scene.scene_number,
        location_name: scene.location.clone(),
        location_type: format!("{} - {}", scene.scene_type.as_str(), scene.location),
        time_of_day: scene.time_of_day.clone(),
        setup_complexity: "Moderate".to_string(),
        permit_needed,
    }
}

fn fallback_breakdown(
    scene_locations: Vec<SceneLocationBreakdown>,
    raw: &RawScriptData,
) -> LocationBreakdown {
    // Group scene numbers per location, preserving first-appearance order.
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for loc in &scene_locations {
        if !groups.contains_key(&loc.location_name) {
            order.push(loc.location_name.clone());
        }
        groups
            .entry(loc.location_name.clone())
            .or_default()
            .push(loc.scene_number);
    }

    let location_shooting_groups = order
        .iter()
        .map(|loc| format!("Shoot scenes {:?} at {}", groups[loc], loc))
        .collect();

    let empty = Vec::new();
    let permit_requirements = raw
        .locations_by_type
        .get("EXT")
        .unwrap_or(&empty)
        .iter()
        .map(|loc| format!("Permit for {}", loc))
        .collect();

    LocationBreakdown {
        scene_locations,
        unique_locations: raw.total_locations.clone(),
        locations_by_type: raw.locations_by_type.clone(),
        location_shooting_groups,
        permit_requirements,
    }
}
