//! Cost analysis: per-scene shooting cost factors plus an overall budget view.

use crate::agents::{call_structured, AgentOutcome, Generator};
use crate::models::{CostBreakdown, RawScriptData, SceneCostBreakdown, SceneData, SceneKind};

const SCENE_SYSTEM: &str = "\
Analyze production costs for this scene considering location, equipment, crew, and special \
requirements. Provide realistic cost assessments. \
Respond with a single JSON object and nothing else:
{\"scene_number\": 1, \"location_cost_category\": \"Low|Medium|High\", \
\"equipment_needs\": [\"...\"], \"crew_size_needed\": \"Minimal|Standard|Large\", \
\"estimated_shoot_hours\": 4, \"complexity_factors\": [\"...\"]}";

const OVERALL_SYSTEM: &str = "\
Analyze overall production costs and provide actionable cost optimization strategies. \
Respond with a single JSON object and nothing else:
{\"scene_costs\": [], \"total_budget_range\": \"Low|Medium|High|Premium\", \
\"estimated_total_days\": 10, \"major_cost_drivers\": [\"...\"], \
\"cost_optimization_tips\": [\"...\"]}";

/// Analyze costs scene by scene, then overall.
pub async fn analyze(generator: &dyn Generator, raw: &RawScriptData) -> AgentOutcome<CostBreakdown> {
    let mut scene_costs: Vec<SceneCostBreakdown> = Vec::with_capacity(raw.scenes.len());

    for scene in &raw.scenes {
        let prompt = format!(
            "Scene {}: {}\nLocation: {} ({})\nCharacters: {}\nSpecial: {}",
            scene.scene_number,
            scene.scene_header,
            scene.location,
            scene.scene_type.as_str(),
            scene.characters_present.join(", "),
            scene.special_requirements.join(", "),
        );

        match call_structured::<SceneCostBreakdown>(generator, SCENE_SYSTEM, &prompt).await {
            Ok(mut cost) => {
                cost.scene_number = scene.scene_number;
                scene_costs.push(cost);
            }
            Err(e) => {
                tracing::warn!("Cost analysis failed for scene {}: {}", scene.scene_number, e);
                scene_costs.push(fallback_scene_cost(scene));
            }
        }
    }

    let overall_prompt = format!(
        "Total scenes: {}\nLocations: {}\nScene costs: {:?}",
        raw.total_scene_count,
        raw.total_locations.join(", "),
        scene_costs
            .iter()
            .map(|sc| sc.location_cost_category.as_str())
            .collect::<Vec<_>>(),
    );

    match call_structured::<CostBreakdown>(generator, OVERALL_SYSTEM, &overall_prompt).await {
        Ok(mut breakdown) => {
            breakdown.scene_costs = scene_costs;
            AgentOutcome::Success(breakdown)
        }
        Err(e) => AgentOutcome::Fallback {
            value: fallback_breakdown(scene_costs),
            reason: format!("Error in cost analysis: {}", e),
        },
    }
}

fn fallback_scene_cost(scene: &SceneData) -> SceneCostBreakdown {
    let exterior = scene.scene_type == SceneKind::Ext;
    let has_special = !scene.special_requirements.is_empty();

    let mut equipment_needs = vec![
        "Camera".to_string(),
        "Lighting".to_string(),
        "Sound".to_string(),
    ];
    if exterior {
        equipment_needs.push("Generator".to_string());
        equipment_needs.push("Weather protection".to_string());
    }

    let complexity_factors = if has_special {
        scene.special_requirements.clone()
    } else {
        vec!["Standard dialogue scene".to_string()]
    };

    SceneCostBreakdown {
        scene_number: scene.scene_number,
        location_cost_category: if exterior || has_special { "High" } else { "Medium" }.to_string(),
        equipment_needs,
        crew_size_needed: if has_special { "Large" } else { "Standard" }.to_string(),
        estimated_shoot_hours: ((scene.estimated_pages * 2.0) as u32).max(2),
        complexity_factors,
    }
}

fn fallback_breakdown(scene_costs: Vec<SceneCostBreakdown>) -> CostBreakdown {
    let total_hours: u32 = scene_costs.iter().map(|sc| sc.estimated_shoot_hours).sum();
    let high_cost = scene_costs
        .iter()
        .filter(|sc| sc.location_cost_category == "High")
        .count();

    let budget_range = if high_cost > scene_costs.len() / 2 {
        "High"
    } else {
        "Medium"
    };

    CostBreakdown {
        total_budget_range: budget_range.to_string(),
        estimated_total_days: (total_hours / 8).max(1),
        major_cost_drivers: vec![
            "Location rentals".to_string(),
            "Equipment".to_string(),
            "Crew".to_string(),
            "Talent".to_string(),
            "Post-production".to_string(),
        ],
        cost_optimization_tips: vec![
            "Group scenes by location".to_string(),
            "Use natural lighting when possible".to_string(),
        ],
        scene_costs,
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

    fn three_scene_raw() -> RawScriptData {
        let text = "INT. KITCHEN - DAY\nJOHN\nHi.\nEXT. STREET - NIGHT\nAn explosion.\nINT. OFFICE - DAY\nMARY\nBye.\n";
        let scenes = script::split_scenes(text)
            .iter()
            .enumerate()
            .map(|(i, chunk)| script::parse_scene(chunk, i))
            .collect();
        script::aggregate(scenes, text)
    }

    #[tokio::test]
    async fn test_total_failure_yields_fallback_with_all_scenes() {
        let raw = three_scene_raw();
        let outcome = analyze(&AlwaysFail, &raw).await;

        assert!(outcome.is_fallback());
        let (breakdown, reason) = outcome.into_parts();
        assert_eq!(breakdown.scene_costs.len(), 3);
        assert!(breakdown.estimated_total_days >= 1);
        assert!(reason.unwrap().starts_with("Error in cost analysis"));
    }

    #[tokio::test]
    async fn test_exterior_scene_is_high_cost() {
        let raw = three_scene_raw();
        let outcome = analyze(&AlwaysFail, &raw).await;
        let ext_cost = &outcome.value().scene_costs[1];
        assert_eq!(ext_cost.location_cost_category, "High");
        assert!(ext_cost.equipment_needs.contains(&"Generator".to_string()));
    }
}
