//! Timeline analysis: per-scene scheduling plus an overall production calendar.

use std::collections::HashMap;

use crate::agents::{call_structured, AgentOutcome, Generator};
use crate::models::{RawScriptData, SceneData, SceneTimelineBreakdown, TimelineBreakdown};

const SCENE_SYSTEM: &str = "\
Analyze scheduling requirements for this scene including shoot time, setup needs, and crew. \
Respond with a single JSON object and nothing else:
{\"scene_number\": 1, \"estimated_shoot_time\": 4, \"setup_time\": 2, \
\"crew_requirements\": [\"...\"], \"scheduling_priority\": \"High|Medium|Low\"}";

const OVERALL_SYSTEM: &str = "\
Create an overall production timeline with realistic shooting schedule, cast scheduling, and \
pre/post-production phases. Respond with a single JSON object and nothing else:
{\"scene_timelines\": [], \"total_shooting_days\": 10, \
\"shooting_schedule_by_location\": [\"...\"], \"cast_scheduling\": {\"NAME\": [1]}, \
\"pre_production_timeline\": [\"...\"], \"post_production_timeline\": [\"...\"]}";

/// Analyze the shooting timeline scene by scene, then overall.
pub async fn analyze(
    generator: &dyn Generator,
    raw: &RawScriptData,
) -> AgentOutcome<TimelineBreakdown> {
    let mut scene_timelines: Vec<SceneTimelineBreakdown> = Vec::with_capacity(raw.scenes.len());

    for scene in &raw.scenes {
        let prompt = format!(
            "Scene {}: {}\nLocation: {} ({})\nEstimated pages: {:.1}\nSpecial: {}",
            scene.scene_number,
            scene.scene_header,
            scene.location,
            scene.scene_type.as_str(),
            scene.estimated_pages,
            scene.special_requirements.join(", "),
        );

        match call_structured::<SceneTimelineBreakdown>(generator, SCENE_SYSTEM, &prompt).await {
            Ok(mut timeline) => {
                timeline.scene_number = scene.scene_number;
                scene_timelines.push(timeline);
            }
            Err(e) => {
                tracing::warn!(
                    "Timeline analysis failed for scene {}: {}",
                    scene.scene_number,
                    e
                );
                scene_timelines.push(fallback_scene_timeline(scene));
            }
        }
    }

    let cast_scheduling = schedule_cast(raw);

    let overall_prompt = format!(
        "Total scenes: {}\nLocations: {}\nShoot hours per scene: {:?}",
        raw.total_scene_count,
        raw.total_locations.join(", "),
        scene_timelines
            .iter()
            .map(|st| st.estimated_shoot_time)
            .collect::<Vec<_>>(),
    );

    match call_structured::<TimelineBreakdown>(generator, OVERALL_SYSTEM, &overall_prompt).await {
        Ok(mut breakdown) => {
            breakdown.scene_timelines = scene_timelines;
            // Always use the locally derived schedule, not the model's guess.
            breakdown.cast_scheduling = cast_scheduling;
            AgentOutcome::Success(breakdown)
        }
        Err(e) => AgentOutcome::Fallback {
            value: fallback_breakdown(scene_timelines, cast_scheduling, raw),
            reason: format!("Error in timeline analysis: {}", e),
        },
    }
}

fn schedule_cast(raw: &RawScriptData) -> HashMap<String, Vec<usize>> {
    let mut schedule: HashMap<String, Vec<usize>> = HashMap::new();
    for scene in &raw.scenes {
        for character in &scene.characters_present {
            schedule
                .entry(character.clone())
                .or_default()
                .push(scene.scene_number);
        }
    }
    schedule
}

fn fallback_scene_timeline(scene: &SceneData) -> SceneTimelineBreakdown {
    let has_special = !scene.special_requirements.is_empty();

    let mut shoot_time = ((scene.estimated_pages * 2.0) as u32).max(2);
    let mut setup_time = 2;
    if has_special {
        shoot_time *= 2;
        setup_time += 2;
    }

    SceneTimelineBreakdown {
        scene_number: scene.scene_number,
        estimated_shoot_time: shoot_time,
        setup_time,
        crew_requirements: vec![
            "Director".to_string(),
            "DP".to_string(),
            "Sound".to_string(),
            "Gaffer".to_string(),
        ],
        scheduling_priority: if has_special { "High" } else { "Medium" }.to_string(),
    }
}

fn fallback_breakdown(
    scene_timelines: Vec<SceneTimelineBreakdown>,
    cast_scheduling: HashMap<String, Vec<usize>>,
    raw: &RawScriptData,
) -> TimelineBreakdown {
    let total_hours: u32 = scene_timelines
        .iter()
        .map(|st| st.estimated_shoot_time + st.setup_time)
        .sum();

    let shooting_schedule_by_location = raw
        .total_locations
        .iter()
        .map(|loc| {
            let scenes: Vec<usize> = raw
                .scenes
                .iter()
                .filter(|s| &s.location == loc)
                .map(|s| s.scene_number)
                .collect();
            format!("{}: scenes {:?}", loc, scenes)
        })
        .collect();

    TimelineBreakdown {
        scene_timelines,
        total_shooting_days: (total_hours / 8).max(1),
        shooting_schedule_by_location,
        cast_scheduling,
        pre_production_timeline: vec![
            "Week 1-2: Casting and location scouting".to_string(),
            "Week 3: Crew hiring and equipment booking".to_string(),
            "Week 4: Rehearsals and final prep".to_string(),
        ],
        post_production_timeline: vec![
            "Week 1-3: Editing".to_string(),
            "Week 4: Sound design and color grading".to_string(),
            "Week 5: Final mix and delivery".to_string(),
        ],
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
    async fn test_special_requirements_double_shoot_time() {
        let text = "INT. LAB - DAY\nJOHN\nReady?\nEXT. STREET - NIGHT\nAn explosion rips through.\n";
        let scenes = script::split_scenes(text)
            .iter()
            .enumerate()
            .map(|(i, chunk)| script::parse_scene(chunk, i))
            .collect();
        let raw = script::aggregate(scenes, text);

        let outcome = analyze(&AlwaysFail, &raw).await;
        assert!(outcome.is_fallback());

        let breakdown = outcome.value();
        let plain = &breakdown.scene_timelines[0];
        let stunt = &breakdown.scene_timelines[1];
        assert_eq!(plain.scheduling_priority, "Medium");
        assert_eq!(stunt.scheduling_priority, "High");
        assert!(stunt.estimated_shoot_time >= plain.estimated_shoot_time * 2);
        assert_eq!(stunt.setup_time, 4);
        assert!(breakdown.total_shooting_days >= 1);
        assert_eq!(breakdown.cast_scheduling["JOHN"], vec![1]);
    }
}
