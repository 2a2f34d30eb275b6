//! `slate analyze` — Run the full breakdown workflow on a script.

use console::style;

use slate_core::extract;
use slate_core::state::AppState;
use slate_core::workflow::graph::new_thread_id;
use slate_core::workflow::ScriptState;

pub async fn run(
    state: &AppState,
    file: Option<&str>,
    text: Option<&str>,
    thread_id: Option<&str>,
) -> Result<(), String> {
    let script_content = match (file, text) {
        (Some(path), _) => {
            let bytes = std::fs::read(path).map_err(|e| format!("Failed to read {path}: {e}"))?;
            let kind = extract::source_kind(path).map_err(|e| e.to_string())?;
            extract::extract_script_text(&bytes, kind).map_err(|e| e.to_string())?
        }
        (None, Some(text)) => text.to_string(),
        (None, None) => return Err("Provide either --file or --text".to_string()),
    };

    let thread_id = thread_id.map(String::from).unwrap_or_else(new_thread_id);
    println!("{} {}", style("Thread:").bold(), thread_id);

    let result = state
        .workflow
        .run(&script_content, None, &thread_id)
        .await
        .map_err(|e| e.to_string())?;

    print_summary(&result);

    if !result.task_complete {
        println!(
            "\n{}",
            style("Review pending — submit feedback with `slate feedback`.").yellow()
        );
    }
    Ok(())
}

fn print_summary(state: &ScriptState) {
    if let Some(raw) = &state.raw_data {
        println!("\n{}", style("Script data").bold().underlined());
        println!("  Scenes:      {}", raw.total_scene_count);
        println!("  Characters:  {}", raw.total_characters.len());
        println!("  Locations:   {}", raw.total_locations.len());
        println!("  Language:    {}", raw.language_detected);
        println!("  Est. pages:  {:.1}", raw.estimated_total_pages);
    }

    if let Some(cost) = &state.cost_analysis {
        println!("\n{}", style("Cost").bold().underlined());
        println!("  Budget range:  {}", cost.total_budget_range);
        println!("  Shooting days: {}", cost.estimated_total_days);
    }

    if let Some(characters) = &state.character_analysis {
        println!("\n{}", style("Characters").bold().underlined());
        println!("  Main:       {}", characters.main_characters.len());
        println!("  Supporting: {}", characters.supporting_characters.len());
    }

    if let Some(locations) = &state.location_analysis {
        println!("\n{}", style("Locations").bold().underlined());
        println!("  Unique: {}", locations.unique_locations.len());
        println!("  Groups: {}", locations.location_shooting_groups.len());
    }

    if let Some(props) = &state.props_analysis {
        println!("\n{}", style("Props").bold().underlined());
        println!("  Master list: {}", props.master_props_list.len());
        println!("  Budget:      {}", props.prop_budget_estimate);
    }

    if let Some(scenes) = &state.scene_analysis {
        println!("\n{}", style("Structure").bold().underlined());
        println!("  Detailed scenes: {}", scenes.detailed_scenes.len());
        println!("  Pacing: {}", scenes.pacing_analysis);
    }

    if let Some(timeline) = &state.timeline_analysis {
        println!("\n{}", style("Timeline").bold().underlined());
        println!("  Shooting days: {}", timeline.total_shooting_days);
        println!("  Cast tracked:  {}", timeline.cast_scheduling.len());
    }

    if !state.errors.is_empty() {
        println!("\n{}", style("Warnings").yellow().bold());
        for error in &state.errors {
            println!("  - {}", error);
        }
    }
}
