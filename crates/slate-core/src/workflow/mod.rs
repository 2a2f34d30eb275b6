//! Analysis workflow: shared state, merge rules, nodes, and the graph runner.

pub mod graph;
pub mod nodes;
pub mod state;

pub use graph::ScriptWorkflow;
pub use state::{ScriptState, StateUpdate};

/// The six analysis sections, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Cost,
    Props,
    Location,
    Character,
    Scene,
    Timeline,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Cost,
        Section::Props,
        Section::Location,
        Section::Character,
        Section::Scene,
        Section::Timeline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Cost => "cost",
            Section::Props => "props",
            Section::Location => "location",
            Section::Character => "character",
            Section::Scene => "scene",
            Section::Timeline => "timeline",
        }
    }

    pub fn from_str(s: &str) -> Option<Section> {
        match s {
            "cost" => Some(Section::Cost),
            "props" => Some(Section::Props),
            "location" => Some(Section::Location),
            "character" => Some(Section::Character),
            "scene" => Some(Section::Scene),
            "timeline" => Some(Section::Timeline),
            _ => None,
        }
    }
}
