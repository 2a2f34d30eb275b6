//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and reuses
//! the slate-core domain logic through `AppState`.

pub mod analyze;
pub mod feedback;
pub mod server;
pub mod status;

use std::sync::Arc;

use slate_core::agents::{Generator, HttpGenerator};
use slate_core::state::{AppState, AppStateInner};

/// Initialize a shared `AppState` from the given SQLite database path,
/// with the generation backend configured through the environment.
pub fn init_state(db_path: &str) -> AppState {
    let db = slate_core::Database::open(db_path).unwrap_or_else(|e| {
        eprintln!("Failed to open database '{}': {}", db_path, e);
        std::process::exit(1);
    });

    let generator: Arc<dyn Generator> = Arc::new(HttpGenerator::from_env());
    Arc::new(AppStateInner::new(db, generator))
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}
