//! Slate Core — Transport-agnostic script breakdown logic.
//!
//! This crate contains the extraction pipeline, the analysis agents, the
//! workflow graph, and the checkpoint store. It has **no HTTP framework
//! dependency** by default, making it suitable for use in:
//!
//! - HTTP servers (via `slate-server`)
//! - CLI tools
//!
//! # Feature Flags
//!
//! - `axum` — Enables `IntoResponse` impl on `ServerError` for use in axum handlers.

pub mod agents;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod script;
pub mod state;
pub mod store;
pub mod workflow;

// Convenience re-exports
pub use db::Database;
pub use error::ServerError;
pub use state::{AppState, AppStateInner};
