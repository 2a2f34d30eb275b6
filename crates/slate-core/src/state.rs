//! Shared application state for the axum server.

use std::sync::Arc;

use crate::agents::Generator;
use crate::db::Database;
use crate::store::SessionStore;
use crate::workflow::ScriptWorkflow;

/// Shared state accessible by all API handlers.
pub struct AppStateInner {
    pub db: Database,
    pub workflow: ScriptWorkflow,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn new(db: Database, generator: Arc<dyn Generator>) -> Self {
        let workflow = ScriptWorkflow::new(generator, SessionStore::new(db.clone()));
        Self { db, workflow }
    }
}
