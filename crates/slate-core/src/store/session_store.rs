use chrono::Utc;
use rusqlite::OptionalExtension;

use crate::db::Database;
use crate::error::ServerError;
use crate::workflow::state::ScriptState;

/// Append-only checkpoint store. Each workflow node boundary writes one
/// snapshot; the highest sequence number per thread is the resume point.
pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn append(
        &self,
        thread_id: &str,
        node: &str,
        state: &ScriptState,
    ) -> Result<(), ServerError> {
        let tid = thread_id.to_string();
        let node = node.to_string();
        let snapshot = serde_json::to_string(state)
            .map_err(|e| ServerError::Internal(format!("state serialization failed: {e}")))?;
        self.db
            .with_conn_async(move |conn| {
                conn.execute(
                    "INSERT INTO checkpoints (thread_id, seq, node, state, created_at)
                     VALUES (?1,
                             COALESCE((SELECT MAX(seq) FROM checkpoints WHERE thread_id = ?1), 0) + 1,
                             ?2, ?3, ?4)",
                    rusqlite::params![tid, node, snapshot, Utc::now().timestamp_millis()],
                )?;
                Ok(())
            })
            .await
    }

    /// The most recent snapshot for a thread, if the thread exists.
    pub async fn latest(&self, thread_id: &str) -> Result<Option<ScriptState>, ServerError> {
        let tid = thread_id.to_string();
        let snapshot: Option<String> = self
            .db
            .with_conn_async(move |conn| {
                conn.query_row(
                    "SELECT state FROM checkpoints
                     WHERE thread_id = ?1 ORDER BY seq DESC LIMIT 1",
                    rusqlite::params![tid],
                    |row| row.get(0),
                )
                .optional()
            })
            .await?;

        match snapshot {
            Some(json) => {
                let state = serde_json::from_str(&json).map_err(|e| {
                    ServerError::Internal(format!("stored state is not valid JSON: {e}"))
                })?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    /// Node names checkpointed for a thread, in write order.
    pub async fn node_history(&self, thread_id: &str) -> Result<Vec<String>, ServerError> {
        let tid = thread_id.to_string();
        self.db
            .with_conn_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT node FROM checkpoints WHERE thread_id = ?1 ORDER BY seq ASC",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![tid], |row| row.get(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SessionStore {
        SessionStore::new(Database::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_latest_returns_newest_snapshot() {
        let store = store().await;

        let mut state = ScriptState::new("INT. A - DAY".to_string());
        store.append("t1", "info_gathering", &state).await.unwrap();

        state.extraction_complete = true;
        store.append("t1", "human_review", &state).await.unwrap();

        let loaded = store.latest("t1").await.unwrap().unwrap();
        assert!(loaded.extraction_complete);
        assert_eq!(loaded.script_content, "INT. A - DAY");

        let history = store.node_history("t1").await.unwrap();
        assert_eq!(history, vec!["info_gathering", "human_review"]);
    }

    #[tokio::test]
    async fn test_unknown_thread_is_none() {
        let store = store().await;
        assert!(store.latest("missing").await.unwrap().is_none());
        assert!(store.node_history("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_threads_are_isolated() {
        let store = store().await;
        let a = ScriptState::new("a".to_string());
        let b = ScriptState::new("b".to_string());
        store.append("t1", "info_gathering", &a).await.unwrap();
        store.append("t2", "info_gathering", &b).await.unwrap();

        assert_eq!(store.latest("t1").await.unwrap().unwrap().script_content, "a");
        assert_eq!(store.latest("t2").await.unwrap().unwrap().script_content, "b");
    }
}
