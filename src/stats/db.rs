//! SQLite-backed document store
//!
//! Manages the `~/.studyhub/progress.db` database with automatic schema
//! migration. Documents are JSON bodies keyed by `(collection, id)`; partial
//! updates and counters are applied with SQLite's JSON functions inside a
//! single statement so concurrent writers never lose an update.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};

use super::store::{DocumentStore, StoreError, StoreResult, string_members};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Document store on a local SQLite database
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open progress db: {}", path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::from_connection(conn)
    }

    /// In-memory database, mostly for tests
    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool
    async fn run<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(|e| e.into_inner());
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("store worker failed: {e}")))?
    }
}

fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    let version: i32 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
        .unwrap_or(0);

    if version < SCHEMA_VERSION {
        conn.execute("INSERT OR REPLACE INTO schema_version VALUES (?1)", [SCHEMA_VERSION])?;
    }
    Ok(())
}

/// JSON path for a top-level field
fn field_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', ""))
}

fn parse_body(collection: &str, id: &str, body: &str) -> StoreResult<Value> {
    serde_json::from_str(body).map_err(|e| StoreError::Corrupt {
        collection: collection.to_string(),
        id: id.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let (collection, id) = (collection.to_string(), id.to_string());
        self.run(move |conn| {
            let body: Option<String> = conn
                .query_row(
                    "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                    params![collection, id],
                    |r| r.get(0),
                )
                .optional()?;
            body.map(|b| parse_body(&collection, &id, &b)).transpose()
        })
        .await
    }

    async fn set(&self, collection: &str, id: &str, doc: Value) -> StoreResult<()> {
        let (collection, id) = (collection.to_string(), id.to_string());
        let body = serde_json::to_string(&doc)?;
        self.run(move |conn| {
            let now = Utc::now().timestamp_millis();
            conn.execute(
                r#"INSERT INTO documents (collection, id, body, created_at, updated_at)
                   VALUES (?1, ?2, json(?3), ?4, ?4)
                   ON CONFLICT(collection, id) DO UPDATE SET
                       body = excluded.body, updated_at = excluded.updated_at"#,
                params![collection, id, body, now],
            )?;
            Ok(())
        })
        .await
    }

    async fn create_if_absent(&self, collection: &str, id: &str, doc: Value) -> StoreResult<bool> {
        let (collection, id) = (collection.to_string(), id.to_string());
        let body = serde_json::to_string(&doc)?;
        self.run(move |conn| {
            let now = Utc::now().timestamp_millis();
            let inserted = conn.execute(
                r#"INSERT INTO documents (collection, id, body, created_at, updated_at)
                   VALUES (?1, ?2, json(?3), ?4, ?4)
                   ON CONFLICT(collection, id) DO NOTHING"#,
                params![collection, id, body, now],
            )?;
            Ok(inserted > 0)
        })
        .await
    }

    async fn merge(&self, collection: &str, id: &str, fields: Map<String, Value>) -> StoreResult<()> {
        let (collection, id) = (collection.to_string(), id.to_string());
        self.run(move |conn| {
            let tx = conn.unchecked_transaction()?;
            let body: Option<String> = tx
                .query_row(
                    "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                    params![collection, id],
                    |r| r.get(0),
                )
                .optional()?;
            let Some(body) = body else {
                return Err(StoreError::NotFound { collection, id });
            };

            let mut doc = parse_body(&collection, &id, &body)?;
            let Some(object) = doc.as_object_mut() else {
                return Err(StoreError::Corrupt {
                    collection,
                    id,
                    reason: "document is not an object".to_string(),
                });
            };
            object.extend(fields);

            tx.execute(
                "UPDATE documents SET body = ?3, updated_at = ?4 WHERE collection = ?1 AND id = ?2",
                params![collection, id, serde_json::to_string(&doc)?, Utc::now().timestamp_millis()],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: f64) -> StoreResult<f64> {
        let (collection, id) = (collection.to_string(), id.to_string());
        let path = field_path(field);
        // Integral deltas are bound as integers so integer fields stay integers
        let delta = if delta.fract() == 0.0 {
            rusqlite::types::Value::Integer(delta as i64)
        } else {
            rusqlite::types::Value::Real(delta)
        };
        self.run(move |conn| {
            let now = Utc::now().timestamp_millis();
            let value: f64 = conn.query_row(
                r#"INSERT INTO documents (collection, id, body, created_at, updated_at)
                   VALUES (?1, ?2, json_set('{}', ?3, ?4), ?5, ?5)
                   ON CONFLICT(collection, id) DO UPDATE SET
                       body = json_set(body, ?3, COALESCE(json_extract(body, ?3), 0) + ?4),
                       updated_at = ?5
                   RETURNING json_extract(body, ?3)"#,
                params![collection, id, path, delta, now],
                |r| r.get(0),
            )?;
            Ok(value)
        })
        .await
    }

    async fn add_to_set(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> StoreResult<Vec<String>> {
        let (collection, id) = (collection.to_string(), id.to_string());
        let (field, value) = (field.to_string(), value.to_string());
        self.run(move |conn| {
            let tx = conn.unchecked_transaction()?;
            let body: Option<String> = tx
                .query_row(
                    "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                    params![collection, id],
                    |r| r.get(0),
                )
                .optional()?;

            let mut doc = match body {
                Some(b) => parse_body(&collection, &id, &b)?,
                None => Value::Object(Map::new()),
            };
            let Some(object) = doc.as_object_mut() else {
                return Err(StoreError::Corrupt {
                    collection,
                    id,
                    reason: "document is not an object".to_string(),
                });
            };

            let mut members = string_members(object.get(&field));
            if !members.contains(&value) {
                members.push(value);
                object.insert(field, Value::from(members.clone()));

                let now = Utc::now().timestamp_millis();
                tx.execute(
                    r#"INSERT INTO documents (collection, id, body, created_at, updated_at)
                       VALUES (?1, ?2, ?3, ?4, ?4)
                       ON CONFLICT(collection, id) DO UPDATE SET
                           body = excluded.body, updated_at = excluded.updated_at"#,
                    params![collection, id, serde_json::to_string(&doc)?, now],
                )?;
            }
            tx.commit()?;
            Ok(members)
        })
        .await
    }
}

/// SQL schema for the progress database
const SCHEMA_SQL: &str = r#"
-- One JSON document per (collection, id)
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (collection, id)
);
CREATE INDEX IF NOT EXISTS idx_documents_updated ON documents(updated_at);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::store::{USER_SOCIAL, USER_STATS};
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_and_roundtrip() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("progress.db")).unwrap();

        assert!(store.get(USER_STATS, "u1").await.unwrap().is_none());
        store
            .set(USER_STATS, "u1", json!({"xp": 50, "level": 1}))
            .await
            .unwrap();
        let doc = store.get(USER_STATS, "u1").await.unwrap().unwrap();
        assert_eq!(doc["xp"], 50);
    }

    #[tokio::test]
    async fn test_increment_is_integral_for_integer_deltas() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set(USER_STATS, "u1", json!({"xp": 50})).await.unwrap();

        assert_eq!(store.increment(USER_STATS, "u1", "xp", 25.0).await.unwrap(), 75.0);
        assert_eq!(store.increment(USER_STATS, "u1", "xp", 25.0).await.unwrap(), 100.0);

        let doc = store.get(USER_STATS, "u1").await.unwrap().unwrap();
        assert_eq!(doc["xp"], json!(100));
        assert!(doc["xp"].is_u64());
    }

    #[tokio::test]
    async fn test_increment_creates_missing_document_and_field() {
        let store = SqliteStore::open_in_memory().unwrap();
        let hours = store
            .increment(USER_STATS, "fresh", "studyHours", 0.25)
            .await
            .unwrap();
        assert!((hours - 0.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_merge_overwrites_fields_and_keeps_the_rest() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .set(USER_STATS, "u1", json!({"xp": 500, "streak": 2}))
            .await
            .unwrap();

        let mut fields = Map::new();
        fields.insert("streak".to_string(), json!(3));
        store.merge(USER_STATS, "u1", fields).await.unwrap();

        let doc = store.get(USER_STATS, "u1").await.unwrap().unwrap();
        assert_eq!(doc, json!({"xp": 500, "streak": 3}));

        let err = store.merge(USER_STATS, "ghost", Map::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_add_to_set() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.add_to_set(USER_SOCIAL, "u1", "roomsJoined", "a").await.unwrap();
        let members = store.add_to_set(USER_SOCIAL, "u1", "roomsJoined", "a").await.unwrap();
        assert_eq!(members, vec!["a".to_string()]);
        let members = store.add_to_set(USER_SOCIAL, "u1", "roomsJoined", "b").await.unwrap();
        assert_eq!(members.len(), 2);
    }

    #[tokio::test]
    async fn test_create_if_absent() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.create_if_absent(USER_STATS, "u1", json!({"xp": 50})).await.unwrap());
        assert!(!store.create_if_absent(USER_STATS, "u1", json!({"xp": 0})).await.unwrap());
        let doc = store.get(USER_STATS, "u1").await.unwrap().unwrap();
        assert_eq!(doc["xp"], 50);
    }
}
