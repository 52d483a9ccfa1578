//! Document store port
//!
//! The stats store is a document database addressed by collection name and
//! user id. [`SqliteStore`](super::SqliteStore) is the on-disk implementation;
//! [`MemoryStore`] keeps everything in process and can be switched offline to
//! exercise the fallback path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Collection holding one `UserStats` document per user
pub const USER_STATS: &str = "userStats";
/// Collection holding the distinct AI features each user has tried
pub const USER_AI_FEATURES: &str = "userAIFeatures";
/// Collection holding the distinct study rooms each user has joined
pub const USER_SOCIAL: &str = "userSocial";

/// Errors raised by a document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt document {collection}/{id}: {reason}")]
    Corrupt {
        collection: String,
        id: String,
        reason: String,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read/write access to a document database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Create or replace a document
    async fn set(&self, collection: &str, id: &str, doc: Value) -> StoreResult<()>;

    /// Create a document unless one already exists; returns whether it was
    /// created.
    async fn create_if_absent(&self, collection: &str, id: &str, doc: Value) -> StoreResult<bool>;

    /// Overwrite the given top-level fields of an existing document
    async fn merge(&self, collection: &str, id: &str, fields: Map<String, Value>) -> StoreResult<()>;

    /// Atomically add `delta` to a numeric field and return the new value.
    ///
    /// Missing documents and fields start from zero.
    async fn increment(&self, collection: &str, id: &str, field: &str, delta: f64) -> StoreResult<f64>;

    /// Atomically add `value` to an array field treated as a set and return
    /// the resulting members.
    ///
    /// Missing documents and fields start empty.
    async fn add_to_set(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> StoreResult<Vec<String>>;
}

/// Numeric JSON value for `n`, kept integral when `n` has no fraction so
/// integer fields stay integers after an increment.
pub(crate) fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

pub(crate) fn string_members(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// In-process document store
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<(String, String), Value>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Raw document access that ignores the offline switch
    pub fn peek(&self, collection: &str, id: &str) -> Option<Value> {
        self.docs()
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }

    fn docs(&self) -> MutexGuard<'_, HashMap<(String, String), Value>> {
        self.docs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.is_offline() {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

fn object_mut<'a>(doc: &'a mut Value, collection: &str, id: &str) -> StoreResult<&'a mut Map<String, Value>> {
    doc.as_object_mut().ok_or_else(|| StoreError::Corrupt {
        collection: collection.to_string(),
        id: id.to_string(),
        reason: "document is not an object".to_string(),
    })
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        self.check_online()?;
        Ok(self.peek(collection, id))
    }

    async fn set(&self, collection: &str, id: &str, doc: Value) -> StoreResult<()> {
        self.check_online()?;
        self.docs()
            .insert((collection.to_string(), id.to_string()), doc);
        Ok(())
    }

    async fn create_if_absent(&self, collection: &str, id: &str, doc: Value) -> StoreResult<bool> {
        self.check_online()?;
        let mut docs = self.docs();
        let key = (collection.to_string(), id.to_string());
        if docs.contains_key(&key) {
            return Ok(false);
        }
        docs.insert(key, doc);
        Ok(true)
    }

    async fn merge(&self, collection: &str, id: &str, fields: Map<String, Value>) -> StoreResult<()> {
        self.check_online()?;
        let mut docs = self.docs();
        let doc = docs
            .get_mut(&(collection.to_string(), id.to_string()))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        object_mut(doc, collection, id)?.extend(fields);
        Ok(())
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: f64) -> StoreResult<f64> {
        self.check_online()?;
        let mut docs = self.docs();
        let doc = docs
            .entry((collection.to_string(), id.to_string()))
            .or_insert_with(|| Value::Object(Map::new()));
        let object = object_mut(doc, collection, id)?;
        let current = object.get(field).and_then(Value::as_f64).unwrap_or(0.0);
        let next = current + delta;
        object.insert(field.to_string(), number_value(next));
        Ok(next)
    }

    async fn add_to_set(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> StoreResult<Vec<String>> {
        self.check_online()?;
        let mut docs = self.docs();
        let doc = docs
            .entry((collection.to_string(), id.to_string()))
            .or_insert_with(|| Value::Object(Map::new()));
        let object = object_mut(doc, collection, id)?;
        let mut members = string_members(object.get(field));
        if !members.iter().any(|m| m == value) {
            members.push(value.to_string());
            object.insert(field.to_string(), Value::from(members.clone()));
        }
        Ok(members)
    }
}
