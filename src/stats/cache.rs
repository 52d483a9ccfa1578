//! Local fallback cache
//!
//! A per-user key/value slot holding the last known good JSON snapshot of a
//! document. It is read only when the stats store is unreachable and
//! rewritten after every successful store read or write.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;
use thiserror::Error;

/// Errors raised by a local cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Cache key for a document, e.g. `userStats_alice`
pub fn cache_key(collection: &str, user_id: &str) -> String {
    format!("{collection}_{user_id}")
}

/// Best-effort key/value storage for JSON snapshots
pub trait LocalCache: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<Value>, CacheError>;

    fn write(&self, key: &str, value: &Value) -> Result<(), CacheError>;
}

/// Cache kept in process memory
#[derive(Debug, Default)]
pub struct MemoryCache {
    slots: Mutex<HashMap<String, Value>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn read(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &Value) -> Result<(), CacheError> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// Cache storing one `<key>.json` file per slot
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn open(dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

/// File-name-safe encoding of a cache key.
///
/// Lowercase ASCII letters, digits, `_` and `-` pass through; every other
/// byte becomes `%XX`. Distinct keys always map to distinct names, also on
/// case-insensitive file systems.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' => out.push(char::from(byte)),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

impl LocalCache for FileCache {
    fn read(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write(&self, key: &str, value: &Value) -> Result<(), CacheError> {
        let path = self.slot_path(key);
        // Write to a sibling file first so readers never see a torn snapshot
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}
