//! Two-tier stats repository
//!
//! Wraps the primary [`DocumentStore`] and the [`LocalCache`] behind one port.
//! Every mutation is attempted against the store first; if the store fails
//! the same mutation is applied to the cached snapshot instead, so callers
//! never see storage errors. Successful store operations refresh the cache.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::cache::{LocalCache, cache_key};
use super::models::{Counter, StatsPatch, UserStats};
use super::store::{DocumentStore, USER_STATS, number_value, string_members};

/// Which tier answered a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// The stats store
    Primary,
    /// The local cache, because the store was unreachable
    Fallback,
}

/// Result of loading a stats record
#[derive(Debug, Clone)]
pub struct Loaded {
    pub stats: Option<UserStats>,
    pub tier: Tier,
}

/// Store + cache access for progression records
#[derive(Clone)]
pub struct StatsRepository {
    store: Arc<dyn DocumentStore>,
    cache: Arc<dyn LocalCache>,
    /// Users handed a seed record while the store was unreachable
    unsaved: Arc<Mutex<HashSet<String>>>,
}

impl StatsRepository {
    pub fn new(store: Arc<dyn DocumentStore>, cache: Arc<dyn LocalCache>) -> Self {
        Self {
            store,
            cache,
            unsaved: Arc::default(),
        }
    }

    /// Remember that `user_id` works from a record the store has never seen.
    ///
    /// The next mutation that reaches the store writes the whole record
    /// first, so counters never land on a bare document.
    pub(crate) fn mark_unsaved(&self, user_id: &str) {
        self.unsaved_users().insert(user_id.to_string());
    }

    /// Load a user's record, falling back to the cache when the store fails
    pub async fn load(&self, user_id: &str) -> Loaded {
        match self.store.get(USER_STATS, user_id).await {
            Ok(Some(doc)) => match serde_json::from_value::<UserStats>(doc) {
                Ok(stats) => {
                    self.mirror(user_id, &stats);
                    Loaded {
                        stats: Some(stats),
                        tier: Tier::Primary,
                    }
                }
                Err(e) => {
                    warn!(user_id, error = %e, "Stored stats are unreadable, using local cache");
                    self.load_cached(user_id)
                }
            },
            Ok(None) => Loaded {
                stats: None,
                tier: Tier::Primary,
            },
            Err(e) => {
                warn!(user_id, error = %e, "Could not fetch stats from store, using local cache");
                self.load_cached(user_id)
            }
        }
    }

    /// Persist a freshly created record
    pub async fn create(&self, user_id: &str, stats: &UserStats) {
        self.unsaved_users().remove(user_id);
        self.mirror(user_id, stats);

        let doc = match serde_json::to_value(stats) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(user_id, error = %e, "Could not serialize stats");
                return;
            }
        };
        match self.store.set(USER_STATS, user_id, doc).await {
            Ok(()) => debug!(user_id, "Created stats record"),
            Err(e) => warn!(user_id, error = %e, "Could not save new stats to store"),
        }
    }

    /// Atomically add `delta` to a counter; returns the updated record
    pub async fn add(&self, user_id: &str, base: &UserStats, counter: Counter, delta: f64) -> UserStats {
        self.save_if_unsaved(user_id, base).await;
        let mut updated = base.clone();
        match self
            .store
            .increment(USER_STATS, user_id, counter.field(), delta)
            .await
        {
            Ok(value) => counter.set(&mut updated, value),
            Err(e) => {
                warn!(user_id, field = counter.field(), error = %e, "Could not increment in store, updating local cache only");
                counter.set(&mut updated, counter.get(base) + delta);
            }
        }
        self.mirror(user_id, &updated);
        updated
    }

    /// Overwrite the fields set in `patch`; returns the updated record
    pub(crate) async fn patch(&self, user_id: &str, base: &UserStats, patch: StatsPatch) -> UserStats {
        self.save_if_unsaved(user_id, base).await;
        let mut updated = base.clone();
        patch.apply(&mut updated);

        match patch.to_fields() {
            Ok(fields) => {
                if let Err(e) = self.store.merge(USER_STATS, user_id, fields).await {
                    warn!(user_id, error = %e, "Could not update stats in store, updating local cache only");
                }
            }
            Err(e) => warn!(user_id, error = %e, "Could not serialize stats patch"),
        }

        self.mirror(user_id, &updated);
        updated
    }

    /// Add a badge to the user's badge set; returns the updated record
    pub async fn add_badge(&self, user_id: &str, base: &UserStats, badge_id: &str) -> UserStats {
        self.save_if_unsaved(user_id, base).await;
        let mut updated = base.clone();
        match self
            .store
            .add_to_set(USER_STATS, user_id, "badges", badge_id)
            .await
        {
            Ok(members) => updated.badges.extend(members),
            Err(e) => {
                warn!(user_id, badge_id, error = %e, "Could not award badge in store, updating local cache only");
                updated.badges.insert(badge_id.to_string());
            }
        }
        self.mirror(user_id, &updated);
        updated
    }

    /// Add `value` to a set field of a side collection document; returns the
    /// number of distinct members.
    pub async fn add_member(&self, collection: &str, user_id: &str, field: &str, value: &str) -> usize {
        let key = cache_key(collection, user_id);
        let members = match self.store.add_to_set(collection, user_id, field, value).await {
            Ok(members) => members,
            Err(e) => {
                warn!(user_id, collection, error = %e, "Could not update store, updating local cache only");
                let cached = self.read_slot(&key);
                let mut members = string_members(cached.as_ref().and_then(|doc| doc.get(field)));
                if !members.iter().any(|m| m == value) {
                    members.push(value.to_string());
                }
                members
            }
        };

        let count = members.len();
        let mut doc = Map::new();
        doc.insert(field.to_string(), Value::from(members));
        doc.insert("count".to_string(), number_value(count as f64));
        self.write_slot(&key, &Value::Object(doc));
        count
    }

    /// Write `base` as the user's record if it was seeded offline and the
    /// store has no record yet
    async fn save_if_unsaved(&self, user_id: &str, base: &UserStats) {
        if !self.unsaved_users().contains(user_id) {
            return;
        }
        let doc = match serde_json::to_value(base) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(user_id, error = %e, "Could not serialize stats");
                return;
            }
        };
        match self.store.create_if_absent(USER_STATS, user_id, doc).await {
            Ok(created) => {
                debug!(user_id, created, "Saved offline-seeded stats record");
                self.unsaved_users().remove(user_id);
            }
            Err(e) => debug!(user_id, error = %e, "Store still unreachable, record stays unsaved"),
        }
    }

    fn unsaved_users(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.unsaved.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load_cached(&self, user_id: &str) -> Loaded {
        let stats = self
            .read_slot(&cache_key(USER_STATS, user_id))
            .and_then(|doc| match serde_json::from_value::<UserStats>(doc) {
                Ok(stats) => Some(stats),
                Err(e) => {
                    warn!(user_id, error = %e, "Cached stats are corrupt, ignoring");
                    None
                }
            });
        Loaded {
            stats,
            tier: Tier::Fallback,
        }
    }

    fn mirror(&self, user_id: &str, stats: &UserStats) {
        match serde_json::to_value(stats) {
            Ok(doc) => self.write_slot(&cache_key(USER_STATS, user_id), &doc),
            Err(e) => warn!(user_id, error = %e, "Could not serialize stats for local cache"),
        }
    }

    fn read_slot(&self, key: &str) -> Option<Value> {
        match self.cache.read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Could not read local cache");
                None
            }
        }
    }

    fn write_slot(&self, key: &str, value: &Value) {
        if let Err(e) = self.cache.write(key, value) {
            warn!(key, error = %e, "Could not write local cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::cache::MemoryCache;
    use crate::stats::store::{MemoryStore, USER_SOCIAL};
    use chrono::NaiveDate;

    fn setup() -> (Arc<MemoryStore>, Arc<MemoryCache>, StatsRepository) {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::new());
        let repo = StatsRepository::new(store.clone(), cache.clone());
        (store, cache, repo)
    }

    fn seed() -> UserStats {
        UserStats::seed(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap())
    }

    #[tokio::test]
    async fn test_load_missing_is_primary_none() {
        let (_, _, repo) = setup();
        let loaded = repo.load("u1").await;
        assert!(loaded.stats.is_none());
        assert_eq!(loaded.tier, Tier::Primary);
    }

    #[tokio::test]
    async fn test_successful_writes_refresh_cache() {
        let (store, cache, repo) = setup();
        repo.create("u1", &seed()).await;
        let updated = repo.add("u1", &seed(), Counter::Xp, 25.0).await;
        assert_eq!(updated.xp, 75);

        assert_eq!(store.peek(USER_STATS, "u1").unwrap()["xp"], 75);
        let cached = cache.read("userStats_u1").unwrap().unwrap();
        assert_eq!(cached["xp"], 75);
    }

    #[tokio::test]
    async fn test_unsaved_seed_is_written_before_first_counter() {
        let (store, _, repo) = setup();
        repo.mark_unsaved("u1");

        let updated = repo.add("u1", &seed(), Counter::TasksCompleted, 1.0).await;
        assert_eq!(updated.tasks_completed, 1);

        let doc = store.peek(USER_STATS, "u1").unwrap();
        assert_eq!(doc["xp"], 50);
        assert_eq!(doc["tasksCompleted"], 1);
        assert!(doc["achievements"].as_array().is_some_and(|a| !a.is_empty()));
    }

    #[tokio::test]
    async fn test_unsaved_mark_survives_outage() {
        let (store, _, repo) = setup();
        repo.mark_unsaved("u1");
        store.set_offline(true);
        let offline = repo.add("u1", &seed(), Counter::Xp, 10.0).await;
        assert!(store.peek(USER_STATS, "u1").is_none());

        store.set_offline(false);
        repo.add("u1", &offline, Counter::Xp, 5.0).await;
        assert_eq!(store.peek(USER_STATS, "u1").unwrap()["xp"], 65);
    }

    #[tokio::test]
    async fn test_offline_store_falls_back_to_cache() {
        let (store, _, repo) = setup();
        repo.create("u1", &seed()).await;
        store.set_offline(true);

        let loaded = repo.load("u1").await;
        assert_eq!(loaded.tier, Tier::Fallback);
        let stats = loaded.stats.unwrap();

        let updated = repo.add("u1", &stats, Counter::TasksCompleted, 1.0).await;
        assert_eq!(updated.tasks_completed, 1);

        let reloaded = repo.load("u1").await.stats.unwrap();
        assert_eq!(reloaded.tasks_completed, 1);

        store.set_offline(false);
        assert_eq!(store.peek(USER_STATS, "u1").unwrap()["tasksCompleted"], 0);
    }

    #[tokio::test]
    async fn test_add_member_counts_distinct_values_offline() {
        let (store, _, repo) = setup();
        assert_eq!(repo.add_member(USER_SOCIAL, "u1", "roomsJoined", "a").await, 1);
        store.set_offline(true);
        assert_eq!(repo.add_member(USER_SOCIAL, "u1", "roomsJoined", "a").await, 1);
        assert_eq!(repo.add_member(USER_SOCIAL, "u1", "roomsJoined", "b").await, 2);
    }
}
