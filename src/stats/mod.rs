//! Progression tracking for StudyHub
//!
//! Tracks XP, levels, streaks, achievements and badges per user in a document
//! store (`~/.studyhub/progress.db`), mirrored into a local JSON cache that
//! takes over whenever the store is unreachable.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │ ActivityRecorder │────▶│ ProgressionEngine│──▶ EventBus ──▶ listeners
//! └──────────────────┘     └────────┬─────────┘
//!                                   ▼
//!                          ┌──────────────────┐
//!                          │  StatsRepository │
//!                          └───┬──────────┬───┘
//!                              ▼          ▼
//!                     DocumentStore    LocalCache
//!                   (SqliteStore)      (FileCache)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let engine = ProgressionEngine::open(&Config::load_or_default()?)?;
//!
//! // Record study-app events
//! let summary = engine.recorder().task_completed("alice").await;
//!
//! // Daily check-in
//! let streak = engine.update_streak("alice").await;
//! ```

pub mod achievements;
mod cache;
mod db;
pub mod efficiency;
mod models;
mod recorder;
mod repository;
mod store;

pub use achievements::{
    Clock, EventBus, FixedClock, LevelProgress, ProgressOutcome, ProgressionEngine,
    ProgressionEvent, Subscription, SystemClock, UnlockOutcome, XpAward,
};
pub use cache::{CacheError, FileCache, LocalCache, MemoryCache, cache_key};
pub use db::SqliteStore;
pub use models::{Achievement, AchievementCategory, Counter, Rarity, UserStats};
pub use recorder::{ActivityRecorder, RecordSummary, SOCIAL_BUTTERFLY_BADGE};
pub use repository::{Loaded, StatsRepository, Tier};
pub use store::{
    DocumentStore, MemoryStore, StoreError, StoreResult, USER_AI_FEATURES, USER_SOCIAL, USER_STATS,
};
