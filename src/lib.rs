//! StudyHub - progression engine for a study app
//!
//! StudyHub turns study activity (completed tasks, study sessions, flashcards,
//! AI feature use, study rooms) into XP, levels, daily streaks, achievements
//! and badges, and scores overall study efficiency.
//!
//! ## Layers
//!
//! 1. **Progression** ([`stats::ProgressionEngine`]): per-user records in a
//!    document store with a local cache fallback, and an event bus for
//!    unlock / level-up notifications.
//!
//! 2. **Analytics** ([`stats::efficiency`]): pure scoring and insight rules
//!    over aggregated activity.

pub mod config;
pub mod stats;

pub use config::Config;
