//! Gamification system: achievements, XP, levels, streaks and badges
//!
//! This module provides the progression layer on top of the stats store.

mod checker;
mod definitions;
mod events;
mod levels;
mod manager;
mod streaks;

pub use checker::{
    AI_FEATURE_MILESTONES, EARLY_BIRD_BEFORE_HOUR, FLASHCARD_MILESTONES, SESSION_LENGTH_MILESTONES,
    STREAK_MILESTONES, STUDY_HOUR_MILESTONES, STUDY_ROOM_MILESTONES, TASK_MILESTONES,
    check_time_achievements, reached,
};
pub use definitions::{
    AchievementDef, AchievementId, CATALOGUE, CATALOGUE_VERSION, seed_achievements,
};
pub use events::{EventBus, ProgressionEvent, Subscription};
pub use levels::{LevelProgress, XP_PER_LEVEL, XpRewards, level_for_xp};
pub use manager::{ProgressOutcome, ProgressionEngine, UnlockOutcome, XpAward};
pub use streaks::{Clock, FixedClock, StreakChange, SystemClock, classify, next_streak};
