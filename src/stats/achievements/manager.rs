//! Progression engine - core gamification logic
//!
//! Owns XP, levels, streaks, achievements and badges for every user. All
//! persistence goes through the two-tier [`StatsRepository`], so none of the
//! operations here can fail; storage problems are logged and absorbed.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, Utc};
use tracing::{debug, info, warn};

use super::checker::{STREAK_MILESTONES, reached};
use super::definitions::{AchievementId, CATALOGUE_VERSION};
use super::events::{EventBus, ProgressionEvent, Subscription};
use super::levels::{XpRewards, level_for_xp};
use super::streaks::{Clock, StreakChange, SystemClock, next_streak};
use crate::config::Config;
use crate::stats::cache::FileCache;
use crate::stats::db::SqliteStore;
use crate::stats::models::{Achievement, Counter, StatsPatch, UserStats};
use crate::stats::recorder::ActivityRecorder;
use crate::stats::repository::{StatsRepository, Tier};

/// Result of an XP grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAward {
    pub new_xp: u64,
    pub new_level: u32,
    pub leveled_up: bool,
}

/// Result of [`ProgressionEngine::unlock_achievement`]
#[derive(Debug, Clone, PartialEq)]
pub enum UnlockOutcome {
    /// Newly earned; carries the updated record
    Unlocked(Achievement),
    AlreadyEarned,
    UnknownId,
}

impl UnlockOutcome {
    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked(_))
    }
}

/// Result of [`ProgressionEngine::update_achievement_progress`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressOutcome {
    /// Progress now holds this (clamped) value
    Updated(u32),
    AlreadyEarned,
    /// The achievement has no progress target
    NotTracked,
    UnknownId,
}

/// Main entry point for progression features
#[derive(Clone)]
pub struct ProgressionEngine {
    repo: StatsRepository,
    clock: Arc<dyn Clock>,
    events: EventBus,
}

impl ProgressionEngine {
    pub fn new(repo: StatsRepository, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            events: EventBus::new(),
        }
    }

    /// Engine over the on-disk store and cache named by `config`
    pub fn open(config: &Config) -> Result<Self> {
        let store = SqliteStore::open(&config.database_path())?;
        let cache = FileCache::open(&config.cache_dir())?;
        let repo = StatsRepository::new(Arc::new(store), Arc::new(cache));
        Ok(Self::new(repo, Arc::new(SystemClock)))
    }

    pub fn repository(&self) -> &StatsRepository {
        &self.repo
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register a listener for this engine's progression events
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ProgressionEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    /// Event recorders bound to this engine
    pub fn recorder(&self) -> ActivityRecorder<'_> {
        ActivityRecorder::new(self)
    }

    // ========================================
    // RECORD LIFECYCLE
    // ========================================

    /// Fetch a user's record, creating or healing it as needed
    pub async fn get_or_init_stats(&self, user_id: &str) -> UserStats {
        let today = self.clock.today();
        let loaded = self.repo.load(user_id).await;

        let Some(mut stats) = loaded.stats else {
            let seed = UserStats::seed(today);
            match loaded.tier {
                Tier::Primary => {
                    info!(user_id, "Creating progression record");
                    self.repo.create(user_id, &seed).await;
                }
                Tier::Fallback => {
                    debug!(user_id, "No record available offline, using seed state");
                    self.repo.mark_unsaved(user_id);
                }
            }
            return seed;
        };

        let mut patch = StatsPatch::default();
        if stats.needs_healing() {
            if stats.heal_achievements(today) {
                debug!(user_id, count = stats.achievements.len(), "Healed achievement list");
                patch.achievements = Some(stats.achievements.clone());
            }
            if stats.catalogue_version != CATALOGUE_VERSION {
                patch.catalogue_version = Some(CATALOGUE_VERSION);
            }
        }
        let level = level_for_xp(stats.xp);
        if stats.level != level {
            patch.level = Some(level);
        }

        if !patch.is_empty() {
            stats = self.repo.patch(user_id, &stats, patch).await;
        }
        stats
    }

    // ========================================
    // XP & LEVEL OPERATIONS
    // ========================================

    /// Grant `amount` XP and recompute the level
    pub async fn add_xp(&self, user_id: &str, amount: u64) -> XpAward {
        let stats = self.get_or_init_stats(user_id).await;
        self.grant_xp(user_id, &stats, amount).await.1
    }

    pub(crate) async fn grant_xp(&self, user_id: &str, base: &UserStats, amount: u64) -> (UserStats, XpAward) {
        let old_level = level_for_xp(base.xp);
        let mut stats = self.repo.add(user_id, base, Counter::Xp, amount as f64).await;

        let new_level = level_for_xp(stats.xp);
        if stats.level != new_level {
            stats = self.repo.patch(user_id, &stats, StatsPatch::level(new_level)).await;
        }

        let leveled_up = new_level > old_level;
        if leveled_up {
            info!(user_id, old_level, new_level, "Level up");
            self.events.emit(ProgressionEvent::LevelUp {
                user_id: user_id.to_string(),
                old_level,
                new_level,
            });
        }

        let award = XpAward {
            new_xp: stats.xp,
            new_level,
            leveled_up,
        };
        (stats, award)
    }

    // ========================================
    // STREAK OPERATIONS
    // ========================================

    /// Count today's activity towards the daily streak
    pub async fn update_streak(&self, user_id: &str) -> u32 {
        let stats = self.get_or_init_stats(user_id).await;
        let now = self.clock.now();
        let last_day = stats
            .last_active
            .map(|ts| ts.with_timezone(&Local).date_naive());

        let (change, streak) = next_streak(stats.streak, last_day, now.date_naive());
        if change == StreakChange::SameDay {
            return stats.streak;
        }
        debug!(user_id, ?change, streak, "Updating streak");

        let patch = StatsPatch {
            streak: Some(streak),
            last_active: Some(now.with_timezone(&Utc)),
            ..StatsPatch::default()
        };
        let stats = self.repo.patch(user_id, &stats, patch).await;
        self.advance_milestones(user_id, stats, u64::from(streak), STREAK_MILESTONES)
            .await;
        streak
    }

    // ========================================
    // ACHIEVEMENT OPERATIONS
    // ========================================

    /// Set progress on a tracked achievement, clamped to its target
    pub async fn update_achievement_progress(&self, user_id: &str, achievement_id: &str, progress: u32) -> ProgressOutcome {
        let stats = self.get_or_init_stats(user_id).await;

        let mut achievements = stats.achievements.clone();
        let Some(achievement) = achievements.iter_mut().find(|a| a.id == achievement_id) else {
            warn!(user_id, achievement_id, "Progress update for unknown achievement");
            return ProgressOutcome::UnknownId;
        };

        let before = achievement.progress;
        let outcome = step_progress(achievement, progress);
        if matches!(outcome, ProgressOutcome::Updated(_)) && achievement.progress != before {
            self.repo
                .patch(user_id, &stats, StatsPatch::achievements(achievements))
                .await;
        }
        outcome
    }

    /// Mark an achievement earned and grant its XP reward
    pub async fn unlock_achievement(&self, user_id: &str, achievement_id: &str) -> UnlockOutcome {
        let stats = self.get_or_init_stats(user_id).await;
        self.unlock(user_id, stats, achievement_id).await.1
    }

    pub(crate) async fn unlock(&self, user_id: &str, stats: UserStats, achievement_id: &str) -> (UserStats, UnlockOutcome) {
        let Some(index) = stats.achievements.iter().position(|a| a.id == achievement_id) else {
            warn!(user_id, achievement_id, "Unlock requested for unknown achievement");
            return (stats, UnlockOutcome::UnknownId);
        };
        if stats.achievements[index].earned {
            return (stats, UnlockOutcome::AlreadyEarned);
        }

        let mut achievements = stats.achievements.clone();
        let achievement = &mut achievements[index];
        achievement.earned = true;
        achievement.date = Some(self.clock.today());
        if let Some(max) = achievement.max_progress {
            achievement.progress = Some(max);
        }
        let unlocked = achievement.clone();

        let stats = self
            .repo
            .patch(user_id, &stats, StatsPatch::achievements(achievements))
            .await;
        let (stats, _) = self
            .grant_xp(user_id, &stats, u64::from(unlocked.xp_reward))
            .await;

        info!(user_id, achievement = %unlocked.id, xp = unlocked.xp_reward, "Achievement unlocked");
        self.events.emit(ProgressionEvent::AchievementUnlocked {
            user_id: user_id.to_string(),
            achievement: unlocked.clone(),
        });
        (stats, UnlockOutcome::Unlocked(unlocked))
    }

    /// Update progress for every entry of `milestones` to `value`, then
    /// unlock those whose threshold is met.
    pub(crate) async fn advance_milestones(
        &self,
        user_id: &str,
        mut stats: UserStats,
        value: u64,
        milestones: &[(u64, AchievementId)],
    ) -> (UserStats, Vec<Achievement>) {
        let progress = u32::try_from(value).unwrap_or(u32::MAX);
        let mut achievements = stats.achievements.clone();
        let mut changed = false;
        for (_, id) in milestones {
            if let Some(achievement) = achievements.iter_mut().find(|a| a.id == id.as_str()) {
                let before = achievement.progress;
                step_progress(achievement, progress);
                changed |= achievement.progress != before;
            }
        }
        if changed {
            stats = self
                .repo
                .patch(user_id, &stats, StatsPatch::achievements(achievements))
                .await;
        }

        let mut unlocked = Vec::new();
        for id in reached(value, milestones) {
            let (next, outcome) = self.unlock(user_id, stats, id.as_str()).await;
            stats = next;
            if let UnlockOutcome::Unlocked(achievement) = outcome {
                unlocked.push(achievement);
            }
        }
        (stats, unlocked)
    }

    // ========================================
    // BADGES
    // ========================================

    /// Award a badge once, granting its XP bonus
    pub async fn award_badge(&self, user_id: &str, badge_id: &str) -> bool {
        let stats = self.get_or_init_stats(user_id).await;
        self.grant_badge(user_id, stats, badge_id).await.1
    }

    pub(crate) async fn grant_badge(&self, user_id: &str, stats: UserStats, badge_id: &str) -> (UserStats, bool) {
        if stats.badges.contains(badge_id) {
            return (stats, false);
        }

        let stats = self.repo.add_badge(user_id, &stats, badge_id).await;
        let (stats, _) = self
            .grant_xp(user_id, &stats, XpRewards::BADGE_AWARDED)
            .await;

        info!(user_id, badge_id, "Badge awarded");
        self.events.emit(ProgressionEvent::BadgeAwarded {
            user_id: user_id.to_string(),
            badge_id: badge_id.to_string(),
        });
        (stats, true)
    }
}

impl std::fmt::Debug for ProgressionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressionEngine")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

/// Apply a progress value to one achievement record in memory
fn step_progress(achievement: &mut Achievement, progress: u32) -> ProgressOutcome {
    if achievement.earned {
        return ProgressOutcome::AlreadyEarned;
    }
    let Some(max) = achievement.max_progress else {
        return ProgressOutcome::NotTracked;
    };
    let clamped = progress.min(max);
    achievement.progress = Some(clamped);
    ProgressOutcome::Updated(clamped)
}
