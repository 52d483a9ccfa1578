//! Activity recorder - turns study-app events into progression
//!
//! Every recorder follows the same sequence: update the counter behind the
//! event, grant the event's XP, re-fetch the record, update progress of the
//! achievements tracked by that counter, then unlock whatever threshold was
//! reached.

use tracing::debug;

use super::achievements::{
    AI_FEATURE_MILESTONES, AchievementId, FLASHCARD_MILESTONES, ProgressionEngine,
    SESSION_LENGTH_MILESTONES, STUDY_HOUR_MILESTONES, STUDY_ROOM_MILESTONES, TASK_MILESTONES,
    UnlockOutcome, XpRewards, check_time_achievements,
};
use super::models::{Achievement, Counter, UserStats};
use super::store::{USER_AI_FEATURES, USER_SOCIAL};

/// Badge granted alongside the study-room achievement
pub const SOCIAL_BUTTERFLY_BADGE: &str = "social-butterfly";

/// What a single recorded event did to the user's progression
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSummary {
    /// XP granted for the event itself (achievement rewards not included)
    pub xp_awarded: u64,
    /// Achievements unlocked by this event
    pub unlocked: Vec<Achievement>,
    /// Record after the event was applied
    pub stats: UserStats,
}

/// Records study-app events against a [`ProgressionEngine`]
#[derive(Debug, Clone, Copy)]
pub struct ActivityRecorder<'a> {
    engine: &'a ProgressionEngine,
}

impl<'a> ActivityRecorder<'a> {
    pub fn new(engine: &'a ProgressionEngine) -> Self {
        Self { engine }
    }

    /// Record a completed task
    pub async fn task_completed(&self, user_id: &str) -> RecordSummary {
        let hour = self.engine.clock().hour();
        let stats = self.engine.get_or_init_stats(user_id).await;
        self.bump(user_id, &stats, Counter::TasksCompleted, 1.0).await;
        self.engine
            .add_xp(user_id, XpRewards::TASK_COMPLETED)
            .await;

        let stats = self.engine.get_or_init_stats(user_id).await;
        let count = stats.tasks_completed;
        let (mut stats, mut unlocked) = self
            .engine
            .advance_milestones(user_id, stats, count, TASK_MILESTONES)
            .await;

        for id in check_time_achievements(hour) {
            let (next, outcome) = self.engine.unlock(user_id, stats, id.as_str()).await;
            stats = next;
            if let UnlockOutcome::Unlocked(achievement) = outcome {
                unlocked.push(achievement);
            }
        }

        debug!(user_id, tasks_completed = count, "Recorded task completion");
        RecordSummary {
            xp_awarded: XpRewards::TASK_COMPLETED,
            unlocked,
            stats,
        }
    }

    /// Record a newly created task
    pub async fn task_created(&self, user_id: &str) -> RecordSummary {
        self.engine.add_xp(user_id, XpRewards::TASK_CREATED).await;

        let stats = self.engine.get_or_init_stats(user_id).await;
        let (stats, outcome) = self
            .engine
            .unlock(user_id, stats, AchievementId::FirstTask.as_str())
            .await;

        RecordSummary {
            xp_awarded: XpRewards::TASK_CREATED,
            unlocked: unlocked_only(outcome),
            stats,
        }
    }

    /// Record a finished study session of `duration_minutes`
    pub async fn study_session(&self, user_id: &str, duration_minutes: u32) -> RecordSummary {
        let xp = XpRewards::study_session(duration_minutes);
        let stats = self.engine.get_or_init_stats(user_id).await;
        self.bump(user_id, &stats, Counter::StudyHours, f64::from(duration_minutes) / 60.0)
            .await;
        self.engine.add_xp(user_id, xp).await;

        let stats = self.engine.get_or_init_stats(user_id).await;
        // Hour thresholds compare whole hours
        let hours = stats.study_hours.max(0.0).floor() as u64;
        let (stats, mut unlocked) = self
            .engine
            .advance_milestones(user_id, stats, hours, STUDY_HOUR_MILESTONES)
            .await;
        let (stats, session) = self
            .engine
            .advance_milestones(
                user_id,
                stats,
                u64::from(duration_minutes),
                SESSION_LENGTH_MILESTONES,
            )
            .await;
        unlocked.extend(session);

        debug!(user_id, duration_minutes, study_hours = stats.study_hours, "Recorded study session");
        RecordSummary {
            xp_awarded: xp,
            unlocked,
            stats,
        }
    }

    /// Record `count` new flashcards
    pub async fn flashcards_created(&self, user_id: &str, count: u32) -> RecordSummary {
        let xp = XpRewards::flashcards(count);
        let stats = self.engine.get_or_init_stats(user_id).await;
        self.bump(user_id, &stats, Counter::FlashcardsCreated, f64::from(count))
            .await;
        self.engine.add_xp(user_id, xp).await;

        let stats = self.engine.get_or_init_stats(user_id).await;
        let total = stats.flashcards_created;
        let (stats, unlocked) = self
            .engine
            .advance_milestones(user_id, stats, total, FLASHCARD_MILESTONES)
            .await;

        debug!(user_id, count, flashcards_created = total, "Recorded flashcards");
        RecordSummary {
            xp_awarded: xp,
            unlocked,
            stats,
        }
    }

    /// Record use of an AI feature; distinct features count towards AI Explorer
    pub async fn ai_feature_used(&self, user_id: &str, feature_id: &str) -> RecordSummary {
        let distinct = self
            .engine
            .repository()
            .add_member(USER_AI_FEATURES, user_id, "features", feature_id)
            .await;
        self.engine.add_xp(user_id, XpRewards::AI_FEATURE_USED).await;

        let stats = self.engine.get_or_init_stats(user_id).await;
        let (stats, unlocked) = self
            .engine
            .advance_milestones(user_id, stats, distinct as u64, AI_FEATURE_MILESTONES)
            .await;

        debug!(user_id, feature_id, distinct, "Recorded AI feature use");
        RecordSummary {
            xp_awarded: XpRewards::AI_FEATURE_USED,
            unlocked,
            stats,
        }
    }

    /// Record joining a study room; distinct rooms count towards Social Butterfly
    pub async fn study_room_joined(&self, user_id: &str, room_id: &str) -> RecordSummary {
        let joined = self
            .engine
            .repository()
            .add_member(USER_SOCIAL, user_id, "roomsJoined", room_id)
            .await;
        self.engine.add_xp(user_id, XpRewards::STUDY_ROOM_JOINED).await;

        let stats = self.engine.get_or_init_stats(user_id).await;
        let (mut stats, unlocked) = self
            .engine
            .advance_milestones(user_id, stats, joined as u64, STUDY_ROOM_MILESTONES)
            .await;

        if stats.is_earned(AchievementId::SocialButterfly.as_str()) {
            stats = self
                .engine
                .grant_badge(user_id, stats, SOCIAL_BUTTERFLY_BADGE)
                .await
                .0;
        }

        debug!(user_id, room_id, joined, "Recorded study room join");
        RecordSummary {
            xp_awarded: XpRewards::STUDY_ROOM_JOINED,
            unlocked,
            stats,
        }
    }

    async fn bump(&self, user_id: &str, stats: &UserStats, counter: Counter, delta: f64) {
        self.engine
            .repository()
            .add(user_id, stats, counter, delta)
            .await;
    }
}

fn unlocked_only(outcome: UnlockOutcome) -> Vec<Achievement> {
    match outcome {
        UnlockOutcome::Unlocked(achievement) => vec![achievement],
        _ => Vec::new(),
    }
}
