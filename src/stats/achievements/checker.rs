//! Achievement threshold tables
//!
//! Each table maps a cumulative counter threshold to the achievement it
//! unlocks. Recorders feed the current counter value through [`reached`] and
//! unlock whatever comes back; unlocking is idempotent so already earned
//! entries are harmless.

use super::definitions::AchievementId;

/// Completed tasks
pub const TASK_MILESTONES: &[(u64, AchievementId)] = &[
    (1, AchievementId::FirstTask),
    (50, AchievementId::TaskMaster),
    (100, AchievementId::ProductivityPro),
    (200, AchievementId::CenturyClub),
    (500, AchievementId::Perfectionist),
    (1000, AchievementId::UltimateScholar),
];

/// Total study hours
pub const STUDY_HOUR_MILESTONES: &[(u64, AchievementId)] = &[
    (1, AchievementId::FirstStudy),
    (5, AchievementId::StudyNovice),
    (50, AchievementId::StudyMachine),
    (100, AchievementId::StudyMarathon),
];

/// Minutes of a single uninterrupted session
pub const SESSION_LENGTH_MILESTONES: &[(u64, AchievementId)] = &[
    (120, AchievementId::FocusedMind),
    (180, AchievementId::FocusMaster),
];

/// Flashcards created
pub const FLASHCARD_MILESTONES: &[(u64, AchievementId)] = &[
    (1, AchievementId::QuickLearner),
    (10, AchievementId::FlashcardFan),
    (25, AchievementId::FlashcardCreator),
    (100, AchievementId::FlashcardMaster),
    (500, AchievementId::KnowledgeGod),
];

/// Distinct AI features used
pub const AI_FEATURE_MILESTONES: &[(u64, AchievementId)] = &[(5, AchievementId::AiExplorer)];

/// Distinct study rooms joined
pub const STUDY_ROOM_MILESTONES: &[(u64, AchievementId)] =
    &[(10, AchievementId::SocialButterfly)];

/// Consecutive study days
pub const STREAK_MILESTONES: &[(u64, AchievementId)] = &[
    (7, AchievementId::WeekWarrior),
    (14, AchievementId::ConsistencyBuilder),
    (30, AchievementId::StreakWarrior),
    (100, AchievementId::ConsistencyKing),
];

/// Tasks completed before this hour count towards Early Bird
pub const EARLY_BIRD_BEFORE_HOUR: u32 = 9;

/// Achievements whose threshold `value` has reached
pub fn reached(value: u64, milestones: &[(u64, AchievementId)]) -> Vec<AchievementId> {
    milestones
        .iter()
        .filter(|(threshold, _)| value >= *threshold)
        .map(|(_, id)| *id)
        .collect()
}

/// Time-of-day achievements for a task completed at `hour`
pub fn check_time_achievements(hour: u32) -> Vec<AchievementId> {
    if hour < EARLY_BIRD_BEFORE_HOUR {
        vec![AchievementId::EarlyBird]
    } else {
        Vec::new()
    }
}
