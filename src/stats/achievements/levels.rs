//! XP and Level system
//!
//! Levels are fixed 1000 XP bands: level 1 covers 0-999 XP, level 2 covers
//! 1000-1999 XP and so on. There is no level cap.

/// XP needed to advance one level
pub const XP_PER_LEVEL: u64 = 1000;

/// Level for a given XP total
pub fn level_for_xp(xp: u64) -> u32 {
    u32::try_from(xp / XP_PER_LEVEL + 1).unwrap_or(u32::MAX)
}

/// Position of a user inside their current level band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelProgress {
    pub level: u32,
    /// XP earned since the start of the current level
    pub xp_into_level: u64,
    /// XP still needed to reach the next level
    pub xp_to_next: u64,
}

impl LevelProgress {
    pub fn for_xp(xp: u64) -> Self {
        let xp_into_level = xp % XP_PER_LEVEL;
        Self {
            level: level_for_xp(xp),
            xp_into_level,
            xp_to_next: XP_PER_LEVEL - xp_into_level,
        }
    }

    /// Calculate progress to next level (0.0 - 1.0)
    pub fn progress_to_next(&self) -> f32 {
        self.xp_into_level as f32 / XP_PER_LEVEL as f32
    }
}

/// XP rewards for various actions
pub struct XpRewards;

impl XpRewards {
    /// Granted once when a user record is created
    pub const WELCOME_BONUS: u64 = 50;

    pub const TASK_COMPLETED: u64 = 25;

    pub const TASK_CREATED: u64 = 10;

    /// Per flashcard
    pub const FLASHCARD_CREATED: u64 = 15;

    pub const AI_FEATURE_USED: u64 = 20;

    pub const STUDY_ROOM_JOINED: u64 = 30;

    pub const BADGE_AWARDED: u64 = 100;

    /// 10 XP for every full 5 minutes of study
    pub fn study_session(duration_minutes: u32) -> u64 {
        u64::from(duration_minutes / 5) * 10
    }

    pub fn flashcards(count: u32) -> u64 {
        Self::FLASHCARD_CREATED * u64::from(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(999), 1);
        assert_eq!(level_for_xp(1000), 2);
        assert_eq!(level_for_xp(1999), 2);
        assert_eq!(level_for_xp(25_000), 26);
    }

    #[test]
    fn test_level_progress() {
        let progress = LevelProgress::for_xp(1250);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.xp_into_level, 250);
        assert_eq!(progress.xp_to_next, 750);
        assert!((progress.progress_to_next() - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_study_session_xp() {
        assert_eq!(XpRewards::study_session(4), 0);
        assert_eq!(XpRewards::study_session(25), 50);
        assert_eq!(XpRewards::study_session(125), 250);
        assert_eq!(XpRewards::flashcards(3), 45);
    }
}
