//! Achievement catalogue
//!
//! Every achievement a user can earn is declared here, independent of the
//! engine that tracks them. Bump [`CATALOGUE_VERSION`] whenever entries are
//! added so stored records can be migrated.

use std::collections::HashMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;

use crate::stats::models::{Achievement, AchievementCategory, Rarity};

/// Version of the catalogue table below
pub const CATALOGUE_VERSION: u32 = 2;

/// Unique identifier for each achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementId {
    // Common
    FirstSteps,
    FirstTask,
    EarlyBird,
    FirstStudy,
    QuickLearner,

    // Uncommon
    StudyNovice,
    WeekWarrior,
    TaskCrusher,
    FocusedMind,
    FlashcardFan,

    // Rare
    TaskMaster,
    FlashcardCreator,
    FocusMaster,
    ConsistencyBuilder,
    ProductivityPro,
    SocialButterfly,

    // Epic
    StreakWarrior,
    AiExplorer,
    CenturyClub,
    StudyMachine,
    FlashcardMaster,

    // Legendary
    StudyMarathon,
    Perfectionist,
    ConsistencyKing,
    KnowledgeGod,
    UltimateScholar,
}

impl AchievementId {
    /// Get the string ID used in stored records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstSteps => "first-steps",
            Self::FirstTask => "first-task",
            Self::EarlyBird => "early-bird",
            Self::FirstStudy => "first-study",
            Self::QuickLearner => "quick-learner",
            Self::StudyNovice => "study-novice",
            Self::WeekWarrior => "week-warrior",
            Self::TaskCrusher => "task-crusher",
            Self::FocusedMind => "focused-mind",
            Self::FlashcardFan => "flashcard-fan",
            Self::TaskMaster => "task-master",
            Self::FlashcardCreator => "flashcard-creator",
            Self::FocusMaster => "focus-master",
            Self::ConsistencyBuilder => "consistency-builder",
            Self::ProductivityPro => "productivity-pro",
            Self::SocialButterfly => "social-butterfly",
            Self::StreakWarrior => "streak-warrior",
            Self::AiExplorer => "ai-explorer",
            Self::CenturyClub => "century-club",
            Self::StudyMachine => "study-machine",
            Self::FlashcardMaster => "flashcard-master",
            Self::StudyMarathon => "study-marathon",
            Self::Perfectionist => "perfectionist",
            Self::ConsistencyKing => "consistency-king",
            Self::KnowledgeGod => "knowledge-god",
            Self::UltimateScholar => "ultimate-scholar",
        }
    }

    /// Parse from a stored string ID
    pub fn parse(s: &str) -> Option<Self> {
        CATALOGUE_INDEX.get(s).map(|def| def.id)
    }
}

impl std::fmt::Display for AchievementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Achievement definition with all metadata
#[derive(Debug, Clone)]
pub struct AchievementDef {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub rarity: Rarity,
    pub category: AchievementCategory,
    pub xp_reward: u32,
    /// For progressive achievements, the target count
    pub max_progress: Option<u32>,
}

/// All achievement definitions, in display order
pub static CATALOGUE: &[AchievementDef] = &[
    // === COMMON ===
    AchievementDef {
        id: AchievementId::FirstSteps,
        name: "First Steps",
        description: "Log in to StudyHub for the first time",
        icon: "⭐",
        rarity: Rarity::Common,
        category: AchievementCategory::Special,
        xp_reward: 50,
        max_progress: None,
    },
    AchievementDef {
        id: AchievementId::FirstTask,
        name: "Task Creator",
        description: "Create your very first task",
        icon: "📝",
        rarity: Rarity::Common,
        category: AchievementCategory::Tasks,
        xp_reward: 25,
        max_progress: Some(1),
    },
    AchievementDef {
        id: AchievementId::EarlyBird,
        name: "Early Bird",
        description: "Complete a task before 9 AM",
        icon: "🌅",
        rarity: Rarity::Common,
        category: AchievementCategory::Tasks,
        xp_reward: 30,
        max_progress: None,
    },
    AchievementDef {
        id: AchievementId::FirstStudy,
        name: "Study Starter",
        description: "Complete your first hour of study",
        icon: "📖",
        rarity: Rarity::Common,
        category: AchievementCategory::Study,
        xp_reward: 40,
        max_progress: Some(1),
    },
    AchievementDef {
        id: AchievementId::QuickLearner,
        name: "Quick Learner",
        description: "Create your first flashcard",
        icon: "⚡",
        rarity: Rarity::Common,
        category: AchievementCategory::Ai,
        xp_reward: 35,
        max_progress: Some(1),
    },
    // === UNCOMMON ===
    AchievementDef {
        id: AchievementId::StudyNovice,
        name: "Study Novice",
        description: "Study for 5 hours in total",
        icon: "📚",
        rarity: Rarity::Uncommon,
        category: AchievementCategory::Study,
        xp_reward: 100,
        max_progress: Some(5),
    },
    AchievementDef {
        id: AchievementId::WeekWarrior,
        name: "Week Warrior",
        description: "Study for 7 days in a row",
        icon: "⚔️",
        rarity: Rarity::Uncommon,
        category: AchievementCategory::Streak,
        xp_reward: 150,
        max_progress: Some(7),
    },
    AchievementDef {
        id: AchievementId::TaskCrusher,
        name: "Task Crusher",
        description: "Complete 10 tasks in a single day",
        icon: "💪",
        rarity: Rarity::Uncommon,
        category: AchievementCategory::Tasks,
        xp_reward: 120,
        max_progress: Some(10),
    },
    AchievementDef {
        id: AchievementId::FocusedMind,
        name: "Focused Mind",
        description: "Study for 2 hours straight",
        icon: "🎯",
        rarity: Rarity::Uncommon,
        category: AchievementCategory::Study,
        xp_reward: 130,
        max_progress: None,
    },
    AchievementDef {
        id: AchievementId::FlashcardFan,
        name: "Flashcard Fan",
        description: "Create 10 flashcards",
        icon: "🃏",
        rarity: Rarity::Uncommon,
        category: AchievementCategory::Ai,
        xp_reward: 110,
        max_progress: Some(10),
    },
    // === RARE ===
    AchievementDef {
        id: AchievementId::TaskMaster,
        name: "Task Master",
        description: "Complete 50 tasks",
        icon: "🏆",
        rarity: Rarity::Rare,
        category: AchievementCategory::Tasks,
        xp_reward: 300,
        max_progress: Some(50),
    },
    AchievementDef {
        id: AchievementId::FlashcardCreator,
        name: "Flashcard Creator",
        description: "Create 25 flashcards",
        icon: "🎴",
        rarity: Rarity::Rare,
        category: AchievementCategory::Ai,
        xp_reward: 250,
        max_progress: Some(25),
    },
    AchievementDef {
        id: AchievementId::FocusMaster,
        name: "Focus Master",
        description: "Study for 3 hours without a break",
        icon: "🧠",
        rarity: Rarity::Rare,
        category: AchievementCategory::Study,
        xp_reward: 400,
        max_progress: None,
    },
    AchievementDef {
        id: AchievementId::ConsistencyBuilder,
        name: "Consistency Builder",
        description: "Study for 14 days in a row",
        icon: "🔄",
        rarity: Rarity::Rare,
        category: AchievementCategory::Streak,
        xp_reward: 350,
        max_progress: Some(14),
    },
    AchievementDef {
        id: AchievementId::ProductivityPro,
        name: "Productivity Pro",
        description: "Complete 100 tasks",
        icon: "⚡",
        rarity: Rarity::Rare,
        category: AchievementCategory::Tasks,
        xp_reward: 450,
        max_progress: Some(100),
    },
    AchievementDef {
        id: AchievementId::SocialButterfly,
        name: "Social Butterfly",
        description: "Join 10 different study rooms",
        icon: "🦋",
        rarity: Rarity::Rare,
        category: AchievementCategory::Social,
        xp_reward: 300,
        max_progress: Some(10),
    },
    // === EPIC ===
    AchievementDef {
        id: AchievementId::StreakWarrior,
        name: "Streak Warrior",
        description: "Study for 30 days in a row",
        icon: "🔥",
        rarity: Rarity::Epic,
        category: AchievementCategory::Streak,
        xp_reward: 750,
        max_progress: Some(30),
    },
    AchievementDef {
        id: AchievementId::AiExplorer,
        name: "AI Explorer",
        description: "Use all 5 AI features",
        icon: "🤖",
        rarity: Rarity::Epic,
        category: AchievementCategory::Ai,
        xp_reward: 500,
        max_progress: Some(5),
    },
    AchievementDef {
        id: AchievementId::CenturyClub,
        name: "Century Club",
        description: "Complete 200 tasks",
        icon: "💯",
        rarity: Rarity::Epic,
        category: AchievementCategory::Tasks,
        xp_reward: 800,
        max_progress: Some(200),
    },
    AchievementDef {
        id: AchievementId::StudyMachine,
        name: "Study Machine",
        description: "Study for 50 hours total",
        icon: "🚀",
        rarity: Rarity::Epic,
        category: AchievementCategory::Study,
        xp_reward: 700,
        max_progress: Some(50),
    },
    AchievementDef {
        id: AchievementId::FlashcardMaster,
        name: "Flashcard Master",
        description: "Create 100 flashcards",
        icon: "🎯",
        rarity: Rarity::Epic,
        category: AchievementCategory::Ai,
        xp_reward: 600,
        max_progress: Some(100),
    },
    // === LEGENDARY ===
    AchievementDef {
        id: AchievementId::StudyMarathon,
        name: "Study Marathon",
        description: "Study for 100 hours total",
        icon: "🏃",
        rarity: Rarity::Legendary,
        category: AchievementCategory::Study,
        xp_reward: 1500,
        max_progress: Some(100),
    },
    AchievementDef {
        id: AchievementId::Perfectionist,
        name: "Perfectionist",
        description: "Complete 500 tasks",
        icon: "💎",
        rarity: Rarity::Legendary,
        category: AchievementCategory::Tasks,
        xp_reward: 2000,
        max_progress: Some(500),
    },
    AchievementDef {
        id: AchievementId::ConsistencyKing,
        name: "Consistency King",
        description: "Study for 100 days in a row",
        icon: "👑",
        rarity: Rarity::Legendary,
        category: AchievementCategory::Streak,
        xp_reward: 3000,
        max_progress: Some(100),
    },
    AchievementDef {
        id: AchievementId::KnowledgeGod,
        name: "Knowledge God",
        description: "Create 500 flashcards",
        icon: "⚡",
        rarity: Rarity::Legendary,
        category: AchievementCategory::Ai,
        xp_reward: 2500,
        max_progress: Some(500),
    },
    AchievementDef {
        id: AchievementId::UltimateScholar,
        name: "Ultimate Scholar",
        description: "Complete 1000 tasks",
        icon: "🌟",
        rarity: Rarity::Legendary,
        category: AchievementCategory::Special,
        xp_reward: 5000,
        max_progress: Some(1000),
    },
];

static CATALOGUE_INDEX: Lazy<HashMap<&'static str, &'static AchievementDef>> =
    Lazy::new(|| CATALOGUE.iter().map(|def| (def.id.as_str(), def)).collect());

impl AchievementDef {
    /// Get achievement definition by ID
    pub fn get(id: AchievementId) -> Option<&'static AchievementDef> {
        CATALOGUE_INDEX.get(id.as_str()).copied()
    }

    /// Look up a definition by its stored string ID
    pub fn find(id: &str) -> Option<&'static AchievementDef> {
        CATALOGUE_INDEX.get(id).copied()
    }

    /// Get total number of achievements
    pub fn total_count() -> usize {
        CATALOGUE.len()
    }

    /// Get total possible XP from all achievements
    pub fn total_xp() -> u32 {
        CATALOGUE.iter().map(|a| a.xp_reward).sum()
    }

    /// Build the initial per-user record for this definition.
    ///
    /// `first-steps` is granted on account creation, so its record starts
    /// earned and dated `today`.
    pub fn seed_record(&self, today: NaiveDate) -> Achievement {
        let earned = self.id == AchievementId::FirstSteps;
        Achievement {
            id: self.id.as_str().to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            earned,
            progress: self.max_progress.map(|_| 0),
            max_progress: self.max_progress,
            date: earned.then_some(today),
            rarity: self.rarity,
            xp_reward: self.xp_reward,
            category: self.category,
        }
    }
}

/// Seed records for the whole catalogue
pub fn seed_achievements(today: NaiveDate) -> Vec<Achievement> {
    CATALOGUE.iter().map(|def| def.seed_record(today)).collect()
}
