//! Data models for progression tracking
//!
//! These structures are the documents stored in the stats store and mirrored
//! into the local cache. Field names serialize in camelCase so records stay
//! compatible with the document layout used by the web client.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::achievements::{CATALOGUE, CATALOGUE_VERSION, XpRewards, level_for_xp, seed_achievements};

/// Rarity tier of an achievement (display only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }

}

/// Achievement category for grouping in UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Study,
    Tasks,
    Social,
    Ai,
    Streak,
    Special,
}

impl AchievementCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Study => "Study",
            Self::Tasks => "Tasks",
            Self::Social => "Social",
            Self::Ai => "AI",
            Self::Streak => "Streaks",
            Self::Special => "Special",
        }
    }
}

/// Per-user achievement record, one per catalogue entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    #[serde(default)]
    pub earned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_progress: Option<u32>,
    /// Day the achievement was earned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub rarity: Rarity,
    pub xp_reward: u32,
    pub category: AchievementCategory,
}

fn default_level() -> u32 {
    1
}

/// Progression record for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub xp: u64,
    /// Always `xp / 1000 + 1`; written only by the progression engine
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default)]
    pub study_hours: f64,
    #[serde(default)]
    pub tasks_completed: u64,
    #[serde(default)]
    pub flashcards_created: u64,
    #[serde(default)]
    pub badges: BTreeSet<String>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    /// Catalogue version the achievement list was last healed against;
    /// 0 for records that predate versioning
    #[serde(default)]
    pub catalogue_version: u32,
}

impl UserStats {
    /// Initial record for a brand new user
    pub fn seed(today: NaiveDate) -> Self {
        let xp = XpRewards::WELCOME_BONUS;
        Self {
            xp,
            level: level_for_xp(xp),
            streak: 0,
            last_active: None,
            study_hours: 0.0,
            tasks_completed: 0,
            flashcards_created: 0,
            badges: BTreeSet::new(),
            achievements: seed_achievements(today),
            catalogue_version: CATALOGUE_VERSION,
        }
    }

    /// Whether the achievement list has to be checked against the catalogue
    pub fn needs_healing(&self) -> bool {
        self.catalogue_version != CATALOGUE_VERSION || self.achievements.is_empty()
    }

    /// Add catalogue entries missing from this record.
    ///
    /// Existing rows are left untouched. Returns `true` if anything was added.
    pub fn heal_achievements(&mut self, today: NaiveDate) -> bool {
        let before = self.achievements.len();
        for def in CATALOGUE {
            if !self.achievements.iter().any(|a| a.id == def.id.as_str()) {
                self.achievements.push(def.seed_record(today));
            }
        }
        self.achievements.len() != before
    }

    pub fn achievement(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn is_earned(&self, id: &str) -> bool {
        self.achievement(id).is_some_and(|a| a.earned)
    }

    pub fn earned_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.earned).count()
    }

    pub fn achievements_with_rarity(&self, rarity: Rarity) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(move |a| a.rarity == rarity)
    }

    /// `(rarity, earned, total)` for every rarity tier
    pub fn rarity_breakdown(&self) -> Vec<(Rarity, usize, usize)> {
        Rarity::ALL
            .into_iter()
            .map(|rarity| {
                let total = self.achievements_with_rarity(rarity).count();
                let earned = self
                    .achievements_with_rarity(rarity)
                    .filter(|a| a.earned)
                    .count();
                (rarity, earned, total)
            })
            .collect()
    }
}

/// Numeric fields updated through the store's atomic increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Xp,
    TasksCompleted,
    FlashcardsCreated,
    StudyHours,
}

impl Counter {
    /// Document field name
    pub fn field(&self) -> &'static str {
        match self {
            Self::Xp => "xp",
            Self::TasksCompleted => "tasksCompleted",
            Self::FlashcardsCreated => "flashcardsCreated",
            Self::StudyHours => "studyHours",
        }
    }

    pub(crate) fn get(&self, stats: &UserStats) -> f64 {
        match self {
            Self::Xp => stats.xp as f64,
            Self::TasksCompleted => stats.tasks_completed as f64,
            Self::FlashcardsCreated => stats.flashcards_created as f64,
            Self::StudyHours => stats.study_hours,
        }
    }

    pub(crate) fn set(&self, stats: &mut UserStats, value: f64) {
        match self {
            Self::Xp => stats.xp = value.max(0.0).round() as u64,
            Self::TasksCompleted => stats.tasks_completed = value.max(0.0).round() as u64,
            Self::FlashcardsCreated => stats.flashcards_created = value.max(0.0).round() as u64,
            Self::StudyHours => stats.study_hours = value.max(0.0),
        }
    }
}

/// Partial update of a stats record
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<Vec<Achievement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalogue_version: Option<u32>,
}

impl StatsPatch {
    pub fn level(level: u32) -> Self {
        Self {
            level: Some(level),
            ..Self::default()
        }
    }

    pub fn achievements(achievements: Vec<Achievement>) -> Self {
        Self {
            achievements: Some(achievements),
            ..Self::default()
        }
    }

    /// Apply to an in-memory record
    pub fn apply(&self, stats: &mut UserStats) {
        if let Some(level) = self.level {
            stats.level = level;
        }
        if let Some(streak) = self.streak {
            stats.streak = streak;
        }
        if let Some(ts) = self.last_active {
            stats.last_active = Some(ts);
        }
        if let Some(achievements) = &self.achievements {
            stats.achievements = achievements.clone();
        }
        if let Some(version) = self.catalogue_version {
            stats.catalogue_version = version;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.streak.is_none()
            && self.last_active.is_none()
            && self.achievements.is_none()
            && self.catalogue_version.is_none()
    }

    /// Fields to merge into the stored document
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}
