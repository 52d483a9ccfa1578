//! Study efficiency analytics
//!
//! Pure functions that score aggregated activity and turn it into readable
//! insights. Nothing here touches the stats store; callers gather the input
//! (from the CLI's JSON file, or from a [`UserStats`](super::UserStats)
//! record) and render the output.

mod insights;
mod report;

pub use insights::{StudyInsights, TaskSummary, efficiency_tips, profile_insights};
pub use report::{
    EfficiencyReport, Insight, InsightKind, LearningPatterns, PredictedGoal, Priority, WeeklyTrend,
    efficiency_report, learning_patterns, overall_score, weekly_trend,
};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One recorded study session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub start_time: DateTime<Local>,
    #[serde(default, alias = "duration")]
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// A subject the user is studying
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiUsage {
    #[serde(default)]
    pub total_queries: u32,
}

/// Aggregated activity fed to [`efficiency_report`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EfficiencyInput {
    /// Most recent first
    pub study_sessions: Vec<StudySession>,
    pub study_hours: f64,
    /// Percentage, 0-100
    pub completion_rate: f64,
    pub streak_days: u32,
    pub subjects: Vec<Subject>,
    pub ai_usage: AiUsage,
}

impl EfficiencyInput {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
