//! Profile insights derived from a user's progression record

use serde::{Deserialize, Serialize};

use crate::stats::models::UserStats;

/// Minimal view of a task for completion-rate purposes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyInsights {
    pub overall_score: u32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub focus_areas: Vec<String>,
    pub motivational_message: String,
}

/// Score and coach a user from their record, task list and study time
pub fn profile_insights(stats: &UserStats, tasks: &[TaskSummary], study_hours: f64) -> StudyInsights {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let completion_rate = if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let streak = stats.streak;
    let level = stats.level.max(1);

    let score = completion_rate * 0.4
        + (study_hours * 2.0).min(50.0) * 0.3
        + (f64::from(streak) * 3.0).min(30.0) * 0.2
        + (f64::from(level) * 2.0).min(20.0) * 0.1;
    let overall_score = score.round().clamp(0.0, 100.0) as u32;

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut recommendations = Vec::new();
    let mut focus_areas = Vec::new();

    if completion_rate >= 80.0 {
        strengths.push("Excellent task completion rate");
    } else if completion_rate >= 60.0 {
        strengths.push("Good task management");
    } else if completion_rate < 40.0 {
        weaknesses.push("Low task completion rate");
        recommendations.push("Break large tasks into smaller, manageable chunks");
        focus_areas.push("Task Management");
    }

    if study_hours >= 20.0 {
        strengths.push("Dedicated study time commitment");
    } else if study_hours >= 10.0 {
        strengths.push("Consistent study habits");
    } else if study_hours < 5.0 {
        weaknesses.push("Limited study time");
        recommendations.push("Try the Pomodoro technique to build consistent study habits");
        focus_areas.push("Study Consistency");
    }

    if streak >= 7 {
        strengths.push("Outstanding study streak");
    } else if streak >= 3 {
        strengths.push("Building good momentum");
    } else if streak == 0 {
        weaknesses.push("No current study streak");
        recommendations.push("Start with just 15 minutes of study today to begin your streak");
        focus_areas.push("Daily Consistency");
    }

    if level >= 5 {
        strengths.push("Strong learning progression");
    } else if level >= 3 {
        strengths.push("Steady advancement");
    }

    if total == 0 {
        recommendations.push("Create your first task to start organizing your studies");
        focus_areas.push("Getting Started");
    }

    if recommendations.is_empty() {
        recommendations
            .push("Keep up the great work! Consider exploring AI features to enhance your learning");
    }

    let motivational_message = motivational_message(overall_score, !strengths.is_empty());
    if strengths.is_empty() {
        strengths.push("You're just getting started - every expert was once a beginner!");
    }
    if focus_areas.is_empty() {
        focus_areas.push("Exploration");
    }

    StudyInsights {
        overall_score,
        strengths: to_strings(strengths),
        weaknesses: to_strings(weaknesses),
        recommendations: to_strings(recommendations),
        focus_areas: to_strings(focus_areas),
        motivational_message: motivational_message.to_string(),
    }
}

fn motivational_message(score: u32, has_strengths: bool) -> &'static str {
    match score {
        80.. => "🌟 You're absolutely crushing it! Your dedication is truly inspiring.",
        60..=79 => "🚀 Great progress! You're building excellent study habits.",
        40..=59 => "💪 You're on the right track! Small consistent steps lead to big achievements.",
        _ if has_strengths => {
            "🌱 Every journey begins with a single step. You're already showing promise!"
        }
        _ => "✨ Welcome to your learning journey! The best time to start is now.",
    }
}

/// Practical tips for the given completion rate (percent) and study hours
pub fn efficiency_tips(completion_rate: f64, study_hours: f64) -> Vec<String> {
    let mut tips = Vec::new();

    if completion_rate < 60.0 {
        tips.push("Break large tasks into smaller, 25-minute focused sessions");
        tips.push("Use the priority matrix to focus on important and urgent tasks first");
        tips.push("Set specific, measurable goals for each study session");
    }

    if study_hours < 3.0 {
        tips.push("Start with just 15 minutes of focused study daily");
        tips.push("Use the Pomodoro timer to maintain concentration");
        tips.push("Find your peak energy hours and schedule important tasks then");
    }

    tips.push("Review and adjust your study methods weekly");
    tips.push("Use active recall techniques instead of passive reading");
    tips.push("Take regular breaks to maintain mental freshness");

    to_strings(tips)
}

fn to_strings(items: Vec<&str>) -> Vec<String> {
    items.into_iter().map(str::to_string).collect()
}
