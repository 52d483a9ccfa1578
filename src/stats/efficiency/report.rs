//! Efficiency report over aggregated activity

use std::collections::BTreeMap;

use chrono::{Datelike, Timelike, Weekday};
use serde::Serialize;

use super::{EfficiencyInput, StudySession, Subject};

const MAX_INSIGHTS: usize = 6;
const MAX_RECOMMENDATIONS: usize = 5;
const MAX_PREDICTED_GOALS: usize = 3;

/// Sessions per comparison window for the weekly trend
const TREND_WINDOW: usize = 7;

/// Reference session length for the focus score
const FOCUS_SESSION_MINUTES: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeeklyTrend {
    Improving,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Success,
    Warning,
    Improvement,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub priority: Priority,
    pub icon: String,
}

impl Insight {
    fn new(
        kind: InsightKind,
        priority: Priority,
        icon: &str,
        title: &str,
        description: impl Into<String>,
        recommendation: &str,
    ) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.into(),
            recommendation: recommendation.to_string(),
            priority,
            icon: icon.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictedGoal {
    pub title: String,
    /// Percent
    pub probability: u8,
    pub timeframe: String,
    pub actions: Vec<String>,
}

impl PredictedGoal {
    fn new(title: &str, probability: u8, timeframe: &str, actions: [&str; 2]) -> Self {
        Self {
            title: title.to_string(),
            probability,
            timeframe: timeframe.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPatterns {
    /// Hour with the most session starts, e.g. `"14:00"`
    pub best_study_time: String,
    /// Minutes
    pub average_session_length: u32,
    pub most_productive_day: String,
    pub preferred_subjects: Vec<String>,
    pub focus_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyReport {
    pub overall_score: u32,
    pub weekly_trend: WeeklyTrend,
    pub insights: Vec<Insight>,
    pub strengths: Vec<String>,
    pub focus_areas: Vec<String>,
    pub recommendations: Vec<String>,
    pub predicted_goals: Vec<PredictedGoal>,
    pub learning_patterns: LearningPatterns,
}

/// Build the full report
pub fn efficiency_report(input: &EfficiencyInput) -> EfficiencyReport {
    let overall_score = overall_score(input);
    let (strengths, focus_areas) = strengths_and_focus_areas(input);

    EfficiencyReport {
        overall_score,
        weekly_trend: weekly_trend(&input.study_sessions, input.completion_rate),
        insights: insights(input, overall_score),
        strengths,
        focus_areas,
        recommendations: recommendations(input),
        predicted_goals: predicted_goals(input),
        learning_patterns: learning_patterns(&input.study_sessions, &input.subjects),
    }
}

/// Weighted efficiency score, 0-100
pub fn overall_score(input: &EfficiencyInput) -> u32 {
    let score = input.completion_rate * 0.3
        + (input.study_hours * 2.0).min(40.0) * 0.25
        + (f64::from(input.streak_days) * 2.0).min(30.0) * 0.2
        + (input.subjects.len() as f64 * 5.0).min(25.0) * 0.15
        + f64::from(input.ai_usage.total_queries).min(20.0) * 0.1;
    score.round().clamp(0.0, 100.0) as u32
}

/// Compare the latest window of sessions with the one before it
pub fn weekly_trend(sessions: &[StudySession], completion_rate: f64) -> WeeklyTrend {
    if sessions.is_empty() {
        return WeeklyTrend::Stable;
    }

    let recent = sessions.len().min(TREND_WINDOW);
    let older = sessions.len().saturating_sub(TREND_WINDOW).min(TREND_WINDOW);

    if recent > older && completion_rate > 70.0 {
        WeeklyTrend::Improving
    } else if recent < older || completion_rate < 50.0 {
        WeeklyTrend::Declining
    } else {
        WeeklyTrend::Stable
    }
}

fn insights(input: &EfficiencyInput, overall_score: u32) -> Vec<Insight> {
    use InsightKind::*;
    use Priority::*;

    let mut out = Vec::new();

    if input.study_hours > 20.0 {
        out.push(Insight::new(
            Success,
            Low,
            "🏆",
            "Excellent Study Dedication",
            format!("You've logged {:.1} hours of focused study time.", input.study_hours),
            "Keep maintaining this excellent pace and consider teaching others!",
        ));
    } else if input.study_hours < 5.0 {
        out.push(Insight::new(
            Improvement,
            High,
            "⏰",
            "Increase Study Time",
            "Your study hours are below the recommended weekly target.",
            "Try to aim for at least 1-2 hours of focused study daily.",
        ));
    }

    if input.completion_rate > 80.0 {
        out.push(Insight::new(
            Success,
            Low,
            "✅",
            "Task Completion Champion",
            format!("Outstanding {:.0}% task completion rate!", input.completion_rate),
            "You're excelling at task management. Consider mentoring others!",
        ));
    } else if input.completion_rate < 50.0 {
        out.push(Insight::new(
            Warning,
            High,
            "⚠️",
            "Task Completion Needs Attention",
            "Your task completion rate could be improved.",
            "Break large tasks into smaller chunks and set daily completion goals.",
        ));
    }

    if input.streak_days > 7 {
        out.push(Insight::new(
            Success,
            Low,
            "🔥",
            "Consistency Master",
            format!("Amazing {}-day study streak!", input.streak_days),
            "Your consistency is paying off. Keep this momentum going!",
        ));
    } else if input.streak_days == 0 {
        out.push(Insight::new(
            Improvement,
            Medium,
            "🎯",
            "Build Your Streak",
            "Starting a study streak can boost your motivation.",
            "Commit to just 15 minutes of study today to start your streak.",
        ));
    }

    if input.ai_usage.total_queries > 10 {
        out.push(Insight::new(
            Success,
            Low,
            "🤖",
            "AI Power User",
            "You're effectively leveraging AI tools for learning.",
            "Explore advanced AI features like PDF summarization and study plans.",
        ));
    } else if input.ai_usage.total_queries < 3 {
        out.push(Insight::new(
            Info,
            Medium,
            "✨",
            "Explore AI Features",
            "You haven't fully explored our AI-powered study tools.",
            "Try the flashcard generator and study assistant for enhanced learning.",
        ));
    }

    if overall_score > 80 {
        out.push(Insight::new(
            Success,
            Low,
            "🌟",
            "Outstanding Performance",
            "You're in the top tier of StudyHub users!",
            "Consider sharing your study strategies with the community.",
        ));
    } else if overall_score < 40 {
        out.push(Insight::new(
            Improvement,
            High,
            "📈",
            "Room for Growth",
            "There's significant potential to improve your study efficiency.",
            "Focus on building consistent daily habits and using the Pomodoro timer.",
        ));
    }

    out.truncate(MAX_INSIGHTS);
    out
}

fn strengths_and_focus_areas(input: &EfficiencyInput) -> (Vec<String>, Vec<String>) {
    let subjects = input.subjects.len();
    let queries = input.ai_usage.total_queries;

    let strengths: Vec<String> = [
        (input.completion_rate > 75.0, "Excellent task completion"),
        (input.study_hours > 15.0, "Strong time commitment"),
        (input.streak_days > 5, "Consistent daily habits"),
        (subjects > 3, "Diverse subject engagement"),
        (queries > 8, "Effective AI tool usage"),
    ]
    .into_iter()
    .filter_map(|(hit, text)| hit.then(|| text.to_string()))
    .collect();

    let focus_areas: Vec<String> = [
        (input.completion_rate < 60.0, "Task completion efficiency"),
        (input.study_hours < 8.0, "Study time consistency"),
        (input.streak_days < 3, "Daily habit formation"),
        (subjects < 2, "Subject diversity"),
        (queries < 5, "AI tool exploration"),
    ]
    .into_iter()
    .filter_map(|(hit, text)| hit.then(|| text.to_string()))
    .collect();

    let strengths = if strengths.is_empty() {
        vec![
            "Building foundation skills".to_string(),
            "Getting started with learning".to_string(),
        ]
    } else {
        strengths
    };
    let focus_areas = if focus_areas.is_empty() {
        vec!["Continue current progress".to_string()]
    } else {
        focus_areas
    };
    (strengths, focus_areas)
}

fn recommendations(input: &EfficiencyInput) -> Vec<String> {
    let mut out: Vec<&str> = Vec::new();

    if input.completion_rate < 60.0 {
        out.push("Use the Eisenhower Matrix to prioritize tasks by urgency and importance");
        out.push("Break large tasks into 25-minute Pomodoro sessions");
    }
    if input.study_hours < 10.0 {
        out.push("Schedule specific study blocks in your calendar");
        out.push("Start with 2-hour daily study sessions and gradually increase");
    }
    if input.streak_days < 7 {
        out.push("Set a daily minimum study goal (even 15 minutes counts)");
        out.push("Use habit stacking: study right after an existing habit");
    }

    out.push("Review your progress weekly and adjust strategies");
    out.push("Join study rooms to learn from peers and stay motivated");
    out.push("Use active recall techniques instead of passive reading");

    out.into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(str::to_string)
        .collect()
}

fn predicted_goals(input: &EfficiencyInput) -> Vec<PredictedGoal> {
    let mut goals = Vec::new();

    goals.push(if input.completion_rate > 70.0 {
        PredictedGoal::new(
            "Achieve 90% Task Completion",
            85,
            "2 weeks",
            ["Maintain current pace", "Use time-blocking for better focus"],
        )
    } else {
        PredictedGoal::new(
            "Reach 70% Task Completion",
            75,
            "3 weeks",
            ["Break tasks into smaller chunks", "Set daily completion targets"],
        )
    });

    goals.push(if input.study_hours > 10.0 {
        PredictedGoal::new(
            "Complete 50 Study Hours",
            80,
            "1 month",
            ["Maintain current study schedule", "Track progress daily"],
        )
    } else {
        PredictedGoal::new(
            "Establish 20 Hours/Week Routine",
            70,
            "2 weeks",
            ["Schedule 3-hour daily blocks", "Use Pomodoro technique"],
        )
    });

    if input.streak_days < 7 {
        goals.push(PredictedGoal::new(
            "Build 14-Day Study Streak",
            65,
            "2 weeks",
            ["Study minimum 15 minutes daily", "Set phone reminders"],
        ));
    }

    goals.truncate(MAX_PREDICTED_GOALS);
    goals
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// When and how the user tends to study
pub fn learning_patterns(sessions: &[StudySession], subjects: &[Subject]) -> LearningPatterns {
    let mut hours: BTreeMap<u32, usize> = BTreeMap::new();
    // Insertion order decides ties between days
    let mut days: Vec<(Weekday, usize)> = Vec::new();

    for session in sessions {
        *hours.entry(session.start_time.hour()).or_default() += 1;

        let day = session.start_time.weekday();
        match days.iter_mut().find(|(d, _)| *d == day) {
            Some((_, count)) => *count += 1,
            None => days.push((day, 1)),
        }
    }

    let mut best_hour = 9;
    let mut best = 0;
    for (hour, count) in &hours {
        if *count > best {
            best = *count;
            best_hour = *hour;
        }
    }

    let mut best_day = Weekday::Mon;
    best = 0;
    for (day, count) in &days {
        if *count > best {
            best = *count;
            best_day = *day;
        }
    }

    let average = if sessions.is_empty() {
        0.0
    } else {
        sessions
            .iter()
            .map(|s| f64::from(s.duration_minutes))
            .sum::<f64>()
            / sessions.len() as f64
    };

    LearningPatterns {
        best_study_time: format!("{best_hour}:00"),
        average_session_length: average.round() as u32,
        most_productive_day: weekday_name(best_day).to_string(),
        preferred_subjects: subjects.iter().take(3).map(|s| s.name.clone()).collect(),
        focus_score: (average / FOCUS_SESSION_MINUTES * 100.0).round().min(100.0) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::efficiency::AiUsage;
    use chrono::{DateTime, Local, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Local> {
        // March 2026: the 9th is a Monday
        Local.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn session(day: u32, hour: u32, minutes: u32) -> StudySession {
        StudySession {
            start_time: at(day, hour),
            duration_minutes: minutes,
            subject: None,
        }
    }

    fn subjects(n: usize) -> Vec<Subject> {
        (0..n)
            .map(|i| Subject {
                name: format!("Subject {i}"),
            })
            .collect()
    }

    fn strong_input() -> EfficiencyInput {
        EfficiencyInput {
            study_sessions: Vec::new(),
            study_hours: 30.0,
            completion_rate: 100.0,
            streak_days: 20,
            subjects: subjects(5),
            ai_usage: AiUsage { total_queries: 25 },
        }
    }

    #[test]
    fn test_score_caps_each_component() {
        assert_eq!(overall_score(&strong_input()), 52);
        assert_eq!(overall_score(&EfficiencyInput::default()), 0);
    }

    #[test]
    fn test_weekly_trend() {
        assert_eq!(weekly_trend(&[], 10.0), WeeklyTrend::Stable);

        let few: Vec<_> = (0..3).map(|i| session(10, 8 + i, 30)).collect();
        assert_eq!(weekly_trend(&few, 90.0), WeeklyTrend::Improving);
        assert_eq!(weekly_trend(&few, 60.0), WeeklyTrend::Stable);
        assert_eq!(weekly_trend(&few, 40.0), WeeklyTrend::Declining);

        let full: Vec<_> = (0..14).map(|i| session(10, i, 30)).collect();
        assert_eq!(weekly_trend(&full, 90.0), WeeklyTrend::Stable);
    }

    #[test]
    fn test_strong_user_report() {
        let report = efficiency_report(&strong_input());
        let titles: Vec<_> = report.insights.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Excellent Study Dedication",
                "Task Completion Champion",
                "Consistency Master",
                "AI Power User"
            ]
        );
        assert_eq!(report.focus_areas, vec!["Continue current progress"]);
        assert_eq!(report.strengths.len(), 5);
        assert_eq!(report.recommendations.len(), 3);
        assert_eq!(report.predicted_goals.len(), 2);
        assert_eq!(report.predicted_goals[0].probability, 85);
    }

    #[test]
    fn test_new_user_report() {
        let report = efficiency_report(&EfficiencyInput::default());
        assert_eq!(report.insights.len(), 5);
        assert_eq!(report.insights[0].priority, Priority::High);
        assert_eq!(report.insights.last().map(|i| i.title.as_str()), Some("Room for Growth"));
        assert_eq!(report.recommendations.len(), 5);
        assert_eq!(
            report.strengths,
            vec!["Building foundation skills", "Getting started with learning"]
        );
        let probabilities: Vec<_> = report.predicted_goals.iter().map(|g| g.probability).collect();
        assert_eq!(probabilities, vec![75, 70, 65]);
    }

    #[test]
    fn test_learning_patterns() {
        let sessions = vec![
            session(10, 14, 50),
            session(10, 8, 20),
            session(11, 14, 30),
            session(9, 8, 20),
        ];
        let patterns = learning_patterns(&sessions, &subjects(4));
        // 8:00 and 14:00 tie; the earlier hour wins
        assert_eq!(patterns.best_study_time, "8:00");
        assert_eq!(patterns.most_productive_day, "Tuesday");
        assert_eq!(patterns.average_session_length, 30);
        assert_eq!(patterns.focus_score, 100);
        assert_eq!(patterns.preferred_subjects.len(), 3);
    }

    #[test]
    fn test_learning_patterns_defaults() {
        let patterns = learning_patterns(&[], &[]);
        assert_eq!(patterns.best_study_time, "9:00");
        assert_eq!(patterns.most_productive_day, "Monday");
        assert_eq!(patterns.focus_score, 0);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let json = serde_json::to_value(efficiency_report(&strong_input())).unwrap();
        assert_eq!(json["overallScore"], 52);
        assert_eq!(json["weeklyTrend"], "stable");
        assert_eq!(json["insights"][0]["type"], "success");
        assert!(json["learningPatterns"]["bestStudyTime"].is_string());
    }
}
