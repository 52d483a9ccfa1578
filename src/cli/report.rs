//! Report command implementation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use studyhub::config::Config;
use studyhub::stats::ProgressionEngine;
use studyhub::stats::efficiency::{
    EfficiencyInput, EfficiencyReport, StudyInsights, TaskSummary, efficiency_report,
    efficiency_tips, profile_insights,
};

/// Input file: the efficiency input plus an optional task list
#[derive(Debug, Deserialize)]
struct ReportFile {
    #[serde(flatten)]
    input: EfficiencyInput,
    #[serde(default)]
    tasks: Vec<TaskSummary>,
}

/// Print an efficiency report for the activity in `input_path`.
///
/// With `user_id`, also prints profile insights for that user's record.
pub async fn report_command(config: &Config, input_path: &Path, user_id: Option<&str>, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read report input: {}", input_path.display()))?;
    let file: ReportFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse report input: {}", input_path.display()))?;

    let report = efficiency_report(&file.input);
    let tips = efficiency_tips(file.input.completion_rate, file.input.study_hours);

    let insights = match user_id {
        Some(user_id) => {
            let engine = ProgressionEngine::open(config)?;
            let stats = engine.get_or_init_stats(user_id).await;
            Some(profile_insights(&stats, &file.tasks, file.input.study_hours))
        }
        None => None,
    };

    if json {
        let value = serde_json::json!({
            "report": report,
            "tips": tips,
            "profile": insights,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_report(&report);
    println!("\nTips:");
    for tip in &tips {
        println!("  - {}", tip);
    }
    if let Some(insights) = &insights {
        print_insights(insights);
    }
    Ok(())
}

fn print_report(report: &EfficiencyReport) {
    println!(
        "Efficiency score: {}/100  (trend: {:?})",
        report.overall_score, report.weekly_trend
    );

    if !report.insights.is_empty() {
        println!("\nInsights:");
        for insight in &report.insights {
            println!("  {} {} - {}", insight.icon, insight.title, insight.description);
            println!("      {}", insight.recommendation);
        }
    }

    println!("\nStrengths: {}", report.strengths.join(", "));
    println!("Focus areas: {}", report.focus_areas.join(", "));

    println!("\nRecommendations:");
    for rec in &report.recommendations {
        println!("  - {}", rec);
    }

    println!("\nGoals:");
    for goal in &report.predicted_goals {
        println!(
            "  {} ({}% within {})",
            goal.title, goal.probability, goal.timeframe
        );
    }

    let patterns = &report.learning_patterns;
    println!(
        "\nPatterns: best time {}, most productive on {}, average session {} min, focus {}",
        patterns.best_study_time,
        patterns.most_productive_day,
        patterns.average_session_length,
        patterns.focus_score
    );
}

fn print_insights(insights: &StudyInsights) {
    println!("\nProfile score: {}/100", insights.overall_score);
    println!("{}", insights.motivational_message);
    println!("  Strengths: {}", insights.strengths.join(", "));
    if !insights.weaknesses.is_empty() {
        println!("  Weaknesses: {}", insights.weaknesses.join(", "));
    }
    println!("  Focus areas: {}", insights.focus_areas.join(", "));
    for rec in &insights.recommendations {
        println!("  - {}", rec);
    }
}
