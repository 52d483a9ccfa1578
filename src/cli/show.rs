//! Show command implementation

use anyhow::Result;

use studyhub::config::Config;
use studyhub::stats::{Achievement, LevelProgress, ProgressionEngine, UserStats};

/// Print a user's progression record
pub async fn show_command(config: &Config, user_id: &str, json: bool) -> Result<()> {
    let engine = ProgressionEngine::open(config)?;
    let stats = engine.get_or_init_stats(user_id).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    print_summary(user_id, &stats);
    Ok(())
}

fn print_summary(user_id: &str, stats: &UserStats) {
    let progress = LevelProgress::for_xp(stats.xp);

    println!("{}\n", user_id);
    println!(
        "  Level {}  ({} XP, {} to next level, {:.0}%)",
        progress.level,
        stats.xp,
        progress.xp_to_next,
        progress.progress_to_next() * 100.0
    );
    println!("  Streak: {} day(s)", stats.streak);
    println!(
        "  Tasks: {}  Study hours: {:.1}  Flashcards: {}",
        stats.tasks_completed, stats.study_hours, stats.flashcards_created
    );

    if !stats.badges.is_empty() {
        let badges: Vec<_> = stats.badges.iter().map(String::as_str).collect();
        println!("  Badges: {}", badges.join(", "));
    }

    println!(
        "\nAchievements ({}/{}):",
        stats.earned_count(),
        stats.achievements.len()
    );
    for (rarity, earned, total) in stats.rarity_breakdown() {
        println!("  {:<10} {}/{}", rarity.as_str(), earned, total);
    }

    println!();
    for achievement in &stats.achievements {
        println!("{}", achievement_line(achievement));
    }
}

fn achievement_line(achievement: &Achievement) -> String {
    let mark = if achievement.earned { "x" } else { " " };
    let progress = match (achievement.progress, achievement.max_progress) {
        (Some(p), Some(max)) if !achievement.earned => format!(" ({}/{})", p, max),
        _ => String::new(),
    };
    format!(
        "  [{}] {} {:<8} {}{}",
        mark,
        achievement.icon,
        achievement.category.label(),
        achievement.name,
        progress
    )
}
