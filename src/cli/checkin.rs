//! Check-in command implementation

use anyhow::Result;

use studyhub::config::Config;
use studyhub::stats::{ProgressionEngine, ProgressionEvent};

/// Count today's activity towards the user's streak
pub async fn checkin_command(config: &Config, user_id: &str) -> Result<()> {
    let engine = ProgressionEngine::open(config)?;
    let _events = engine.subscribe(print_event);

    let streak = engine.update_streak(user_id).await;
    println!("Streak: {} day(s)", streak);

    Ok(())
}

/// Print a progression event as it happens
pub fn print_event(event: &ProgressionEvent) {
    match event {
        ProgressionEvent::AchievementUnlocked { achievement, .. } => {
            println!(
                "  {} Unlocked: {} (+{} XP)",
                achievement.icon, achievement.name, achievement.xp_reward
            );
        }
        ProgressionEvent::LevelUp { new_level, .. } => {
            println!("  Level up! Now level {}", new_level);
        }
        ProgressionEvent::BadgeAwarded { badge_id, .. } => {
            println!("  Badge earned: {}", badge_id);
        }
    }
}
