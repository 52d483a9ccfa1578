//! Record command implementation

use anyhow::Result;
use clap::Subcommand;

use studyhub::config::Config;
use studyhub::stats::{ProgressionEngine, RecordSummary};

use super::checkin::print_event;

/// Study-app events that can be recorded from the command line
#[derive(Debug, Clone, Subcommand)]
pub enum RecordEvent {
    /// A task was completed
    TaskCompleted,

    /// A task was created
    TaskCreated,

    /// A study session finished
    Study {
        /// Session length in minutes
        minutes: u32,
    },

    /// Flashcards were created
    Flashcards {
        /// Number of new flashcards
        #[arg(default_value_t = 1)]
        count: u32,
    },

    /// An AI feature was used
    AiFeature {
        /// Feature identifier, e.g. "summarize"
        feature: String,
    },

    /// A study room was joined
    RoomJoined {
        /// Room identifier
        room: String,
    },
}

/// Record one event for a user and print what it changed
pub async fn record_command(config: &Config, user_id: &str, event: RecordEvent, json: bool) -> Result<()> {
    let engine = ProgressionEngine::open(config)?;
    let _events = (!json).then(|| engine.subscribe(print_event));

    let recorder = engine.recorder();
    let summary = match event {
        RecordEvent::TaskCompleted => recorder.task_completed(user_id).await,
        RecordEvent::TaskCreated => recorder.task_created(user_id).await,
        RecordEvent::Study { minutes } => recorder.study_session(user_id, minutes).await,
        RecordEvent::Flashcards { count } => recorder.flashcards_created(user_id, count).await,
        RecordEvent::AiFeature { feature } => recorder.ai_feature_used(user_id, &feature).await,
        RecordEvent::RoomJoined { room } => recorder.study_room_joined(user_id, &room).await,
    };

    if json {
        print_json(&summary)?;
    } else {
        println!(
            "+{} XP  (total {} XP, level {})",
            summary.xp_awarded, summary.stats.xp, summary.stats.level
        );
    }
    Ok(())
}

fn print_json(summary: &RecordSummary) -> Result<()> {
    let unlocked: Vec<_> = summary.unlocked.iter().map(|a| a.id.as_str()).collect();
    let value = serde_json::json!({
        "xpAwarded": summary.xp_awarded,
        "unlocked": unlocked,
        "xp": summary.stats.xp,
        "level": summary.stats.level,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
