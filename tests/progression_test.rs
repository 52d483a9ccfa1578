//! Integration tests for the progression engine and activity recorders

mod common;

use serde_json::json;

use std::sync::Arc;

use common::{harness, harness_at, local, record_events};
use studyhub::stats::achievements::{AchievementDef, CATALOGUE_VERSION, FixedClock, level_for_xp};
use studyhub::stats::{
    Counter, DocumentStore, FileCache, LocalCache, MemoryStore, ProgressOutcome, ProgressionEngine,
    ProgressionEvent, StatsRepository, USER_STATS, UnlockOutcome,
};

#[tokio::test]
async fn test_level_tracks_xp_across_operations() {
    let h = harness();
    let engine = &h.engine;

    for amount in [0, 949, 1, 999, 1, 2500] {
        let award = engine.add_xp("u1", amount).await;
        assert_eq!(award.new_level, level_for_xp(award.new_xp));
    }
    engine.recorder().study_session("u1", 300).await;
    engine.unlock_achievement("u1", "knowledge-god").await;

    let stats = engine.get_or_init_stats("u1").await;
    assert_eq!(stats.level, level_for_xp(stats.xp));
    let stored = h.store.peek(USER_STATS, "u1").expect("stored record");
    assert_eq!(stored["level"], json!(stats.level));
}

#[tokio::test]
async fn test_xp_is_additive() {
    let h = harness();
    let before = h.engine.get_or_init_stats("u1").await.xp;

    h.engine.add_xp("u1", 40).await;
    let award = h.engine.add_xp("u1", 60).await;
    assert_eq!(award.new_xp, before + 100);

    // Same amount twice is two grants, not one
    h.engine.add_xp("u1", 60).await;
    assert_eq!(h.engine.get_or_init_stats("u1").await.xp, before + 160);
}

#[tokio::test]
async fn test_unlock_twice_changes_nothing_the_second_time() {
    let h = harness();
    let (events, _sub) = record_events(&h.engine);

    assert!(h.engine.unlock_achievement("u1", "week-warrior").await.is_unlocked());
    let after_first = h.engine.get_or_init_stats("u1").await;

    assert_eq!(
        h.engine.unlock_achievement("u1", "week-warrior").await,
        UnlockOutcome::AlreadyEarned
    );
    let after_second = h.engine.get_or_init_stats("u1").await;

    assert_eq!(after_first, after_second);
    assert_eq!(after_second.xp, 50 + 150);
    let unlocks = events
        .lock()
        .expect("events")
        .iter()
        .filter(|e| matches!(e, ProgressionEvent::AchievementUnlocked { .. }))
        .count();
    assert_eq!(unlocks, 1);
}

#[tokio::test]
async fn test_progress_is_clamped_to_target() {
    let h = harness();
    assert_eq!(
        h.engine.update_achievement_progress("u1", "week-warrior", 9).await,
        ProgressOutcome::Updated(7)
    );
    let stats = h.engine.get_or_init_stats("u1").await;
    let week = stats.achievement("week-warrior").expect("catalogue entry");
    assert_eq!(week.progress, Some(7));
    assert!(!week.earned);
}

#[tokio::test]
async fn test_streak_same_day_is_idempotent() {
    let h = harness();
    assert_eq!(h.engine.update_streak("u1").await, 1);
    let first = h.engine.get_or_init_stats("u1").await;

    h.clock.set(local(10, 23));
    assert_eq!(h.engine.update_streak("u1").await, 1);
    let second = h.engine.get_or_init_stats("u1").await;
    assert_eq!(first.last_active, second.last_active);
}

#[tokio::test]
async fn test_streak_continues_and_resets() {
    let h = harness();
    h.engine.update_streak("u1").await;

    h.clock.set(local(11, 8));
    assert_eq!(h.engine.update_streak("u1").await, 2);
    h.clock.set(local(12, 22));
    assert_eq!(h.engine.update_streak("u1").await, 3);

    // Skipped the 13th
    h.clock.set(local(14, 9));
    assert_eq!(h.engine.update_streak("u1").await, 1);
}

#[tokio::test]
async fn test_last_active_in_the_future_resets_streak() {
    let h = harness();
    h.engine.get_or_init_stats("u1").await;
    let mut fields = serde_json::Map::new();
    fields.insert("streak".to_string(), json!(5));
    fields.insert("lastActive".to_string(), json!("2026-03-20T12:00:00Z"));
    h.store.merge(USER_STATS, "u1", fields).await.expect("merge");

    assert_eq!(h.engine.update_streak("u1").await, 1);
}

#[tokio::test]
async fn test_first_completed_task() {
    let h = harness();
    let (events, _sub) = record_events(&h.engine);

    let summary = h.engine.recorder().task_completed("u1").await;

    let stats = h.engine.get_or_init_stats("u1").await;
    assert_eq!(stats.tasks_completed, 1);
    assert_eq!(stats.xp, 50 + 25 + 25);
    assert!(stats.is_earned("first-task"));
    assert_eq!(summary.unlocked.len(), 1);

    let events = events.lock().expect("events");
    assert!(matches!(
        &events[..],
        [ProgressionEvent::AchievementUnlocked { achievement, .. }] if achievement.id == "first-task"
    ));
}

#[tokio::test]
async fn test_single_long_session_unlocks_focused_mind() {
    let h = harness();
    h.engine.recorder().study_session("u1", 125).await;

    let stats = h.engine.get_or_init_stats("u1").await;
    assert!(stats.is_earned("focused-mind"));
    assert!(!stats.is_earned("focus-master"));
    assert!((stats.study_hours - 125.0 / 60.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_short_sessions_never_unlock_focused_mind() {
    let h = harness();
    for _ in 0..3 {
        h.engine.recorder().study_session("u1", 60).await;
    }
    let stats = h.engine.get_or_init_stats("u1").await;
    assert!(stats.is_earned("first-study"));
    assert!(!stats.is_earned("focused-mind"));
}

#[tokio::test]
async fn test_record_without_achievements_is_healed() {
    let h = harness();
    h.store
        .set(
            USER_STATS,
            "u1",
            json!({"xp": 500, "level": 1, "tasksCompleted": 12, "achievements": []}),
        )
        .await
        .expect("seed document");

    let stats = h.engine.get_or_init_stats("u1").await;
    assert_eq!(stats.achievements.len(), AchievementDef::total_count());
    assert_eq!(stats.xp, 500);
    assert_eq!(stats.tasks_completed, 12);

    let stored = h.store.peek(USER_STATS, "u1").expect("stored record");
    assert_eq!(
        stored["achievements"].as_array().map(Vec::len),
        Some(AchievementDef::total_count())
    );
}

#[tokio::test]
async fn test_older_catalogue_gains_new_rows() {
    let h = harness();
    let mut stats = h.engine.get_or_init_stats("u1").await;
    stats.achievements.retain(|a| a.id != "social-butterfly");
    stats.catalogue_version = CATALOGUE_VERSION - 1;
    h.store
        .set(USER_STATS, "u1", serde_json::to_value(&stats).expect("serialize"))
        .await
        .expect("store document");

    let healed = h.engine.get_or_init_stats("u1").await;
    assert!(healed.achievement("social-butterfly").is_some());
    assert_eq!(healed.catalogue_version, CATALOGUE_VERSION);

    let stored = h.store.peek(USER_STATS, "u1").expect("stored record");
    assert_eq!(stored["catalogueVersion"], json!(CATALOGUE_VERSION));
}

#[tokio::test]
async fn test_current_catalogue_record_is_left_alone() {
    let h = harness();
    let mut stats = h.engine.get_or_init_stats("u1").await;
    stats.achievements.retain(|a| a.id != "social-butterfly");
    let doc = serde_json::to_value(&stats).expect("serialize");
    h.store.set(USER_STATS, "u1", doc.clone()).await.expect("store document");

    let loaded = h.engine.get_or_init_stats("u1").await;
    assert!(loaded.achievement("social-butterfly").is_none());
    assert_eq!(h.store.peek(USER_STATS, "u1"), Some(doc));
}

#[tokio::test]
async fn test_stale_level_is_repaired_on_read() {
    let h = harness();
    h.store
        .set(USER_STATS, "u1", json!({"xp": 2500, "level": 1, "achievements": []}))
        .await
        .expect("seed document");

    let stats = h.engine.get_or_init_stats("u1").await;
    assert_eq!(stats.xp, 2500);
    assert_eq!(stats.level, 3);

    let stored = h.store.peek(USER_STATS, "u1").expect("stored record");
    assert_eq!(stored["level"], json!(3));
}

#[tokio::test]
async fn test_offline_seed_is_saved_when_store_returns() {
    let h = harness();
    h.store.set_offline(true);
    let seed = h.engine.get_or_init_stats("u2").await;
    h.store.set_offline(false);

    h.engine
        .repository()
        .add("u2", &seed, Counter::TasksCompleted, 1.0)
        .await;

    let stats = h.engine.get_or_init_stats("u2").await;
    assert_eq!(stats.xp, 50);
    assert_eq!(stats.tasks_completed, 1);
    assert!(stats.is_earned("first-steps"));
}

#[tokio::test]
async fn test_file_cache_keeps_similar_user_ids_apart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(FileCache::open(dir.path()).expect("file cache"));
    let clock = Arc::new(FixedClock::new(local(10, 12)));
    let engine = ProgressionEngine::new(StatsRepository::new(store.clone(), cache), clock);

    engine.add_xp("bob.smith", 5000).await;
    engine.get_or_init_stats("bob_smith").await;
    store.set_offline(true);

    assert_eq!(engine.get_or_init_stats("bob_smith").await.xp, 50);
    assert_eq!(engine.get_or_init_stats("bob.smith").await.xp, 5050);
}

#[tokio::test]
async fn test_offline_store_writes_to_cache_only() {
    let h = harness();
    h.engine.recorder().task_completed("u1").await;
    let stored_before = h.store.peek(USER_STATS, "u1").expect("stored record");

    h.store.set_offline(true);
    let summary = h.engine.recorder().task_completed("u1").await;
    assert_eq!(summary.stats.tasks_completed, 2);
    assert_eq!(summary.stats.xp, 100 + 25);

    let cached = h
        .cache
        .read("userStats_u1")
        .expect("cache read")
        .expect("cached record");
    assert_eq!(cached["tasksCompleted"], json!(2));
    assert_eq!(h.store.peek(USER_STATS, "u1"), Some(stored_before));
}

#[tokio::test]
async fn test_offline_new_user_gets_unpersisted_seed() {
    let h = harness();
    h.store.set_offline(true);

    let stats = h.engine.get_or_init_stats("ghost").await;
    assert_eq!(stats.xp, 50);
    assert!(h.store.peek(USER_STATS, "ghost").is_none());
}

#[tokio::test]
async fn test_corrupt_cache_is_treated_as_absent() {
    let h = harness();
    h.cache
        .write("userStats_u1", &json!({"xp": "lots"}))
        .expect("cache write");
    h.store.set_offline(true);

    let stats = h.engine.get_or_init_stats("u1").await;
    assert_eq!(stats.xp, 50);
    assert!(stats.is_earned("first-steps"));
}

#[tokio::test]
async fn test_unknown_ids_are_no_ops() {
    let h = harness();
    let before = h.engine.get_or_init_stats("u1").await;

    assert_eq!(
        h.engine.unlock_achievement("u1", "moon-landing").await,
        UnlockOutcome::UnknownId
    );
    assert_eq!(
        h.engine.update_achievement_progress("u1", "moon-landing", 3).await,
        ProgressOutcome::UnknownId
    );
    assert_eq!(h.engine.get_or_init_stats("u1").await, before);
}

#[tokio::test]
async fn test_dropped_subscription_stops_receiving() {
    let h = harness();
    let (events, sub) = record_events(&h.engine);

    h.engine.award_badge("u1", "helper").await;
    drop(sub);
    h.engine.award_badge("u1", "mentor").await;

    let events = events.lock().expect("events");
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        ProgressionEvent::BadgeAwarded { badge_id, .. } if badge_id == "helper"
    ));
    assert_eq!(h.engine.events().listener_count(), 0);
}

#[tokio::test]
async fn test_big_unlock_emits_level_up() {
    let h = harness();
    let (events, _sub) = record_events(&h.engine);

    h.engine.unlock_achievement("u1", "ultimate-scholar").await;

    let stats = h.engine.get_or_init_stats("u1").await;
    assert_eq!(stats.xp, 5050);
    assert_eq!(stats.level, 6);
    let events = events.lock().expect("events");
    assert!(events.iter().any(|e| matches!(
        e,
        ProgressionEvent::LevelUp {
            old_level: 1,
            new_level: 6,
            ..
        }
    )));
}

#[tokio::test]
async fn test_engines_do_not_share_listeners() {
    let a = harness();
    let b = harness_at(local(10, 12));
    let (events, _sub) = record_events(&a.engine);

    b.engine.unlock_achievement("u1", "first-task").await;
    assert!(events.lock().expect("events").is_empty());
}
