//! Concurrent writes against the on-disk document store

use std::sync::Arc;

use tempfile::TempDir;

use studyhub::stats::{DocumentStore, SqliteStore, USER_SOCIAL, USER_STATS};

fn open_store() -> (TempDir, Arc<SqliteStore>) {
    let dir = TempDir::new().expect("tempdir");
    let store = SqliteStore::open(&dir.path().join("stats.db")).expect("open store");
    (dir, Arc::new(store))
}

#[tokio::test]
async fn test_concurrent_increments_are_not_lost() {
    let (_dir, store) = open_store();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .increment(USER_STATS, "u1", "tasksCompleted", 1.0)
                .await
                .expect("increment")
        }));
    }
    for handle in handles {
        handle.await.expect("join");
    }

    let doc = store.get(USER_STATS, "u1").await.expect("get").expect("document");
    assert_eq!(doc["tasksCompleted"], serde_json::json!(20));
}

#[tokio::test]
async fn test_concurrent_set_additions_stay_distinct() {
    let (_dir, store) = open_store();

    let mut handles = Vec::new();
    for i in 0..10 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let room = format!("room-{}", i % 5);
            store
                .add_to_set(USER_SOCIAL, "u1", "roomsJoined", &room)
                .await
                .expect("add_to_set")
        }));
    }
    for handle in handles {
        handle.await.expect("join");
    }

    let doc = store.get(USER_SOCIAL, "u1").await.expect("get").expect("document");
    assert_eq!(doc["roomsJoined"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn test_reopen_keeps_documents() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("stats.db");

    {
        let store = SqliteStore::open(&path).expect("open store");
        store
            .set(USER_STATS, "u1", serde_json::json!({"xp": 1200, "level": 2}))
            .await
            .expect("set");
    }

    let store = SqliteStore::open(&path).expect("reopen store");
    let doc = store.get(USER_STATS, "u1").await.expect("get").expect("document");
    assert_eq!(doc["xp"], serde_json::json!(1200));
}
