//! Shared test utilities for progression tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeZone};

use studyhub::stats::{
    FixedClock, MemoryCache, MemoryStore, ProgressionEngine, ProgressionEvent, StatsRepository,
    Subscription,
};

/// Engine over in-memory storage with a manually driven clock
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub clock: Arc<FixedClock>,
    pub engine: ProgressionEngine,
}

/// Local time on a March 2026 day
pub fn local(day: u32, hour: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 3, day, hour, 0, 0)
        .single()
        .expect("Unambiguous local time")
}

/// Harness whose clock starts at noon on 2026-03-10
pub fn harness() -> Harness {
    harness_at(local(10, 12))
}

pub fn harness_at(now: DateTime<Local>) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());
    let clock = Arc::new(FixedClock::new(now));
    let repo = StatsRepository::new(store.clone(), cache.clone());
    let engine = ProgressionEngine::new(repo, clock.clone());
    Harness {
        store,
        cache,
        clock,
        engine,
    }
}

/// Collect every event the engine emits while the subscription is alive
pub fn record_events(engine: &ProgressionEngine) -> (Arc<Mutex<Vec<ProgressionEvent>>>, Subscription) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let subscription = engine.subscribe(move |event| {
        sink.lock().expect("event sink lock").push(event.clone());
    });
    (events, subscription)
}
