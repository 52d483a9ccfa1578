//! In-process progression notifications
//!
//! Each [`ProgressionEngine`](super::ProgressionEngine) owns one [`EventBus`].
//! Listeners are registered with [`EventBus::subscribe`] and stay registered
//! for as long as the returned [`Subscription`] is alive.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::stats::models::Achievement;

/// Something noteworthy that happened to a user's progression
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressionEvent {
    AchievementUnlocked {
        user_id: String,
        achievement: Achievement,
    },
    LevelUp {
        user_id: String,
        old_level: u32,
        new_level: u32,
    },
    BadgeAwarded {
        user_id: String,
        badge_id: String,
    },
}

type Listener = Arc<dyn Fn(&ProgressionEvent) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

fn lock(inner: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

/// Fan-out of progression events to registered listeners
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<Listeners>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every event
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ProgressionEvent) + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.inner);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));

        Subscription {
            id: Some(id),
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Register a listener that only sees achievement unlocks
    pub fn on_achievement_unlocked<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Achievement) + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if let ProgressionEvent::AchievementUnlocked { achievement, .. } = event {
                listener(achievement);
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub(crate) fn emit(&self, event: ProgressionEvent) {
        // Listeners run outside the lock so they may unsubscribe themselves
        let snapshot: Vec<Listener> = lock(&self.inner)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle to a registered listener; dropping it unsubscribes
#[must_use = "dropping a Subscription immediately removes the listener"]
#[derive(Debug)]
pub struct Subscription {
    id: Option<u64>,
    bus: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    /// Keep the listener registered for the lifetime of the bus
    pub fn detach(mut self) {
        self.id = None;
    }

    fn remove(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(inner) = self.bus.upgrade() {
            lock(&inner).entries.retain(|(entry_id, _)| *entry_id != id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn level_up() -> ProgressionEvent {
        ProgressionEvent::LevelUp {
            user_id: "u1".to_string(),
            old_level: 1,
            new_level: 2,
        }
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(level_up());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        sub.unsubscribe();
        bus.emit(level_up());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_drop_unsubscribes_and_detach_keeps() {
        let bus = EventBus::new();
        {
            let _sub = bus.subscribe(|_| {});
            assert_eq!(bus.listener_count(), 1);
        }
        assert_eq!(bus.listener_count(), 0);

        bus.subscribe(|_| {}).detach();
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_achievement_filter_ignores_other_events() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = bus.on_achievement_unlocked(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(level_up());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
