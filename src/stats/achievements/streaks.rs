//! Streak tracking
//!
//! A streak counts consecutive calendar days (host local time) with at least
//! one recorded activity.

use std::sync::Mutex;

use chrono::{DateTime, Days, Local, NaiveDate, Timelike};

/// Source of the current moment
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Current hour (0-23)
    fn hour(&self) -> u32 {
        self.now().hour()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance_days(&self, days: u64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(next) = now.checked_add_days(Days::new(days)) {
            *now = next;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// How a new activity affects the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Activity already counted today
    SameDay,
    /// Last activity was yesterday
    Extended,
    /// First activity, or the chain was broken
    Reset,
}

/// Classify an activity on `today` given the day of the last one
pub fn classify(last_active_day: Option<NaiveDate>, today: NaiveDate) -> StreakChange {
    let Some(last_day) = last_active_day else {
        return StreakChange::Reset;
    };

    if last_day == today {
        StreakChange::SameDay
    } else if today.pred_opt() == Some(last_day) {
        StreakChange::Extended
    } else {
        StreakChange::Reset
    }
}

/// Streak value after an activity on `today`
pub fn next_streak(current: u32, last_active_day: Option<NaiveDate>, today: NaiveDate) -> (StreakChange, u32) {
    let change = classify(last_active_day, today);
    let value = match change {
        StreakChange::SameDay => current,
        StreakChange::Extended => current.saturating_add(1),
        StreakChange::Reset => 1,
    };
    (change, value)
}
