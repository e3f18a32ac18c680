//! Contiguous-day reading streaks.
//!
//! A streak counts consecutive calendar days with at least one reading
//! event. Only the calendar date participates; time of day is discarded by
//! the caller before it reaches this module.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StreakError;

/// Per-user streak counters.
///
/// `longest_streak >= current_streak` holds for every value returned by
/// [`record_reading`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_read_date: Option<NaiveDate>,
}

/// How a reading event moved the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
    /// First reading ever recorded
    Started,
    /// Another read on the same day
    Held,
    /// Read on the day after the last one
    Extended,
    /// Gap of two or more days
    Restarted,
}

impl StreakState {
    /// Whether the streak is still alive on `today`: the last read was today
    /// or yesterday.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        match self.last_read_date {
            Some(last) => matches!((today - last).num_days(), 0 | 1),
            None => false,
        }
    }

    /// Streak value to show on `today`.
    ///
    /// The stored counter only resets on the next reading event, so a user
    /// who stopped reading still has a stale `current_streak`. This reports 0
    /// for such a streak without touching the state.
    pub fn displayed(&self, today: NaiveDate) -> u32 {
        if self.is_active(today) {
            self.current_streak
        } else {
            0
        }
    }
}

/// Classify the reading event on `today` against `state`.
///
/// # Errors
/// Returns [`StreakError::NonMonotonicDate`] if `today` precedes the last
/// recorded reading date.
pub fn classify(state: &StreakState, today: NaiveDate) -> Result<StreakTransition, StreakError> {
    let Some(last_read) = state.last_read_date else {
        return Ok(StreakTransition::Started);
    };

    match (today - last_read).num_days() {
        delta if delta < 0 => Err(StreakError::NonMonotonicDate { last_read, today }),
        0 => Ok(StreakTransition::Held),
        1 => Ok(StreakTransition::Extended),
        _ => Ok(StreakTransition::Restarted),
    }
}

/// Apply a reading event on `today` and return the new state.
///
/// Calling this twice with the same `today` yields the same counters as
/// calling it once. `state` is never modified; persisting the result is the
/// caller's job.
///
/// # Errors
/// Returns [`StreakError::NonMonotonicDate`] if `today` precedes
/// `state.last_read_date`.
pub fn record_reading(state: &StreakState, today: NaiveDate) -> Result<StreakState, StreakError> {
    let transition = classify(state, today)?;

    let current_streak = match transition {
        StreakTransition::Started | StreakTransition::Restarted => 1,
        StreakTransition::Held => state.current_streak,
        StreakTransition::Extended => state.current_streak.saturating_add(1),
    };

    debug!(
        ?transition,
        before = state.current_streak,
        after = current_streak,
        %today,
        "streak updated"
    );

    Ok(StreakState {
        current_streak,
        longest_streak: state.longest_streak.max(current_streak),
        last_read_date: Some(today),
    })
}
