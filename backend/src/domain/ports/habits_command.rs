//! Driving port for habit mutations.
//!
//! Every operation is scoped to the calling user: habits owned by someone
//! else are reported as not found.

use async_trait::async_trait;

use crate::domain::{Error, Habit, HabitId, HabitLog, LogEntry, NewHabit, UserId};

/// Request to record one day's outcome for a habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDayRequest {
    /// The caller; must own `entry.habit_id`.
    pub user_id: UserId,
    pub entry: LogEntry,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HabitsCommand: Send + Sync {
    /// Persist a validated habit for `habit.user_id`.
    async fn create_habit(&self, habit: NewHabit) -> Result<Habit, Error>;

    /// Delete one of the caller's habits together with its logs.
    async fn delete_habit(&self, user_id: &UserId, habit_id: HabitId) -> Result<(), Error>;

    /// Insert or update the caller's log for `(habit, date)`.
    async fn log_day(&self, request: LogDayRequest) -> Result<HabitLog, Error>;
}
