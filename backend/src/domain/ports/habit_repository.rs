//! Port for habit and habit-log persistence.
//!
//! Adapters own the `(habit_id, date)` uniqueness guarantee: a log upsert
//! must be a single atomic operation so concurrent toggles for the same day
//! converge on one row.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Habit, HabitId, HabitLog, LogEntry, MonthFilter, NewHabit, UserId, UserRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by habit repository adapters.
    pub enum HabitRepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } =>
            "habit repository connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } =>
            "habit repository query failed: {message}",
        /// The habit references a user that does not exist.
        MissingUser { user_id: String } =>
            "user {user_id} does not exist",
    }
}

/// Persistence contract for habits, their daily logs, and seeded users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HabitRepository: Send + Sync {
    /// Insert a habit and return it with its generated id and timestamp.
    async fn create_habit(&self, habit: NewHabit) -> Result<Habit, HabitRepositoryError>;

    /// All habits owned by `user_id`, in creation order.
    async fn list_habits(&self, user_id: &UserId) -> Result<Vec<Habit>, HabitRepositoryError>;

    async fn find_habit(&self, id: HabitId) -> Result<Option<Habit>, HabitRepositoryError>;

    /// Delete a habit and its logs. Returns `false` when nothing matched.
    async fn delete_habit(&self, id: HabitId) -> Result<bool, HabitRepositoryError>;

    /// Logs of one habit ordered by date, optionally restricted to a month.
    async fn list_habit_logs(
        &self,
        habit_id: HabitId,
        month: Option<MonthFilter>,
    ) -> Result<Vec<HabitLog>, HabitRepositoryError>;

    /// Insert or update the log keyed by `(entry.habit_id, entry.date)`.
    async fn upsert_habit_log(&self, entry: LogEntry) -> Result<HabitLog, HabitRepositoryError>;

    /// Logs of every habit owned by `user_id` dated within `[from, to]`.
    async fn list_logs_for_user(
        &self,
        user_id: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HabitLog>, HabitRepositoryError>;

    /// Insert the user or refresh its profile fields.
    async fn upsert_user(&self, user: &UserRecord) -> Result<(), HabitRepositoryError>;
}
