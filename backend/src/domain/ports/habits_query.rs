//! Driving port for habit reads and analytics.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{AnalyticsReport, Error, Habit, HabitId, HabitLog, MonthFilter, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HabitsQuery: Send + Sync {
    async fn list_habits(&self, user_id: &UserId) -> Result<Vec<Habit>, Error>;

    /// Fetch one of the caller's habits; foreign habits are not found.
    async fn get_habit(&self, user_id: &UserId, habit_id: HabitId) -> Result<Habit, Error>;

    /// Logs of one of the caller's habits, optionally restricted to a month.
    async fn list_logs(
        &self,
        user_id: &UserId,
        habit_id: HabitId,
        month: Option<MonthFilter>,
    ) -> Result<Vec<HabitLog>, Error>;

    /// Streak, rates, chart series and per-habit progress as of `today`.
    async fn analytics(&self, user_id: &UserId, today: NaiveDate) -> Result<AnalyticsReport, Error>;
}
