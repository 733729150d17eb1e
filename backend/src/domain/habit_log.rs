//! Daily completion records.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::HabitId;

/// One day's record for a habit. At most one exists per `(habit_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HabitLog {
    #[schema(example = 1)]
    pub id: i32,
    pub habit_id: HabitId,
    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub date: NaiveDate,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Desired state of a habit's log for one day, as written by an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
}
