//! Habits: the recurring activities a user tracks day by day.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Colour assigned when a habit is created without one.
pub const DEFAULT_HABIT_COLOR: &str = "#4F46E5";
/// Target assigned when a habit is created without one.
pub const DEFAULT_TARGET_DAYS: i32 = 30;
/// Maximum length of a habit name, in characters.
pub const HABIT_NAME_MAX: usize = 100;

/// Database-assigned habit identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = i32, example = 1)]
pub struct HabitId(i32);

impl HabitId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated request to create a habit.
///
/// Defaults are already applied; adapters persist the values verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabit {
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub target_days: i32,
}

/// A persisted habit.
///
/// ## Invariants
/// - `target_days > 0`.
/// - `name` is non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub user_id: UserId,
    #[schema(example = "Drink Water")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schema(example = "#3B82F6")]
    pub color: String,
    #[schema(example = 30)]
    pub target_days: i32,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Whether `user_id` owns this habit.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
