//! Internal Diesel row structs.
//!
//! These never leave the persistence module; repositories convert them to
//! domain types at the boundary.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{habit_logs, habits, users};

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpsertRow<'a> {
    pub id: &'a str,
    pub email: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = habits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HabitRow {
    pub id: i32,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub target_days: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = habits)]
pub(crate) struct NewHabitRow<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub color: &'a str,
    pub target_days: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = habit_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HabitLogRow {
    pub id: i32,
    pub habit_id: i32,
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = habit_logs)]
pub(crate) struct HabitLogUpsertRow<'a> {
    pub habit_id: i32,
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: Option<&'a str>,
}
