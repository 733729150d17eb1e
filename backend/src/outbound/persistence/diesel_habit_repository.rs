//! PostgreSQL-backed `HabitRepository` using Diesel.
//!
//! The log upsert is a single `INSERT .. ON CONFLICT (habit_id, date) DO
//! UPDATE .. RETURNING` statement, so concurrent toggles for the same day
//! serialise on the unique constraint rather than racing a read.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{HabitRepository, HabitRepositoryError};
use crate::domain::{
    Habit, HabitId, HabitLog, LogEntry, MonthFilter, NewHabit, UserId, UserRecord,
};

use super::diesel_basic_error_mapping::{DieselFailure, classify_diesel_error, pool_failure};
use super::models::{HabitLogRow, HabitLogUpsertRow, HabitRow, NewHabitRow, UserUpsertRow};
use super::pool::{DbPool, PoolError};
use super::schema::{habit_logs, habits, users};

/// Diesel implementation of [`HabitRepository`].
#[derive(Clone)]
pub struct DieselHabitRepository {
    pool: DbPool,
}

impl DieselHabitRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> HabitRepositoryError {
    into_port_error(pool_failure(error), None)
}

/// Translate a classified failure; `owner` names the user a habit insert
/// referenced so a foreign-key violation can be reported precisely.
fn into_port_error(failure: DieselFailure, owner: Option<&UserId>) -> HabitRepositoryError {
    match failure {
        DieselFailure::Connection(message) => HabitRepositoryError::connection(message),
        DieselFailure::ForeignKey { constraint } => match owner {
            Some(user_id) => HabitRepositoryError::missing_user(user_id.to_string()),
            None => {
                warn!(?constraint, "unexpected foreign key violation");
                HabitRepositoryError::query("referenced record does not exist")
            }
        },
        DieselFailure::Query(message) => HabitRepositoryError::query(message),
    }
}

fn map_diesel_error(operation: &'static str) -> impl Fn(diesel::result::Error) -> HabitRepositoryError {
    move |error| into_port_error(classify_diesel_error(error, operation), None)
}

fn row_to_habit(row: HabitRow) -> Result<Habit, HabitRepositoryError> {
    let user_id = UserId::new(row.user_id).map_err(|err| {
        warn!(habit_id = row.id, error = %err, "stored habit has malformed owner");
        HabitRepositoryError::query("stored habit has malformed owner")
    })?;
    Ok(Habit {
        id: HabitId::new(row.id),
        user_id,
        name: row.name,
        description: row.description,
        color: row.color,
        target_days: row.target_days,
        created_at: row.created_at,
    })
}

fn row_to_log(row: HabitLogRow) -> HabitLog {
    HabitLog {
        id: row.id,
        habit_id: HabitId::new(row.habit_id),
        date: row.date,
        completed: row.completed,
        notes: row.notes,
    }
}

#[async_trait]
impl HabitRepository for DieselHabitRepository {
    async fn create_habit(&self, habit: NewHabit) -> Result<Habit, HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewHabitRow {
            user_id: habit.user_id.as_ref(),
            name: &habit.name,
            description: habit.description.as_deref(),
            color: &habit.color,
            target_days: habit.target_days,
        };
        let inserted = diesel::insert_into(habits::table)
            .values(&row)
            .returning(HabitRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|error| {
                into_port_error(
                    classify_diesel_error(error, "create_habit"),
                    Some(&habit.user_id),
                )
            })?;
        row_to_habit(inserted)
    }

    async fn list_habits(&self, user_id: &UserId) -> Result<Vec<Habit>, HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<HabitRow> = habits::table
            .filter(habits::user_id.eq(user_id.as_ref()))
            .order(habits::id.asc())
            .select(HabitRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("list_habits"))?;
        rows.into_iter().map(row_to_habit).collect()
    }

    async fn find_habit(&self, id: HabitId) -> Result<Option<Habit>, HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<HabitRow> = habits::table
            .find(id.get())
            .select(HabitRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("find_habit"))?;
        row.map(row_to_habit).transpose()
    }

    async fn delete_habit(&self, id: HabitId) -> Result<bool, HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(habits::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error("delete_habit"))?;
        Ok(removed > 0)
    }

    async fn list_habit_logs(
        &self,
        habit_id: HabitId,
        month: Option<MonthFilter>,
    ) -> Result<Vec<HabitLog>, HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = habit_logs::table
            .select(HabitLogRow::as_select())
            .filter(habit_logs::habit_id.eq(habit_id.get()))
            .into_boxed();
        if let Some(month) = month {
            query = query
                .filter(habit_logs::date.ge(month.first_day()))
                .filter(habit_logs::date.lt(month.next_month_start()));
        }
        let rows: Vec<HabitLogRow> = query
            .order(habit_logs::date.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("list_habit_logs"))?;
        Ok(rows.into_iter().map(row_to_log).collect())
    }

    async fn upsert_habit_log(&self, entry: LogEntry) -> Result<HabitLog, HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = HabitLogUpsertRow {
            habit_id: entry.habit_id.get(),
            date: entry.date,
            completed: entry.completed,
            notes: entry.notes.as_deref(),
        };
        let stored = diesel::insert_into(habit_logs::table)
            .values(&row)
            .on_conflict((habit_logs::habit_id, habit_logs::date))
            .do_update()
            .set((
                habit_logs::completed.eq(excluded(habit_logs::completed)),
                habit_logs::notes.eq(excluded(habit_logs::notes)),
            ))
            .returning(HabitLogRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error("upsert_habit_log"))?;
        Ok(row_to_log(stored))
    }

    async fn list_logs_for_user(
        &self,
        user_id: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HabitLog>, HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<HabitLogRow> = habit_logs::table
            .inner_join(habits::table)
            .filter(habits::user_id.eq(user_id.as_ref()))
            .filter(habit_logs::date.between(from, to))
            .order((habit_logs::date.asc(), habit_logs::habit_id.asc()))
            .select(HabitLogRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("list_logs_for_user"))?;
        Ok(rows.into_iter().map(row_to_log).collect())
    }

    async fn upsert_user(&self, user: &UserRecord) -> Result<(), HabitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = UserUpsertRow {
            id: user.id.as_ref(),
            email: user.email.as_deref(),
            first_name: user.first_name.as_deref(),
            last_name: user.last_name.as_deref(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::id)
            .do_update()
            .set((
                users::email.eq(excluded(users::email)),
                users::first_name.eq(excluded(users::first_name)),
                users::last_name.eq(excluded(users::last_name)),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error("upsert_user"))?;
        Ok(())
    }
}
