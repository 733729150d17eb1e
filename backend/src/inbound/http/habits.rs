//! Habit and habit-log HTTP handlers.
//!
//! ```text
//! GET    /api/habits?userId=
//! POST   /api/habits
//! GET    /api/habits/{id}
//! DELETE /api/habits/{id}
//! GET    /api/habits/{id}/logs?month=YYYY-MM
//! POST   /api/habits/{id}/logs
//! ```
//!
//! Every handler resolves the caller before touching the ports, so a request
//! without an identity is rejected with `401` and never reaches storage.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::LogDayRequest;
use crate::domain::validation::{HabitDraft, new_habit};
use crate::domain::{Error, Habit, HabitLog, LogEntry};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    COLOR, COMPLETED, DATE, DESCRIPTION, JsonObject, MONTH, NAME, NOTES, TARGET_DAYS,
    parse_habit_id, parse_optional_month, parse_required_date,
};

/// Body for creating a habit. A `userId` member is ignored; the session
/// identity owns the new habit.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitRequest {
    #[schema(example = "Drink Water")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = "#3B82F6")]
    pub color: Option<String>,
    #[schema(example = 30)]
    pub target_days: Option<i64>,
}

impl TryFrom<JsonObject> for CreateHabitRequest {
    type Error = Error;

    fn try_from(mut body: JsonObject) -> Result<Self, Self::Error> {
        Ok(Self {
            name: body.take(NAME)?,
            description: body.take(DESCRIPTION)?,
            color: body.take(COLOR)?,
            target_days: body.take(TARGET_DAYS)?,
        })
    }
}

impl From<CreateHabitRequest> for HabitDraft {
    fn from(value: CreateHabitRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            color: value.color,
            target_days: value.target_days,
        }
    }
}

/// Body for recording one day's outcome.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogDayBody {
    #[schema(example = "2024-01-15")]
    pub date: Option<String>,
    /// Defaults to `false`.
    pub completed: Option<bool>,
    pub notes: Option<String>,
}

impl TryFrom<JsonObject> for LogDayBody {
    type Error = Error;

    fn try_from(mut body: JsonObject) -> Result<Self, Self::Error> {
        Ok(Self {
            date: body.take(DATE)?,
            completed: body.take(COMPLETED)?,
            notes: body.take(NOTES)?,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListHabitsQuery {
    /// Must match the caller when present.
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HabitLogsQuery {
    /// Restrict to one calendar month, `YYYY-MM`.
    pub month: Option<String>,
}

/// List the caller's habits.
#[utoipa::path(
    get,
    path = "/api/habits",
    params(ListHabitsQuery),
    responses(
        (status = 200, description = "Habits in creation order", body = [Habit]),
        (status = 401, description = "No caller identity", body = Error),
        (status = 403, description = "userId names another user", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["habits"],
    operation_id = "listHabits"
)]
#[get("/habits")]
pub async fn list_habits(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListHabitsQuery>,
) -> ApiResult<web::Json<Vec<Habit>>> {
    let user_id = session.require_user_id()?;
    let requested = query.into_inner().user_id;
    if requested.is_some_and(|requested| requested != user_id.as_ref()) {
        return Err(Error::forbidden("cannot list habits of another user"));
    }
    let habits = state.habits_query.list_habits(&user_id).await?;
    Ok(web::Json(habits))
}

/// Create a habit for the caller.
#[utoipa::path(
    post,
    path = "/api/habits",
    request_body = CreateHabitRequest,
    responses(
        (status = 201, description = "Created habit", body = Habit),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "No caller identity", body = Error)
    ),
    tags = ["habits"],
    operation_id = "createHabit"
)]
#[post("/habits")]
pub async fn create_habit(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<JsonObject>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let request = CreateHabitRequest::try_from(payload.into_inner())?;
    let habit = new_habit(user_id, request.into())?;
    let created = state.habits.create_habit(habit).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Fetch one of the caller's habits.
#[utoipa::path(
    get,
    path = "/api/habits/{id}",
    params(("id" = i32, Path, description = "Habit id")),
    responses(
        (status = 200, description = "Habit", body = Habit),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "No caller identity", body = Error),
        (status = 404, description = "No such habit for this caller", body = Error)
    ),
    tags = ["habits"],
    operation_id = "getHabit"
)]
#[get("/habits/{id}")]
pub async fn get_habit(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Habit>> {
    let user_id = session.require_user_id()?;
    let habit_id = parse_habit_id(path.into_inner())?;
    let habit = state.habits_query.get_habit(&user_id, habit_id).await?;
    Ok(web::Json(habit))
}

/// Delete one of the caller's habits and all of its logs.
#[utoipa::path(
    delete,
    path = "/api/habits/{id}",
    params(("id" = i32, Path, description = "Habit id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "No caller identity", body = Error),
        (status = 404, description = "No such habit for this caller", body = Error)
    ),
    tags = ["habits"],
    operation_id = "deleteHabit"
)]
#[delete("/habits/{id}")]
pub async fn delete_habit(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let habit_id = parse_habit_id(path.into_inner())?;
    state.habits.delete_habit(&user_id, habit_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List a habit's logs, optionally for a single month.
#[utoipa::path(
    get,
    path = "/api/habits/{id}/logs",
    params(("id" = i32, Path, description = "Habit id"), HabitLogsQuery),
    responses(
        (status = 200, description = "Logs ordered by date", body = [HabitLog]),
        (status = 400, description = "Malformed id or month", body = Error),
        (status = 401, description = "No caller identity", body = Error),
        (status = 404, description = "No such habit for this caller", body = Error)
    ),
    tags = ["habits"],
    operation_id = "listHabitLogs"
)]
#[get("/habits/{id}/logs")]
pub async fn list_habit_logs(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    query: web::Query<HabitLogsQuery>,
) -> ApiResult<web::Json<Vec<HabitLog>>> {
    let user_id = session.require_user_id()?;
    let habit_id = parse_habit_id(path.into_inner())?;
    let month = parse_optional_month(query.into_inner().month, MONTH)?;
    let logs = state
        .habits_query
        .list_logs(&user_id, habit_id, month)
        .await?;
    Ok(web::Json(logs))
}

/// Record whether a habit was completed on a day.
///
/// Repeating the request is harmless: the log for `(id, date)` is updated in
/// place.
#[utoipa::path(
    post,
    path = "/api/habits/{id}/logs",
    params(("id" = i32, Path, description = "Habit id")),
    request_body = LogDayBody,
    responses(
        (status = 200, description = "Stored log", body = HabitLog),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "No caller identity", body = Error),
        (status = 404, description = "No such habit for this caller", body = Error)
    ),
    tags = ["habits"],
    operation_id = "logHabitDay"
)]
#[post("/habits/{id}/logs")]
pub async fn log_habit_day(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<JsonObject>,
) -> ApiResult<web::Json<HabitLog>> {
    let user_id = session.require_user_id()?;
    let habit_id = parse_habit_id(path.into_inner())?;
    let body = LogDayBody::try_from(payload.into_inner())?;
    let date = parse_required_date(body.date, DATE)?;
    let log = state
        .habits
        .log_day(LogDayRequest {
            user_id,
            entry: LogEntry {
                habit_id,
                date,
                completed: body.completed.unwrap_or(false),
                notes: body.notes,
            },
        })
        .await?;
    Ok(web::Json(log))
}

/// Register the habit routes on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_habits)
        .service(create_habit)
        .service(get_habit)
        .service(delete_habit)
        .service(list_habit_logs)
        .service(log_habit_day);
}

#[cfg(test)]
#[path = "habits_tests.rs"]
mod tests;
