//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `inbound::http`, the response and
//! request schemas they reference, and the session cookie security scheme.
//! Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::metrics::{HabitProgress, SeriesPoint};
use crate::domain::{AnalyticsReport, Error, ErrorCode, Habit, HabitId, HabitLog, UserId};
use crate::inbound::http::habits::{CreateHabitRequest, LogDayBody};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by the authentication service.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Habit tracker API",
        description = "Habits, daily completion logs, and progress analytics for the signed-in user."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::habits::list_habits,
        crate::inbound::http::habits::create_habit,
        crate::inbound::http::habits::get_habit,
        crate::inbound::http::habits::delete_habit,
        crate::inbound::http::habits::list_habit_logs,
        crate::inbound::http::habits::log_habit_day,
        crate::inbound::http::analytics::get_analytics,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Habit,
        HabitId,
        HabitLog,
        UserId,
        CreateHabitRequest,
        LogDayBody,
        AnalyticsReport,
        HabitProgress,
        SeriesPoint,
        Error,
        ErrorCode
    )),
    tags(
        (name = "habits", description = "Habits and their daily logs"),
        (name = "analytics", description = "Streaks, completion rates, and progress"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
