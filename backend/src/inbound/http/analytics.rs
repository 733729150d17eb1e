//! Analytics HTTP handler.
//!
//! ```text
//! GET /api/analytics?today=YYYY-MM-DD
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{AnalyticsReport, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{TODAY, parse_optional_date};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsQuery {
    /// Day the report is computed for. Defaults to the server's UTC date.
    pub today: Option<String>,
}

/// Streaks, completion rates, and per-habit progress for the caller.
#[utoipa::path(
    get,
    path = "/api/analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Analytics report", body = AnalyticsReport),
        (status = 400, description = "Malformed today", body = Error),
        (status = 401, description = "No caller identity", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["analytics"],
    operation_id = "getAnalytics"
)]
#[get("/analytics")]
pub async fn get_analytics(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AnalyticsQuery>,
) -> ApiResult<web::Json<AnalyticsReport>> {
    let user_id = session.require_user_id()?;
    let today = parse_optional_date(query.into_inner().today, TODAY)?
        .unwrap_or_else(|| state.clock.utc().date_naive());
    let report = state.habits_query.analytics(&user_id, today).await?;
    Ok(web::Json(report))
}

/// Register the analytics route on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_analytics);
}
