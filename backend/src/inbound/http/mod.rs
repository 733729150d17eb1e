//! HTTP inbound adapter exposing REST endpoints.

pub mod analytics;
pub mod error;
pub mod habits;
pub mod health;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api` route on a scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(habits::configure)
        .configure(analytics::configure);
}
