//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use habit_tracker::domain::UserId;
use habit_tracker::outbound::persistence::DbPool;
use std::net::SocketAddr;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) identity_fallback: Option<UserId>,
    pub(crate) seed_user: Option<UserId>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration with the in-memory store.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            identity_fallback: None,
            seed_user: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Persist habits in PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Resolve requests without a session identity to `user_id`.
    #[must_use]
    pub fn with_identity_fallback(mut self, user_id: Option<UserId>) -> Self {
        self.identity_fallback = user_id;
        self
    }

    /// Seed demo habits for `user_id` before serving.
    #[must_use]
    pub fn with_seed_user(mut self, user_id: Option<UserId>) -> Self {
        self.seed_user = user_id;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
