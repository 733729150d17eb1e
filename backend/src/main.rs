//! Backend entry-point: loads settings, prepares the habit store, and serves
//! the REST API with health probes and OpenAPI docs.

mod server;

use actix_web::cookie::SameSite;
use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use habit_tracker::domain::UserId;
use habit_tracker::domain::demo_seed::DEMO_USER_ID;
use habit_tracker::inbound::http::health::HealthState;
use habit_tracker::outbound::persistence::{DbPool, PoolConfig, apply_migrations};

use server::{AppSettings, ServerConfig, create_server, load_session_key};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|e| eyre!("failed to load configuration: {e}"))?;
    let key = load_session_key(settings.session_key_file(), settings.ephemeral_key_allowed())?;

    let identity_fallback = settings
        .demo_user_id
        .as_deref()
        .map(UserId::new)
        .transpose()
        .wrap_err("HABITS_DEMO_USER_ID is not a valid user id")?;
    if let Some(user_id) = &identity_fallback {
        warn!(%user_id, "requests without a session act as the demo user");
    }
    let seed_user = match (settings.seed_demo, &identity_fallback) {
        (false, _) => None,
        (true, Some(user_id)) => Some(user_id.clone()),
        (true, None) => Some(UserId::new(DEMO_USER_ID)?),
    };

    let mut config = ServerConfig::new(
        key,
        settings.cookie_secure,
        SameSite::Lax,
        settings.bind_addr(),
    )
    .with_identity_fallback(identity_fallback)
    .with_seed_user(seed_user);

    if let Some(url) = settings.database_url.clone() {
        let applied = apply_migrations(url.clone())
            .await
            .wrap_err("database migration failed")?;
        info!(applied, "database migrations applied");
        let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
            .await
            .wrap_err("database pool construction failed")?;
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(Some(server::make_metrics()?));
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    info!(addr = %settings.bind_addr(), "listening");
    server.await?;
    Ok(())
}
