//! Builders for HTTP state over the configured habit store.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use habit_tracker::domain::HabitService;
use habit_tracker::domain::demo_seed::{demo_user, seed_demo};
use habit_tracker::domain::ports::{HabitRepository, HabitRepositoryError};
use habit_tracker::domain::UserId;
use habit_tracker::inbound::http::state::HttpState;
use habit_tracker::outbound::memory::InMemoryHabitRepository;
use habit_tracker::outbound::persistence::DieselHabitRepository;

use super::ServerConfig;

/// Build handler state, seeding the store first when requested.
///
/// # Errors
/// Returns [`std::io::Error`] when seeding or upserting the fallback user fails.
pub(crate) async fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    match &config.db_pool {
        Some(pool) => {
            let repository = Arc::new(DieselHabitRepository::new(pool.clone()));
            state_over(repository, config).await
        }
        None => {
            warn!("no database configured; habits are kept in memory");
            state_over(Arc::new(InMemoryHabitRepository::default()), config).await
        }
    }
}

async fn state_over<R>(repository: Arc<R>, config: &ServerConfig) -> std::io::Result<web::Data<HttpState>>
where
    R: HabitRepository + 'static,
{
    prepare_store(repository.as_ref(), config)
        .await
        .map_err(|error| std::io::Error::other(format!("store preparation failed: {error}")))?;
    let service = Arc::new(HabitService::new(repository));
    Ok(web::Data::new(HttpState::new(
        service.clone(),
        service,
        Arc::new(DefaultClock),
    )))
}

/// The fallback identity must exist before habits can be created for it.
async fn prepare_store<R>(repository: &R, config: &ServerConfig) -> Result<(), HabitRepositoryError>
where
    R: HabitRepository + ?Sized,
{
    if let Some(user_id) = &config.identity_fallback {
        ensure_user(repository, user_id).await?;
    }
    if let Some(user_id) = &config.seed_user {
        let outcome = seed_demo(repository, user_id).await?;
        info!(user_id = %user_id, habits_created = outcome.habits_created, "demo data seeded");
    }
    Ok(())
}

async fn ensure_user<R>(repository: &R, user_id: &UserId) -> Result<(), HabitRepositoryError>
where
    R: HabitRepository + ?Sized,
{
    repository.upsert_user(&demo_user(user_id.clone())).await
}
