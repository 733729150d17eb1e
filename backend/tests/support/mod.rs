//! Shared helpers for database-backed integration tests.
//!
//! Tests run against the PostgreSQL instance named by
//! `HABITS_TEST_DATABASE_URL`. When it is unset the test prints a skip
//! marker and returns early.

use std::sync::OnceLock;

use habit_tracker::domain::UserId;
use habit_tracker::outbound::persistence::{
    DbPool, DieselHabitRepository, PoolConfig, run_pending_migrations,
};

const DATABASE_URL_ENV: &str = "HABITS_TEST_DATABASE_URL";

static MIGRATED: OnceLock<Result<usize, String>> = OnceLock::new();

/// Repository over a migrated test database, or `None` when none is configured.
pub async fn test_repository() -> Option<DieselHabitRepository> {
    let Ok(url) = std::env::var(DATABASE_URL_ENV) else {
        eprintln!("SKIP-TEST-DB: {DATABASE_URL_ENV} is not set");
        return None;
    };
    if let Err(error) = MIGRATED.get_or_init(|| {
        run_pending_migrations(&url).map_err(|error| error.to_string())
    }) {
        panic!("test database migration failed: {error}");
    }
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(4))
        .await
        .expect("test pool builds");
    Some(DieselHabitRepository::new(pool))
}

/// A user id no other test run has used, so tests can share one database.
pub fn unique_user() -> UserId {
    UserId::new(format!("test-{}", uuid::Uuid::new_v4())).expect("generated id is valid")
}
