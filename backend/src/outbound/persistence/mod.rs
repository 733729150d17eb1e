//! PostgreSQL persistence adapter using Diesel.
//!
//! Repositories are thin: they translate between Diesel rows and domain
//! types and classify database failures. Row structs (`models`) and table
//! definitions (`schema`) stay private to this module.
//!
//! # Example
//!
//! ```ignore
//! use habit_tracker::outbound::persistence::{DbPool, DieselHabitRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/habits")).await?;
//! let repo = DieselHabitRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_habit_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_habit_repository::DieselHabitRepository;
pub use migrations::{MigrationError, apply_migrations, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
