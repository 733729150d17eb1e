//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`HabitRepository`) are implemented by outbound adapters;
//! driving ports (`HabitsCommand`, `HabitsQuery`) are called by inbound ones.

mod macros;
pub(crate) use macros::define_port_error;

mod habit_repository;
mod habits_command;
mod habits_query;

#[cfg(test)]
pub use habit_repository::MockHabitRepository;
pub use habit_repository::{HabitRepository, HabitRepositoryError};
#[cfg(test)]
pub use habits_command::MockHabitsCommand;
pub use habits_command::{HabitsCommand, LogDayRequest};
#[cfg(test)]
pub use habits_query::MockHabitsQuery;
pub use habits_query::HabitsQuery;
