//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repository using Diesel and `diesel-async`.
//! - **memory**: mutex-guarded in-process store for development and tests.
//!
//! Adapters translate between domain types and storage representations and
//! contain no business rules.

pub mod memory;
pub mod persistence;
