//! Classification of pool and Diesel failures shared by the repositories.
//!
//! Repositories turn a [`DieselFailure`] into their own port error; the raw
//! database message is only emitted at `debug` level and never returned.

use tracing::debug;

use super::pool::PoolError;

/// Coarse category of a failed database interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection was lost or could not be obtained.
    Connection(String),
    /// A foreign-key constraint rejected the statement.
    ForeignKey { constraint: Option<String> },
    /// Anything else; the payload is a client-safe summary.
    Query(&'static str),
}

/// Message carried by a pool failure.
pub(crate) fn pool_failure(error: PoolError) -> DieselFailure {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DieselFailure::Connection(message)
        }
    }
}

/// Categorise a Diesel error, logging the underlying cause at `debug`.
pub(crate) fn classify_diesel_error(error: diesel::result::Error, operation: &str) -> DieselFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(error = %error, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DieselFailure::ForeignKey {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(_, _) => DieselFailure::Query("database error"),
        _ => DieselFailure::Query("database error"),
    }
}
