//! Shared Diesel error mapping for the repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Driver messages are logged at debug level and replaced with fixed text so
/// SQL details never reach API responses.
pub(crate) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Constraint violations the repositories translate into domain errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation {
    Unique,
    ForeignKey,
}

/// Classify `error` as a constraint violation, if it is one.
pub(crate) fn violation(error: &DieselError) -> Option<Violation> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            Some(Violation::Unique)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            Some(Violation::ForeignKey)
        }
        _ => None,
    }
}

/// Error type for transaction bodies that can abort with a port error.
///
/// Returning `Aborted` from inside `transaction` rolls the transaction back
/// just like a database failure does.
#[derive(Debug)]
pub(crate) enum TxError<E> {
    Diesel(DieselError),
    Aborted(E),
}

impl<E> From<DieselError> for TxError<E> {
    fn from(value: DieselError) -> Self {
        Self::Diesel(value)
    }
}

impl<E> TxError<E> {
    /// Collapse into the port error, mapping database failures with `map`.
    pub(crate) fn into_port_error(self, map: impl FnOnce(DieselError) -> E) -> E {
        match self {
            Self::Diesel(error) => map(error),
            Self::Aborted(error) => error,
        }
    }
}
