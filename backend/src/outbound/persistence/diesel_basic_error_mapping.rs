//! Shared translation of pool and Diesel failures into port errors.
//!
//! Adapters pass their port's `query` and `connection` constructors so each
//! port keeps its own error type while the classification stays in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Pool failures are always connection failures.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Classify a Diesel error as a query or connection failure.
///
/// Database messages are logged at debug level but never forwarded, so
/// constraint names and SQL fragments stay out of API responses.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection closed")
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
            query("database constraint rejected the change")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            query("referenced record does not exist")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            query("record already exists")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            query("concurrent update conflict")
        }
        DieselError::BrokenTransactionManager => connection("transaction state lost"),
        _ => query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(String),
        Connection(String),
    }

    fn map(error: DieselError) -> Mapped {
        map_basic_diesel_error(
            error,
            |m| Mapped::Query(m.to_owned()),
            |m| Mapped::Connection(m.to_owned()),
        )
    }

    #[rstest]
    fn not_found_is_a_query_error() {
        assert_eq!(
            map(DieselError::NotFound),
            Mapped::Query("record not found".to_owned())
        );
    }

    #[rstest]
    fn closed_connection_is_a_connection_error() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        );
        assert!(matches!(map(error), Mapped::Connection(_)));
    }

    #[rstest]
    fn check_violation_hides_the_constraint_name() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::CheckViolation,
            Box::new("facilities_available_capacity_sacks_check".to_owned()),
        );
        let Mapped::Query(message) = map(error) else {
            panic!("expected query error");
        };
        assert!(!message.contains("facilities_"));
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped: Mapped = map_basic_pool_error(PoolError::checkout("timed out"), |m| {
            Mapped::Connection(m)
        });
        assert_eq!(mapped, Mapped::Connection("timed out".to_owned()));
    }
}
