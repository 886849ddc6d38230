//! Shared Diesel error mapping for the store, session and statistics
//! adapters.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;
use crate::domain::ports::{SessionStoreError, StoreError, StoreStatsError};

/// Broad classification shared by every adapter error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    Connection(String),
    Query(String),
    UniqueViolation(String),
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify(error: DieselError, operation: &'static str) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
        }
        other => debug!(error = %other, operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => {
            DieselFailure::Connection("database connection error".to_owned())
        }
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error".to_owned()),
        _ => DieselFailure::Query(format!("{operation}: database error")),
    }
}

pub(crate) fn store_error(error: DieselError, operation: &'static str) -> StoreError {
    match classify(error, operation) {
        DieselFailure::Connection(message) => StoreError::connection(message),
        DieselFailure::Query(message) => StoreError::query(message),
        DieselFailure::UniqueViolation(message) => StoreError::unique_violation(message),
    }
}

pub(crate) fn store_pool_error(error: PoolError) -> StoreError {
    StoreError::connection(error.message())
}

pub(crate) fn session_error(error: DieselError, operation: &'static str) -> SessionStoreError {
    match classify(error, operation) {
        DieselFailure::Connection(message) => SessionStoreError::connection(message),
        DieselFailure::Query(message) | DieselFailure::UniqueViolation(message) => {
            SessionStoreError::query(message)
        }
    }
}

pub(crate) fn session_pool_error(error: PoolError) -> SessionStoreError {
    SessionStoreError::connection(error.message())
}

pub(crate) fn stats_error(error: DieselError, operation: &'static str) -> StoreStatsError {
    match classify(error, operation) {
        DieselFailure::Connection(message)
        | DieselFailure::Query(message)
        | DieselFailure::UniqueViolation(message) => StoreStatsError::query(message),
    }
}

pub(crate) fn stats_pool_error(error: PoolError) -> StoreStatsError {
    StoreStatsError::query(error.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorInformation;
    use rstest::rstest;

    struct Info(&'static str);

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, message: &'static str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info(message)))
    }

    #[rstest]
    fn unique_violations_keep_their_message() {
        let err = store_error(
            database_error(DatabaseErrorKind::UniqueViolation, "users_name_lower_idx"),
            "insert_user",
        );
        assert_eq!(err, StoreError::unique_violation("users_name_lower_idx"));
    }

    #[rstest]
    fn closed_connections_map_to_connection_errors() {
        let err = store_error(
            database_error(DatabaseErrorKind::ClosedConnection, "gone"),
            "find_lists",
        );
        assert!(matches!(err, StoreError::Connection { .. }));
    }

    #[rstest]
    fn other_failures_name_the_operation() {
        let err = store_error(DieselError::NotFound, "update_item");
        assert_eq!(err, StoreError::query("update_item: database error"));
    }

    #[rstest]
    fn session_uniqueness_is_a_query_failure() {
        let err = session_error(
            database_error(DatabaseErrorKind::UniqueViolation, "sessions_pkey"),
            "save",
        );
        assert!(matches!(err, SessionStoreError::Query { .. }));
    }

    #[rstest]
    fn pool_errors_carry_their_message() {
        let err = store_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, StoreError::connection("timed out"));
    }
}
