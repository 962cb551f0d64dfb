//! Mapping from `sqlx` errors onto the collaborator error type.

use storefront_core::error::StoreError;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Classify a `sqlx::Error` as a uniqueness conflict or a backend failure.
pub fn classify_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            return StoreError::UniqueViolation(constraint);
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::Backend(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_non_database_errors_are_backend_failures() {
        assert_matches!(classify_sqlx_error(sqlx::Error::RowNotFound), StoreError::Backend(_));
        assert_matches!(classify_sqlx_error(sqlx::Error::PoolTimedOut), StoreError::Backend(_));
    }
}
