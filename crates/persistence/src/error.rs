//! Mapping of driver errors to repository errors.

use domain::repository::RepositoryError;

/// Converts a `sqlx` error into the domain's repository error.
///
/// Unique violations (23505) become `Conflict`, foreign key violations
/// (23503) become `ForeignKey`; everything else is reported as unavailable.
pub fn map_db_error(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => RepositoryError::Conflict(
                db_err
                    .constraint()
                    .map(|c| format!("duplicate value violates {}", c))
                    .unwrap_or_else(|| "duplicate value".to_string()),
            ),
            Some("23503") => RepositoryError::ForeignKey(
                db_err
                    .constraint()
                    .unwrap_or("foreign key")
                    .to_string(),
            ),
            Some("23514") => RepositoryError::Conflict(format!("check failed: {}", db_err)),
            _ => RepositoryError::Unavailable(format!("Database error: {}", db_err)),
        },
        sqlx::Error::ColumnDecode { index, source } => {
            RepositoryError::Corrupt(format!("column {}: {}", index, source))
        }
        other => RepositoryError::Unavailable(format!("Database error: {}", other)),
    }
}
