//! Database-specific error types and conversions.

use automara_core::error::AutomaraError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate record: {entity}")]
    Duplicate { entity: String },
}

impl From<DbError> for AutomaraError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AutomaraError::NotFound { entity, id },
            DbError::Duplicate { entity } => AutomaraError::AlreadyExists { entity },
            other => AutomaraError::Database(other.to_string()),
        }
    }
}

/// Whether a query error is a unique-index violation.
///
/// SurrealDB reports index rejections as plain query errors; the
/// phrase "already contains" identifies them.
pub(crate) fn is_unique_violation(err: &surrealdb::Error) -> bool {
    err.to_string().contains("already contains")
}
