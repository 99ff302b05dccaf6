//! Database-specific error types and conversions.

use tollgate_core::error::TollgateError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unique constraint violated for {entity}: {detail}")]
    Conflict { entity: String, detail: String },

    /// A concurrent transaction committed a write to the same record or
    /// index entry first.
    #[error("Write conflict on {entity}: {detail}")]
    WriteConflict { entity: String, detail: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Invalid stored row: {0}")]
    InvalidRow(String),
}

impl DbError {
    /// Classify a failed statement, separating uniqueness violations
    /// (duplicate record id or unique index entry) and lost write races
    /// from other failures.
    pub fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let detail = err.to_string();
        if is_uniqueness_violation(&detail) {
            DbError::Conflict {
                entity: entity.into(),
                detail,
            }
        } else if is_write_conflict(&detail) {
            DbError::WriteConflict {
                entity: entity.into(),
                detail,
            }
        } else {
            DbError::Query(detail)
        }
    }

    /// Whether the store rejected the write because another writer got
    /// there first.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict { .. } | DbError::WriteConflict { .. })
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

fn is_uniqueness_violation(message: &str) -> bool {
    message.contains("already exists") || message.contains("already contains")
}

fn is_write_conflict(message: &str) -> bool {
    message.contains("Transaction conflict")
        || message.contains("Write conflict")
        || message.contains("retry the transaction")
}

impl From<DbError> for TollgateError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TollgateError::NotFound { entity, id },
            DbError::Conflict { entity, .. } => TollgateError::Conflict {
                message: format!("{entity} already exists"),
            },
            DbError::WriteConflict { entity, .. } => TollgateError::Conflict {
                message: format!("{entity} was modified concurrently"),
            },
            DbError::Surreal(err) if is_write_conflict(&err.to_string()) => {
                TollgateError::Conflict {
                    message: "record was modified concurrently".into(),
                }
            }
            other => TollgateError::Database(other.to_string()),
        }
    }
}
