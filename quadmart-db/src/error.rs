use sea_orm::SqlErr;
use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Db error {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("No {entity} matches the given query")]
    NotFound { entity: &'static str },
    #[error("{0}")]
    Conflict(String),
    /// A stored aggregate violated an invariant the schema should make
    /// impossible, e.g. a listing row with no variant row.
    #[error("{0}")]
    Inconsistent(String),
}

impl DbError {
    pub(crate) fn not_found(entity: &'static str) -> Self {
        DbError::NotFound { entity }
    }

    /// Maps a unique-constraint violation on insert to `Conflict` with
    /// `message`. The constraint, not any application pre-check, is what
    /// makes duplicate inserts safe under concurrency.
    pub(crate) fn on_duplicate(err: sea_orm::DbErr, message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => DbError::Conflict(message.to_string()),
            _ => DbError::Db(err),
        }
    }
}
