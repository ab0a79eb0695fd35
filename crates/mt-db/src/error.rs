//! Error types for mt-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// SQLite driver error with preserved source chain (D002)
    #[error("[D002] SQLite error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    /// Operation on a session that was already disposed (D003)
    #[error("[D003] Disposed instance used: {0}")]
    Disposed(&'static str),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Whether the engine rejected a statement because a referenced table
    /// does not exist.
    ///
    /// `rusqlite::Error` carries no structured variant for this, so we match
    /// the engine message the same way SQLite reports it.
    pub fn is_missing_table(&self) -> bool {
        match self {
            DbError::Sqlite(err) => err.to_string().contains("no such table"),
            _ => false,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        DbError::Sqlite(err)
    }
}
