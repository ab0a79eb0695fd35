//! Error types for the migration harness.

use mt_db::DbError;
use thiserror::Error;

/// Migration harness errors.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Engine error from a statement or introspection query (H001).
    #[error("[H001] Database error: {0}")]
    Db(#[from] DbError),

    /// The migration runner failed to apply or revert a step (H002).
    #[error("[H002] Migration runner failed: {0}")]
    Migration(#[source] rusqlite_migration::Error),

    /// Operation on a harness that was already disposed (H003).
    #[error("[H003] Disposed instance used: {0}")]
    Disposed(&'static str),

    /// Two migrations declare the same version (H004).
    #[error("[H004] Duplicate migration version: {0}")]
    DuplicateVersion(i64),

    /// The database reports a schema version no known migration accounts for (H005).
    #[error("[H005] Schema version {0} is beyond the {1} known migrations")]
    UnknownSchemaVersion(usize, usize),

    /// Configuration file not found (H006).
    #[error("[H006] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be parsed (H007).
    #[error("[H007] Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// I/O error with file path context (H008).
    #[error("[H008] IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for [`HarnessError`].
pub type HarnessResult<T> = Result<T, HarnessError>;

impl HarnessError {
    /// Whether this wraps an engine error for a table that does not exist.
    pub fn is_missing_table(&self) -> bool {
        matches!(self, HarnessError::Db(err) if err.is_missing_table())
    }
}

impl From<rusqlite::Error> for HarnessError {
    fn from(err: rusqlite::Error) -> Self {
        HarnessError::Db(DbError::Sqlite(err))
    }
}

impl From<rusqlite_migration::Error> for HarnessError {
    fn from(err: rusqlite_migration::Error) -> Self {
        HarnessError::Migration(err)
    }
}
