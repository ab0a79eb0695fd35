//! Direct SQLite session for fixture setup.
//!
//! [`SqliteSession`] owns one connection and runs raw statements against it,
//! independent of any migration path.

use crate::error::{DbError, DbResult};
use crate::introspect;
use crate::row::Row;
use rusqlite::types::Value;
use rusqlite::{Connection, ToSql};
use std::path::Path;

/// Location string that selects a private in-memory database.
pub const MEMORY_LOCATION: &str = ":memory:";

/// Owns a single SQLite connection until [`SqliteSession::dispose`] or drop.
///
/// Not `Sync`; one session belongs to one test.
pub struct SqliteSession {
    conn: Option<Connection>,
}

impl SqliteSession {
    /// Open a fresh in-memory database.
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn: Some(conn) })
    }

    /// Open (or create) a database file at `path`.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self { conn: Some(conn) })
    }

    /// Open from a location string (handles `:memory:` special case).
    pub fn new(location: &str) -> DbResult<Self> {
        if location == MEMORY_LOCATION {
            Self::in_memory()
        } else {
            Self::open(Path::new(location))
        }
    }

    /// Borrow the underlying connection.
    pub fn conn(&self) -> DbResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or(DbError::Disposed("SqliteSession"))
    }

    /// Run one or more statements that produce no result set.
    pub fn execute_non_query(&self, sql: &str) -> DbResult<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    /// Run a single statement with named parameters bound by name.
    ///
    /// Parameter names include their prefix, e.g. `":name"` or `"@name"`.
    pub fn execute_non_query_with(
        &self,
        sql: &str,
        params: &[(&str, &dyn ToSql)],
    ) -> DbResult<()> {
        self.conn()?.execute(sql, params)?;
        Ok(())
    }

    /// Return the first column of the first row, or `None` for an empty result.
    pub fn execute_scalar(&self, sql: &str) -> DbResult<Option<Value>> {
        let mut stmt = self.conn()?.prepare(sql)?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Run a query and collect every row in the order the engine returns them.
    pub fn execute_query(&self, sql: &str) -> DbResult<Vec<Row>> {
        let mut stmt = self.conn()?.prepare(sql)?;
        let column_names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let rows = stmt
            .query_map([], |row| {
                let cells = column_names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| Ok((name.clone(), row.get::<_, Value>(i)?)))
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(Row::new(cells))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Check whether a table named exactly `name` exists.
    pub fn table_exists(&self, name: &str) -> DbResult<bool> {
        introspect::table_exists(self.conn()?, name)
    }

    /// Whether [`SqliteSession::dispose`] has already run.
    pub fn is_disposed(&self) -> bool {
        self.conn.is_none()
    }

    /// Close the connection. Later calls are no-ops.
    pub fn dispose(&mut self) -> DbResult<()> {
        if let Some(conn) = self.conn.take() {
            log::debug!("Closing SQLite session");
            conn.close().map_err(|(_, e)| DbError::Sqlite(e))?;
        }
        Ok(())
    }
}

impl Drop for SqliteSession {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            log::warn!("Failed to close SQLite session: {e}");
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
