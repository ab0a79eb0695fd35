//! Migration test harness.
//!
//! [`MigrationHarness`] owns one SQLite connection and the runner bound to
//! it. Tests call [`MigrationHarness::setup`] to bring the schema to its
//! latest version and [`MigrationHarness::cleanup`] to revert it.

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::migration::MigrationSet;
use crate::runner::{MigrationRunner, SqliteMigrator};
use mt_db::DbError;
use rusqlite::Connection;

/// Lifecycle of a [`MigrationHarness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessState {
    /// Connection open, runner bound, nothing applied yet.
    Constructed,
    /// `setup` completed.
    Migrated,
    /// `cleanup` completed.
    RolledBack,
    /// Resources released; every further operation fails.
    Disposed,
}

/// Owns a connection plus the migration runner scoped to it.
///
/// Single-threaded: one harness belongs to one test.
pub struct MigrationHarness {
    runner: Option<Box<dyn MigrationRunner>>,
    conn: Option<Connection>,
    state: HarnessState,
}

impl MigrationHarness {
    /// Harness over a private in-memory database.
    pub fn new(migrations: MigrationSet) -> HarnessResult<Self> {
        Self::with_config(&HarnessConfig::default(), migrations)
    }

    /// Harness over the database described by `config`.
    pub fn with_config(config: &HarnessConfig, migrations: MigrationSet) -> HarnessResult<Self> {
        let conn = open_connection(config)?;
        Ok(Self::with_runner(conn, Box::new(SqliteMigrator::new(migrations))))
    }

    /// Harness over an already-open connection and a custom runner.
    pub fn with_runner(conn: Connection, runner: Box<dyn MigrationRunner>) -> Self {
        Self {
            runner: Some(runner),
            conn: Some(conn),
            state: HarnessState::Constructed,
        }
    }

    pub fn state(&self) -> HarnessState {
        self.state
    }

    /// Borrow the connection, e.g. for fixture inserts.
    pub fn conn(&self) -> HarnessResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or(HarnessError::Disposed("MigrationHarness"))
    }

    fn parts_mut(&mut self) -> HarnessResult<(&mut Connection, &mut dyn MigrationRunner)> {
        match (self.conn.as_mut(), self.runner.as_mut()) {
            (Some(conn), Some(runner)) => Ok((conn, &mut **runner)),
            _ => Err(HarnessError::Disposed("MigrationHarness")),
        }
    }

    /// Apply every pending migration.
    ///
    /// On failure the schema is left wherever the runner left it.
    pub fn setup(&mut self) -> HarnessResult<()> {
        let (conn, runner) = self.parts_mut()?;
        runner.migrate_up(conn)?;
        self.state = HarnessState::Migrated;
        log::info!("Migrations applied");
        Ok(())
    }

    /// Revert every applied migration down to the empty baseline.
    pub fn cleanup(&mut self) -> HarnessResult<()> {
        let (conn, runner) = self.parts_mut()?;
        runner.migrate_down_to(conn, 0)?;
        self.state = HarnessState::RolledBack;
        log::info!("Migrations rolled back");
        Ok(())
    }

    /// Version of the newest applied migration, `None` at the baseline.
    pub fn schema_version(&self) -> HarnessResult<Option<i64>> {
        let runner = self
            .runner
            .as_ref()
            .ok_or(HarnessError::Disposed("MigrationHarness"))?;
        runner.current_version(self.conn()?)
    }

    /// Release the runner, then close the connection. Later calls are no-ops.
    pub fn dispose(&mut self) -> HarnessResult<()> {
        if self.state == HarnessState::Disposed {
            return Ok(());
        }
        self.state = HarnessState::Disposed;

        if let Some(mut runner) = self.runner.take() {
            runner.release();
        }
        if let Some(conn) = self.conn.take() {
            log::debug!("Closing harness connection");
            conn.close()
                .map_err(|(_, e)| HarnessError::Db(DbError::Sqlite(e)))?;
        }
        Ok(())
    }
}

impl Drop for MigrationHarness {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            log::warn!("Failed to dispose migration harness: {e}");
        }
    }
}

/// Open the connection described by `config` and apply its pragmas.
fn open_connection(config: &HarnessConfig) -> HarnessResult<Connection> {
    let conn = if config.database.is_memory() {
        Connection::open_in_memory()
    } else {
        Connection::open(&config.database.path)
    }
    .map_err(|e| DbError::ConnectionError(format!("{e}: {}", config.database.path)))?;

    // The bundled engine defaults foreign keys on, so always send the setting.
    conn.pragma_update(None, "foreign_keys", config.foreign_keys)?;
    if let Some(timeout) = config.busy_timeout() {
        conn.busy_timeout(timeout)?;
    }
    log::debug!("Opened harness database at {}", config.database.path);
    Ok(conn)
}

#[cfg(test)]
#[path = "harness_test.rs"]
mod tests;
