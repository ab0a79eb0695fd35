//! Migration runner seam.
//!
//! [`MigrationRunner`] is what the harness drives; [`SqliteMigrator`] is the
//! default implementation on top of `rusqlite_migration`, which records the
//! applied position in SQLite's `user_version`.

use crate::error::{HarnessError, HarnessResult};
use crate::migration::MigrationSet;
use rusqlite::Connection;
use rusqlite_migration::{Migrations, SchemaVersion, M};

/// Applies and reverts migrations against a connection owned by the caller.
pub trait MigrationRunner {
    /// Apply every migration not yet applied, in ascending version order.
    fn migrate_up(&mut self, conn: &mut Connection) -> HarnessResult<()>;

    /// Revert applied migrations, newest first, until only those at or below
    /// `version` remain. `0` reverts everything.
    fn migrate_down_to(&mut self, conn: &mut Connection, version: i64) -> HarnessResult<()>;

    /// Version of the newest applied migration, `None` at the empty baseline.
    fn current_version(&self, conn: &Connection) -> HarnessResult<Option<i64>>;

    /// Release resources held by the runner. Called once, before the
    /// connection closes.
    fn release(&mut self) {}
}

/// [`MigrationRunner`] backed by `rusqlite_migration`.
pub struct SqliteMigrator {
    set: MigrationSet,
    processor: Option<Migrations<'static>>,
}

impl SqliteMigrator {
    pub fn new(set: MigrationSet) -> Self {
        let steps = set
            .iter()
            .map(|m| match m.down {
                Some(down) => M::up(m.up).down(down),
                None => M::up(m.up),
            })
            .collect();
        Self {
            set,
            processor: Some(Migrations::new(steps)),
        }
    }

    fn processor(&self) -> HarnessResult<&Migrations<'static>> {
        self.processor
            .as_ref()
            .ok_or(HarnessError::Disposed("SqliteMigrator"))
    }

    /// Number of migrations currently applied.
    fn applied_count(&self, conn: &Connection) -> HarnessResult<usize> {
        match self.processor()?.current_version(conn)? {
            SchemaVersion::NoneSet => Ok(0),
            SchemaVersion::Inside(n) => Ok(n.get()),
            SchemaVersion::Outside(n) => {
                Err(HarnessError::UnknownSchemaVersion(n.get(), self.set.len()))
            }
        }
    }
}

impl MigrationRunner for SqliteMigrator {
    fn migrate_up(&mut self, conn: &mut Connection) -> HarnessResult<()> {
        let applied = self.applied_count(conn)?;
        // rusqlite_migration rejects an empty definition list outright.
        if applied == self.set.len() {
            log::debug!("No pending migrations");
            return Ok(());
        }
        for m in self.set.iter().skip(applied) {
            log::debug!("Applying migration v{} ({})", m.version, m.name);
        }
        self.processor()?.to_latest(conn)?;
        Ok(())
    }

    fn migrate_down_to(&mut self, conn: &mut Connection, version: i64) -> HarnessResult<()> {
        let applied = self.applied_count(conn)?;
        let target = self.set.count_through(version);
        if target >= applied {
            log::debug!("No migrations to revert above v{version}");
            return Ok(());
        }
        for m in self.set.iter().take(applied).skip(target).rev() {
            log::debug!("Reverting migration v{} ({})", m.version, m.name);
        }
        self.processor()?.to_version(conn, target)?;
        Ok(())
    }

    fn current_version(&self, conn: &Connection) -> HarnessResult<Option<i64>> {
        let applied = self.applied_count(conn)?;
        Ok(self.set.version_at(applied))
    }

    fn release(&mut self) {
        if self.processor.take().is_some() {
            log::debug!("Released migration processor");
        }
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
