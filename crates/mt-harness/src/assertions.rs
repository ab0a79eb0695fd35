//! Schema assertions over a migrated database.
//!
//! [`MigrationAssertions`] provisions its own in-memory database and runner,
//! so instances never see each other's schema. Every check re-reads the live
//! catalog; a mismatch is `Ok(false)`, never an error.

use crate::error::HarnessResult;
use crate::harness::{HarnessState, MigrationHarness};
use crate::migration::MigrationSet;
use mt_db::introspect;
use rusqlite::Connection;
use std::collections::HashMap;

/// Read-only schema checks backed by a private [`MigrationHarness`].
pub struct MigrationAssertions {
    harness: MigrationHarness,
}

impl MigrationAssertions {
    /// Provision a private in-memory database with `migrations` bound to it.
    pub fn new(migrations: MigrationSet) -> HarnessResult<Self> {
        Ok(Self {
            harness: MigrationHarness::new(migrations)?,
        })
    }

    /// Apply every pending migration.
    pub fn setup(&mut self) -> HarnessResult<()> {
        self.harness.setup()
    }

    /// Revert every applied migration.
    pub fn cleanup(&mut self) -> HarnessResult<()> {
        self.harness.cleanup()
    }

    /// Release the runner and close the connection. Later calls are no-ops.
    pub fn dispose(&mut self) -> HarnessResult<()> {
        self.harness.dispose()
    }

    pub fn state(&self) -> HarnessState {
        self.harness.state()
    }

    /// Borrow the connection for fixture statements.
    pub fn conn(&self) -> HarnessResult<&Connection> {
        self.harness.conn()
    }

    /// Whether a table named exactly `table` exists.
    pub fn table_exists(&self, table: &str) -> HarnessResult<bool> {
        Ok(introspect::table_exists(self.conn()?, table)?)
    }

    /// Whether `table` has every `(column, declared type)` pair in `expected`.
    ///
    /// Types compare exactly as the engine reports them (`"INTEGER"`, not
    /// `"int"`). Extra columns are ignored. A missing table never matches.
    /// Views are introspected like tables, so a view name can match here
    /// even though [`MigrationAssertions::table_exists`] reports `false`.
    pub fn table_has_columns<I, K, V>(&self, table: &str, expected: I) -> HarnessResult<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let columns = introspect::table_columns(self.conn()?, table)?;
        if columns.is_empty() {
            return Ok(false);
        }
        let actual: HashMap<&str, &str> = columns
            .iter()
            .map(|c| (c.name.as_str(), c.declared_type.as_str()))
            .collect();

        Ok(expected.into_iter().all(|(name, declared_type)| {
            actual.get(name.as_ref()) == Some(&declared_type.as_ref())
        }))
    }

    /// Whether `column` is part of the primary key of `table`.
    pub fn table_has_primary_key(&self, table: &str, column: &str) -> HarnessResult<bool> {
        let columns = introspect::table_columns(self.conn()?, table)?;
        Ok(columns
            .iter()
            .any(|c| c.name == column && c.is_primary_key()))
    }

    /// Whether any unique index on `table` has a name containing `column`,
    /// ignoring case.
    ///
    /// This is a name heuristic, not a key check: a unique index named after
    /// an unrelated column can match, and SQLite's automatic indexes
    /// (`sqlite_autoindex_<table>_<n>`) for inline `UNIQUE` constraints never
    /// do. Use [`MigrationAssertions::column_has_unique_index`] to inspect the
    /// indexed columns instead.
    pub fn table_has_unique_constraint(&self, table: &str, column: &str) -> HarnessResult<bool> {
        let needle = column.to_lowercase();
        let indexes = introspect::index_list(self.conn()?, table)?;
        Ok(indexes
            .iter()
            .any(|idx| idx.unique && idx.name.to_lowercase().contains(&needle)))
    }

    /// Whether some unique index on `table` covers exactly `column`.
    ///
    /// Catches inline `UNIQUE` column constraints, `UNIQUE (col)` table
    /// constraints and `CREATE UNIQUE INDEX` alike. Partial indexes are
    /// excluded since they do not enforce uniqueness over the whole table.
    pub fn column_has_unique_index(&self, table: &str, column: &str) -> HarnessResult<bool> {
        let conn = self.conn()?;
        for idx in introspect::index_list(conn, table)? {
            if !idx.unique || idx.partial {
                continue;
            }
            if introspect::index_columns(conn, &idx.name)? == [column] {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether `table` has an index named exactly `index`.
    pub fn index_exists(&self, table: &str, index: &str) -> HarnessResult<bool> {
        let indexes = introspect::index_list(self.conn()?, table)?;
        Ok(indexes.iter().any(|idx| idx.name == index))
    }

    /// Whether a foreign key on `table` runs from `column` to `referenced_table`.
    pub fn table_has_foreign_key(
        &self,
        table: &str,
        column: &str,
        referenced_table: &str,
    ) -> HarnessResult<bool> {
        let keys = introspect::foreign_keys(self.conn()?, table)?;
        Ok(keys
            .iter()
            .any(|fk| fk.from_column == column && fk.referenced_table == referenced_table))
    }

    /// Whether `table` holds at least `minimum` rows.
    ///
    /// A missing table is an engine error, not `Ok(false)`.
    pub fn table_has_minimum_rows(&self, table: &str, minimum: u64) -> HarnessResult<bool> {
        let count = introspect::row_count(self.conn()?, table)?;
        Ok(u64::try_from(count).unwrap_or(0) >= minimum)
    }
}

#[cfg(test)]
#[path = "assertions_test.rs"]
mod tests;
