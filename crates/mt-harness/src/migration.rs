//! Versioned migrations supplied by the test project.
//!
//! Each [`Migration`] pairs a forward and an optional backward SQL script,
//! usually embedded with `include_str!`. A [`MigrationSet`] orders them by
//! version and rejects duplicates.

use crate::error::{HarnessError, HarnessResult};

/// A single schema migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    /// Version identifier, e.g. a timestamp such as `202502060001`.
    pub version: i64,
    /// Human-readable label for logs.
    pub name: &'static str,
    /// SQL applied when migrating forward.
    pub up: &'static str,
    /// SQL applied when reverting. `None` makes the migration irreversible.
    pub down: Option<&'static str>,
}

impl Migration {
    pub const fn new(version: i64, name: &'static str, up: &'static str) -> Self {
        Self {
            version,
            name,
            up,
            down: None,
        }
    }

    /// Attach the backward script.
    pub const fn with_down(mut self, down: &'static str) -> Self {
        self.down = Some(down);
        self
    }
}

/// Migrations sorted by ascending version.
#[derive(Debug, Clone, Default)]
pub struct MigrationSet {
    migrations: Vec<Migration>,
}

impl MigrationSet {
    /// Build a set from migrations in any order.
    pub fn new(migrations: impl IntoIterator<Item = Migration>) -> HarnessResult<Self> {
        let mut migrations: Vec<Migration> = migrations.into_iter().collect();
        migrations.sort_by_key(|m| m.version);

        if let Some(pair) = migrations.windows(2).find(|w| w[0].version == w[1].version) {
            return Err(HarnessError::DuplicateVersion(pair[0].version));
        }
        Ok(Self { migrations })
    }

    /// A set with no migrations; `setup` and `cleanup` are then no-ops.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Migration> {
        self.migrations.iter()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Number of migrations with a version at or below `version`.
    pub(crate) fn count_through(&self, version: i64) -> usize {
        self.migrations
            .iter()
            .take_while(|m| m.version <= version)
            .count()
    }

    /// Version of the `position`-th migration (1-based).
    pub(crate) fn version_at(&self, position: usize) -> Option<i64> {
        position
            .checked_sub(1)
            .and_then(|idx| self.migrations.get(idx))
            .map(|m| m.version)
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
