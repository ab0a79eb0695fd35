//! mt-harness - migration test harness for SQLite
//!
//! Brings a private SQLite database to a known schema state with
//! [`MigrationHarness`] and checks the result with [`MigrationAssertions`].
//!
//! - [`migration`] - versioned up/down steps supplied by the test project
//! - [`runner`] - the [`MigrationRunner`] seam and its `rusqlite_migration` implementation
//! - [`harness`] - connection + runner lifecycle (`setup` / `cleanup` / `dispose`)
//! - [`assertions`] - read-only schema checks over a migrated database

pub mod assertions;
pub mod config;
pub mod error;
pub mod harness;
pub mod migration;
pub mod runner;

pub use assertions::MigrationAssertions;
pub use config::{DatabaseConfig, HarnessConfig};
pub use error::{HarnessError, HarnessResult};
pub use harness::{HarnessState, MigrationHarness};
pub use migration::{Migration, MigrationSet};
pub use runner::{MigrationRunner, SqliteMigrator};
