//! mt-db - SQLite access for migration tests
//!
//! This crate provides [`SqliteSession`], a thin helper for running fixture
//! SQL against an embedded SQLite database, and the [`introspect`] functions
//! that read the engine's catalog (tables, columns, indexes, foreign keys).

pub mod error;
pub mod introspect;
pub mod row;
pub mod session;

pub use error::{DbError, DbResult};
pub use introspect::{ColumnInfo, ForeignKeyInfo, IndexInfo, IndexOrigin};
pub use row::Row;
pub use rusqlite::types::Value;
pub use rusqlite::{named_params, ToSql};
pub use session::{SqliteSession, MEMORY_LOCATION};
