//! Catalog introspection helpers.
//!
//! Reads `sqlite_master` and the `pragma_*` table-valued functions with bound
//! arguments. Returns plain Rust types so callers don't need to know the
//! pragma column layouts.

use crate::error::DbResult;
use rusqlite::Connection;

/// One column as reported by `pragma_table_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column position (0-based).
    pub cid: i64,
    pub name: String,
    /// Declared type exactly as written in the DDL (`""` when omitted).
    pub declared_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    /// 1-based position within the primary key, 0 when not part of it.
    pub primary_key_position: i64,
}

impl ColumnInfo {
    pub fn is_primary_key(&self) -> bool {
        self.primary_key_position > 0
    }
}

/// How an index came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrigin {
    /// `CREATE INDEX`
    Created,
    /// `UNIQUE` column or table constraint
    Unique,
    /// `PRIMARY KEY` constraint
    PrimaryKey,
}

impl IndexOrigin {
    fn parse(origin: &str) -> Self {
        match origin {
            "u" => IndexOrigin::Unique,
            "pk" => IndexOrigin::PrimaryKey,
            _ => IndexOrigin::Created,
        }
    }
}

/// One index as reported by `pragma_index_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub unique: bool,
    pub origin: IndexOrigin,
    pub partial: bool,
}

/// One foreign key column mapping as reported by `pragma_foreign_key_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyInfo {
    /// Constraint id; composite keys share an id.
    pub id: i64,
    /// Position within a composite key.
    pub seq: i64,
    pub referenced_table: String,
    pub from_column: String,
    /// `None` when the key implicitly targets the referenced primary key.
    pub to_column: Option<String>,
    pub on_update: String,
    pub on_delete: String,
}

/// Quote `name` as an SQL identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Check whether a table named exactly `name` is registered in the catalog.
pub fn table_exists(conn: &Connection, name: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    Ok(stmt.exists([name])?)
}

/// List the columns of `table` in declaration order.
///
/// A table that does not exist yields an empty list, not an error.
pub fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(
        "SELECT cid, name, type, \"notnull\", dflt_value, pk \
         FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let columns = stmt
        .query_map([table], |row| {
            Ok(ColumnInfo {
                cid: row.get(0)?,
                name: row.get(1)?,
                declared_type: row.get(2)?,
                not_null: row.get::<_, i64>(3)? != 0,
                default_value: row.get(4)?,
                primary_key_position: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// List the indexes attached to `table`, including automatic ones.
pub fn index_list(conn: &Connection, table: &str) -> DbResult<Vec<IndexInfo>> {
    let mut stmt = conn.prepare(
        "SELECT name, \"unique\", origin, partial \
         FROM pragma_index_list(?1) ORDER BY seq",
    )?;
    let indexes = stmt
        .query_map([table], |row| {
            let origin: String = row.get(2)?;
            Ok(IndexInfo {
                name: row.get(0)?,
                unique: row.get::<_, i64>(1)? != 0,
                origin: IndexOrigin::parse(&origin),
                partial: row.get::<_, i64>(3)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(indexes)
}

/// Key columns of `index` in key order. Expression keys are skipped.
pub fn index_columns(conn: &Connection, index: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
    let names = stmt
        .query_map([index], |row| row.get::<_, Option<String>>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names.into_iter().flatten().collect())
}

/// List the foreign key mappings declared on `table`.
pub fn foreign_keys(conn: &Connection, table: &str) -> DbResult<Vec<ForeignKeyInfo>> {
    let mut stmt = conn.prepare(
        "SELECT id, seq, \"table\", \"from\", \"to\", on_update, on_delete \
         FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
    )?;
    let keys = stmt
        .query_map([table], |row| {
            Ok(ForeignKeyInfo {
                id: row.get(0)?,
                seq: row.get(1)?,
                referenced_table: row.get(2)?,
                from_column: row.get(3)?,
                to_column: row.get(4)?,
                on_update: row.get(5)?,
                on_delete: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(keys)
}

/// Count the rows of `table`.
///
/// Unlike the pragma helpers, a missing table is an engine error here.
pub fn row_count(conn: &Connection, table: &str) -> DbResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
#[path = "introspect_test.rs"]
mod tests;
