//! Tests for the schema assertion checks.

use super::*;
use crate::error::HarnessError;
use crate::migration::Migration;
use std::collections::HashMap;

// ── Helpers ────────────────────────────────────────────────────────────

const CREATE_CUSTOMERS: Migration = Migration::new(
    202502060001,
    "create_customers",
    "CREATE TABLE Customers (Id INTEGER PRIMARY KEY, Email TEXT NOT NULL)",
)
.with_down("DROP TABLE Customers");

const CREATE_ORDERS: Migration = Migration::new(
    202502060002,
    "create_orders",
    "CREATE TABLE Orders (
         Id INTEGER PRIMARY KEY,
         CustomerId INTEGER NOT NULL REFERENCES Customers(Id),
         PlacedAt TEXT
     );
     CREATE INDEX IX_Orders_PlacedAt ON Orders (PlacedAt);",
)
.with_down("DROP TABLE Orders");

/// Migrated assertions over Customers + Orders.
fn shop() -> MigrationAssertions {
    let mut assertions =
        MigrationAssertions::new(MigrationSet::new([CREATE_CUSTOMERS, CREATE_ORDERS]).unwrap())
            .unwrap();
    assertions.setup().unwrap();
    assertions
}

/// Migrated assertions with no migrations; fixtures go through `conn()`.
fn bare() -> MigrationAssertions {
    let mut assertions = MigrationAssertions::new(MigrationSet::empty()).unwrap();
    assertions.setup().unwrap();
    assertions
}

fn exec(assertions: &MigrationAssertions, sql: &str) {
    assertions.conn().unwrap().execute_batch(sql).unwrap();
}

// ── Table existence ────────────────────────────────────────────────────

#[test]
fn table_exists_returns_true_when_table_exists() {
    let assertions = bare();
    exec(&assertions, "CREATE TABLE Users (Id INTEGER PRIMARY KEY, Name TEXT)");
    assert!(assertions.table_exists("Users").unwrap());
}

#[test]
fn table_exists_returns_false_when_table_does_not_exist() {
    let assertions = bare();
    assert!(!assertions.table_exists("NonExistentTable").unwrap());
}

#[test]
fn table_exists_is_case_sensitive() {
    let assertions = shop();
    assert!(assertions.table_exists("Orders").unwrap());
    assert!(!assertions.table_exists("ORDERS").unwrap());
}

#[test]
fn instances_do_not_share_schema() {
    let a = bare();
    let b = bare();
    exec(&a, "CREATE TABLE OnlyInA (Id INTEGER)");
    assert!(a.table_exists("OnlyInA").unwrap());
    assert!(!b.table_exists("OnlyInA").unwrap());
}

// ── Columns ────────────────────────────────────────────────────────────

#[test]
fn table_has_columns_returns_true_when_schema_matches() {
    let assertions = bare();
    exec(
        &assertions,
        "CREATE TABLE Users (Id INTEGER PRIMARY KEY, Name TEXT NOT NULL)",
    );

    let expected = HashMap::from([("Id", "INTEGER"), ("Name", "TEXT")]);
    assert!(assertions.table_has_columns("Users", &expected).unwrap());
}

#[test]
fn table_has_columns_returns_false_when_schema_does_not_match() {
    let assertions = bare();
    exec(
        &assertions,
        "CREATE TABLE Users (Id INTEGER PRIMARY KEY, Name TEXT NOT NULL)",
    );

    let expected = HashMap::from([("Id", "INTEGER"), ("Age", "INTEGER")]);
    assert!(!assertions.table_has_columns("Users", &expected).unwrap());
}

#[test]
fn table_has_columns_compares_declared_type_exactly() {
    let assertions = shop();
    assert!(assertions
        .table_has_columns("Customers", [("Id", "INTEGER")])
        .unwrap());
    assert!(!assertions
        .table_has_columns("Customers", [("Id", "int")])
        .unwrap());
    assert!(!assertions
        .table_has_columns("Customers", [("Id", "integer")])
        .unwrap());
}

#[test]
fn table_has_columns_is_a_subset_check() {
    let assertions = shop();
    assert!(assertions
        .table_has_columns("Orders", [("CustomerId", "INTEGER")])
        .unwrap());
    assert!(assertions
        .table_has_columns("Orders", Vec::<(String, String)>::new())
        .unwrap());
}

#[test]
fn table_has_columns_on_missing_table_is_false() {
    let assertions = shop();
    assert!(!assertions
        .table_has_columns("Ghosts", [("Id", "INTEGER")])
        .unwrap());
    assert!(!assertions
        .table_has_columns("Ghosts", Vec::<(&str, &str)>::new())
        .unwrap());
}

#[test]
fn table_has_columns_accepts_views() {
    let assertions = shop();
    exec(
        &assertions,
        "CREATE VIEW RecentOrders AS SELECT Id, PlacedAt FROM Orders",
    );
    assert!(!assertions.table_exists("RecentOrders").unwrap());
    assert!(assertions
        .table_has_columns("RecentOrders", [("Id", "INTEGER"), ("PlacedAt", "TEXT")])
        .unwrap());
}

// ── Keys and indexes ───────────────────────────────────────────────────

#[test]
fn table_has_primary_key() {
    let assertions = shop();
    assert!(assertions.table_has_primary_key("Orders", "Id").unwrap());
    assert!(!assertions
        .table_has_primary_key("Orders", "CustomerId")
        .unwrap());
    assert!(!assertions.table_has_primary_key("Ghosts", "Id").unwrap());
}

#[test]
fn table_has_primary_key_covers_composite_keys() {
    let assertions = bare();
    exec(
        &assertions,
        "CREATE TABLE OrderLines (OrderId INTEGER, Line INTEGER, PRIMARY KEY (OrderId, Line))",
    );
    assert!(assertions
        .table_has_primary_key("OrderLines", "OrderId")
        .unwrap());
    assert!(assertions.table_has_primary_key("OrderLines", "Line").unwrap());
}

#[test]
fn table_has_unique_constraint_returns_true_when_unique_index_names_column() {
    let assertions = bare();
    exec(
        &assertions,
        "CREATE TABLE Users (Id INTEGER PRIMARY KEY, Email TEXT);
         CREATE UNIQUE INDEX UX_Users_Email ON Users (Email);",
    );
    assert!(assertions
        .table_has_unique_constraint("Users", "Email")
        .unwrap());
    assert!(assertions
        .table_has_unique_constraint("Users", "email")
        .unwrap());
}

#[test]
fn table_has_unique_constraint_returns_false_when_no_unique_index_exists() {
    let assertions = bare();
    exec(
        &assertions,
        "CREATE TABLE Users (Id INTEGER PRIMARY KEY, Email TEXT);
         CREATE INDEX IX_Users_Email ON Users (Email);",
    );
    assert!(!assertions
        .table_has_unique_constraint("Users", "Email")
        .unwrap());
    assert!(!assertions.column_has_unique_index("Users", "Email").unwrap());
}

#[test]
fn table_has_unique_constraint_misses_automatic_index_names() {
    let assertions = bare();
    exec(
        &assertions,
        "CREATE TABLE Users (Id INTEGER PRIMARY KEY, Email TEXT UNIQUE)",
    );
    // The engine names the index sqlite_autoindex_Users_1.
    assert!(!assertions
        .table_has_unique_constraint("Users", "Email")
        .unwrap());
    assert!(assertions.column_has_unique_index("Users", "Email").unwrap());
}

#[test]
fn table_has_unique_constraint_matches_unrelated_index_by_name() {
    let assertions = bare();
    exec(
        &assertions,
        "CREATE TABLE Users (Id INTEGER PRIMARY KEY, Email TEXT, EmailDomain TEXT);
         CREATE UNIQUE INDEX UX_Users_EmailDomain ON Users (EmailDomain);",
    );
    assert!(assertions
        .table_has_unique_constraint("Users", "Email")
        .unwrap());
    assert!(!assertions.column_has_unique_index("Users", "Email").unwrap());
    assert!(assertions
        .column_has_unique_index("Users", "EmailDomain")
        .unwrap());
}

#[test]
fn column_has_unique_index_ignores_composite_and_partial_indexes() {
    let assertions = bare();
    exec(
        &assertions,
        "CREATE TABLE Users (Id INTEGER PRIMARY KEY, Email TEXT, Tenant TEXT, Active INTEGER);
         CREATE UNIQUE INDEX UX_Users_Tenant_Email ON Users (Tenant, Email);
         CREATE UNIQUE INDEX UX_Users_Active_Email ON Users (Email) WHERE Active = 1;",
    );
    assert!(!assertions.column_has_unique_index("Users", "Email").unwrap());
}

#[test]
fn index_exists_matches_exact_name() {
    let assertions = shop();
    assert!(assertions
        .index_exists("Orders", "IX_Orders_PlacedAt")
        .unwrap());
    assert!(!assertions
        .index_exists("Orders", "ix_orders_placedat")
        .unwrap());
    assert!(!assertions
        .index_exists("Customers", "IX_Orders_PlacedAt")
        .unwrap());
}

#[test]
fn table_has_foreign_key() {
    let assertions = shop();
    assert!(assertions
        .table_has_foreign_key("Orders", "CustomerId", "Customers")
        .unwrap());
    assert!(!assertions
        .table_has_foreign_key("Orders", "CustomerId", "Users")
        .unwrap());
    assert!(!assertions
        .table_has_foreign_key("Orders", "Id", "Customers")
        .unwrap());
    assert!(!assertions
        .table_has_foreign_key("Customers", "Id", "Orders")
        .unwrap());
}

// ── Row counts ─────────────────────────────────────────────────────────

#[test]
fn table_has_minimum_rows() {
    let assertions = shop();
    assert!(!assertions.table_has_minimum_rows("Orders", 5).unwrap());
    assert!(assertions.table_has_minimum_rows("Orders", 0).unwrap());

    exec(
        &assertions,
        "INSERT INTO Customers (Email) VALUES ('a@example.com')",
    );
    for _ in 0..5 {
        exec(&assertions, "INSERT INTO Orders (CustomerId) VALUES (1)");
    }

    assert!(assertions.table_has_minimum_rows("Orders", 5).unwrap());
    assert!(!assertions.table_has_minimum_rows("Orders", 6).unwrap());
}

#[test]
fn table_has_minimum_rows_on_missing_table_is_an_error() {
    let assertions = shop();
    let err = assertions
        .table_has_minimum_rows("NeverCreated", 5)
        .unwrap_err();
    assert!(err.is_missing_table(), "unexpected error: {err}");
}

// ── Lifecycle ──────────────────────────────────────────────────────────

#[test]
fn cleanup_removes_migrated_tables() {
    let mut assertions = shop();
    assert!(assertions.table_exists("Orders").unwrap());

    assertions.cleanup().unwrap();

    assert_eq!(assertions.state(), HarnessState::RolledBack);
    assert!(!assertions.table_exists("Orders").unwrap());
    assert!(!assertions.table_exists("Customers").unwrap());
}

#[test]
fn dispose_twice_then_assert_fails() {
    let mut assertions = shop();
    assertions.dispose().unwrap();
    assertions.dispose().unwrap();

    assert_eq!(assertions.state(), HarnessState::Disposed);
    assert!(matches!(
        assertions.table_exists("Orders"),
        Err(HarnessError::Disposed(_))
    ));
    assert!(matches!(
        assertions.setup(),
        Err(HarnessError::Disposed(_))
    ));
}
