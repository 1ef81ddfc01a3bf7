// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! Opening databases written by older releases.

use rusqlite::Connection;

use roster_store_db::{Editor, OpenMode, RosterDb, Status, Termed};
use roster_utils_test::TempRosterDir;

fn seed(dir: &TempRosterDir, sql: &str) {
    let conn = Connection::open(dir.db_path()).unwrap();
    conn.execute_batch(sql).unwrap();
}

fn open(dir: &TempRosterDir) -> RosterDb<roster_store_db::SqliteBackend> {
    RosterDb::open_sqlite(dir.db_path(), OpenMode::ReadWrite, Editor::new("migrator")).unwrap()
}

/// Rows from before the termed flag gain `termed = No`.
#[test]
fn test_adds_termed_column() {
    let dir = TempRosterDir::new().unwrap();
    seed(
        &dir,
        r#"
        create table employees (
            identifier text primary key,
            first_name text not null,
            last_name  text not null,
            role       text not null,
            company    text not null,
            status     text not null
        );
        insert into employees values ('a@x.com', 'A', 'B', 'Eng', 'Co', 'Active');
        insert into employees values ('c@x.com', 'C', 'D', 'Ops', 'Co', 'Inactive');
        "#,
    );

    let db = open(&dir);
    let report = db.schema_report();
    assert!(report.added_termed);
    assert!(!report.created);
    assert_eq!(report.quarantined_to, None);

    let rows = db.employees().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|e| e.termed == Termed::No));
    assert_eq!(rows[1].status, Status::Inactive);
    assert_eq!(rows[0].role, "Eng");
}

/// NULLs left in nullable legacy columns read back as empty text.
#[test]
fn test_legacy_nulls_stay_readable() {
    let dir = TempRosterDir::new().unwrap();
    seed(
        &dir,
        r#"
        create table employees (
            identifier text primary key,
            first_name text,
            last_name  text,
            role       text,
            company    text,
            status     text
        );
        insert into employees values ('a@x.com', 'A', 'B', NULL, 'Acme', 'Active');
        insert into employees values ('c@x.com', 'C', 'D', 'Ops', NULL, NULL);
        "#,
    );

    let mut db = open(&dir);
    assert!(db.schema_report().added_termed);

    let rows = db.fetch_employees();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].role, "");
    assert_eq!(rows[1].company, "");
    assert_eq!(rows[1].status, Status::Active);

    assert_eq!(db.search_employees("acme").len(), 1);
    assert_eq!(db.search_employees("OPS")[0].identifier, "c@x.com");
    assert!(db.term_employee("a@x.com"));
    assert_eq!(db.search_employees("yes")[0].identifier, "a@x.com");
}

/// A table keyed by something other than identifier is moved aside intact.
#[test]
fn test_quarantines_legacy_table() {
    let dir = TempRosterDir::new().unwrap();
    seed(
        &dir,
        r#"
        create table employees (
            id     text primary key,
            name   text,
            role   text,
            gender text,
            status text
        );
        insert into employees values ('1', 'John Doe', 'Software Engineer', 'Male', 'Active');
        "#,
    );

    let mut db = open(&dir);
    assert_eq!(
        db.schema_report().quarantined_to.as_deref(),
        Some("employees_corrupted_backup")
    );
    assert!(db.employees().unwrap().is_empty());

    let name: String = db
        .backend()
        .connection()
        .query_row(
            "SELECT name FROM employees_corrupted_backup WHERE id = '1'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(name, "John Doe");

    assert!(db.insert_employee(roster_store_db::Employee::new(
        "1",
        "John",
        "Doe",
        "Software Engineer",
        "AFO",
        Status::Active,
    )));
}

/// An identifier column that is not the key still counts as corrupted.
#[test]
fn test_unkeyed_identifier_is_quarantined() {
    let dir = TempRosterDir::new().unwrap();
    seed(
        &dir,
        r#"
        create table employees (identifier text, first_name text);
        create table employees_corrupted_backup (anything text);
        "#,
    );

    let db = open(&dir);
    assert_eq!(
        db.schema_report().quarantined_to.as_deref(),
        Some("employees_corrupted_backup_1")
    );
    let kept: i64 = db
        .backend()
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'employees_corrupted_backup'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(kept, 1);
}

/// History from older releases is kept and extended.
#[test]
fn test_existing_history_kept() {
    let dir = TempRosterDir::new().unwrap();
    seed(
        &dir,
        r#"
        create table history (
            id        integer primary key autoincrement not null,
            timestamp integer not null,
            action    text not null,
            details   text not null,
            editor    text not null
        );
        insert into history (timestamp, action, details, editor)
            values (1000, 'Employee Added', 'Added employee: old@x.com', 'legacy');
        "#,
    );

    let mut db = open(&dir);
    assert!(db.schema_report().created);
    db.insert(roster_store_db::Employee::new(
        "new@x.com",
        "N",
        "E",
        "Eng",
        "Co",
        Status::Active,
    ))
    .unwrap();

    let history = db.history().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].editor, "migrator");
    assert_eq!(history[1].editor, "legacy");
}
