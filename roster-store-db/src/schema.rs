// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! Table definitions and schema migration.
//!
//! The employee table is checked column by column on every open and
//! brought to the current shape by one named step.

use std::collections::BTreeMap;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::error::Result;

pub const EMPLOYEES_TABLE: &str = "employees";
pub const HISTORY_TABLE: &str = "history";
/// Base name a corrupted employee table is moved to.
pub const QUARANTINE_TABLE: &str = "employees_corrupted_backup";

/// Employee table, current shape.
pub const EMPLOYEES_SQL: &str = r#"
create table if not exists employees (
    identifier text primary key not null,
    first_name text not null,
    last_name  text not null,
    role       text not null,
    company    text not null,
    status     text not null,
    termed     text not null default 'No'
);
"#;

/// History table. Rows are never updated or deleted.
pub const HISTORY_SQL: &str = r#"
create table if not exists history (
    id        integer primary key autoincrement not null,
    timestamp integer not null,
    action    text not null,
    details   text not null,
    editor    text not null
);

create index if not exists IndexHistoryTimestamp on history(timestamp, id);
"#;

const ADD_TERMED_SQL: &str = "alter table employees add column termed text not null default 'No'";

/// Schema version recorded in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 2;

/// Shape of an existing employee table or collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Missing,
    Current,
    /// Predates the `termed` flag
    LacksTermed,
    /// Has columns but `identifier` is missing or not the primary key
    Corrupted,
}

impl SchemaState {
    /// Classify a table from its columns, given as `(name, is_primary_key)`.
    pub fn classify<'a>(columns: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        let columns: BTreeMap<&str, bool> = columns.into_iter().collect();
        if columns.is_empty() {
            SchemaState::Missing
        } else if columns.get("identifier") != Some(&true) {
            SchemaState::Corrupted
        } else if !columns.contains_key("termed") {
            SchemaState::LacksTermed
        } else {
            SchemaState::Current
        }
    }
}

/// What `ensure_schema` found and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    /// Employee storage did not exist and was created
    pub created: bool,
    /// Records gained `termed = No`
    pub added_termed: bool,
    /// Name the corrupted employee storage was moved to
    pub quarantined_to: Option<String>,
}

impl SchemaReport {
    pub fn is_unchanged(&self) -> bool {
        *self == SchemaReport::default()
    }
}

/// `(name, is_primary_key)` for every column of `table`; empty if absent.
pub(crate) fn table_columns(conn: &Connection, table: &str) -> Result<Vec<(String, bool)>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(1)?, row.get::<_, i64>(5)? > 0))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare_cached("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    Ok(stmt.exists([table])?)
}

/// The `n`th backup name: the base name, then `_1`, `_2` and so on.
pub(crate) fn quarantine_name(n: u32) -> String {
    if n == 0 {
        QUARANTINE_TABLE.to_owned()
    } else {
        format!("{QUARANTINE_TABLE}_{n}")
    }
}

/// First quarantine name not already taken. Existing backups stay put.
fn free_quarantine_name(conn: &Connection) -> Result<String> {
    let mut n = 0;
    loop {
        let candidate = quarantine_name(n);
        if !table_exists(conn, &candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Bring a SQLite database to the current schema inside one transaction.
pub(crate) fn migrate(conn: &mut Connection) -> Result<SchemaReport> {
    let tx = conn.transaction()?;
    let columns = table_columns(&tx, EMPLOYEES_TABLE)?;
    let state = SchemaState::classify(columns.iter().map(|(name, key)| (name.as_str(), *key)));
    let mut report = SchemaReport::default();

    match state {
        SchemaState::Current => {}
        SchemaState::Missing => {
            report.created = true;
        }
        SchemaState::LacksTermed => {
            tx.execute(ADD_TERMED_SQL, [])?;
            info!("Added termed column to {EMPLOYEES_TABLE}");
            report.added_termed = true;
        }
        SchemaState::Corrupted => {
            let backup = free_quarantine_name(&tx)?;
            tx.execute(
                &format!("ALTER TABLE {EMPLOYEES_TABLE} RENAME TO {backup}"),
                [],
            )?;
            warn!(
                "{EMPLOYEES_TABLE} is not keyed by identifier (columns {columns:?}); moved it to {backup}"
            );
            report.created = true;
            report.quarantined_to = Some(backup);
        }
    }

    tx.execute_batch(EMPLOYEES_SQL)?;
    tx.execute_batch(HISTORY_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))?;
    tx.commit()?;

    if report.is_unchanged() {
        debug!("Schema is current");
    } else {
        debug!("Schema updated: {report:?}");
    }
    Ok(report)
}
