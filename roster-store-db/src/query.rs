// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! Read queries for the SQLite roster.

use rusqlite::{OptionalExtension, Row, params};

use crate::connection::SqliteBackend;
use crate::error::Result;
use crate::search::SearchQuery;
use crate::types::{Employee, HistoryEvent, Status, Termed, unix_millis_to_system_time};

/// Text column that may be NULL in tables migrated from older releases.
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        identifier: text(row, 0)?,
        first_name: text(row, 1)?,
        last_name: text(row, 2)?,
        role: text(row, 3)?,
        company: text(row, 4)?,
        status: row.get::<_, Option<Status>>(5)?.unwrap_or(Status::Active),
        termed: row.get::<_, Option<Termed>>(6)?.unwrap_or_default(),
    })
}

impl SqliteBackend {
    /// All employees in storage (rowid) order.
    pub(crate) fn query_employees(&self) -> Result<Vec<Employee>> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT identifier, first_name, last_name, role, company, status, termed
            FROM employees
            ORDER BY rowid
            "#,
        )?;

        let employees = stmt
            .query_map([], employee_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(employees)
    }

    /// Look up one employee by identifier.
    pub fn query_employee(&self, identifier: &str) -> Result<Option<Employee>> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT identifier, first_name, last_name, role, company, status, termed
            FROM employees
            WHERE identifier = ?1
            "#,
        )?;

        Ok(stmt
            .query_row(params![identifier], employee_from_row)
            .optional()?)
    }

    /// Substring search evaluated inside SQLite.
    ///
    /// Uses `instr` rather than `LIKE` so `%` and `_` in the needle stay literal.
    pub(crate) fn query_search(&self, query: &SearchQuery) -> Result<Vec<Employee>> {
        if query.is_empty() {
            return self.query_employees();
        }

        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT identifier, first_name, last_name, role, company, status, termed
            FROM employees
            WHERE instr(roster_casefold(identifier), ?1) > 0
               OR instr(roster_casefold(first_name), ?1) > 0
               OR instr(roster_casefold(last_name), ?1) > 0
               OR instr(roster_casefold(role), ?1) > 0
               OR instr(roster_casefold(company), ?1) > 0
               OR instr(roster_casefold(status), ?1) > 0
               OR instr(roster_casefold(termed), ?1) > 0
            ORDER BY rowid
            "#,
        )?;

        let employees = stmt
            .query_map(params![query.needle()], employee_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(employees)
    }

    /// History newest first, ties broken by insertion sequence.
    pub(crate) fn query_history(&self) -> Result<Vec<HistoryEvent>> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT id, timestamp, action, details, editor
            FROM history
            ORDER BY timestamp DESC, id DESC
            "#,
        )?;

        let events = stmt
            .query_map([], |row| {
                Ok(HistoryEvent {
                    sequence_id: row.get(0)?,
                    timestamp: unix_millis_to_system_time(row.get(1)?),
                    action: row.get(2)?,
                    details: row.get(3)?,
                    editor: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    /// Count the number of employees.
    pub fn count_employees(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
