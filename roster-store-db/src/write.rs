// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! Write operations for the SQLite roster.
//!
//! Every write runs inside one SQLite transaction that also carries the
//! history row, so both land or neither does.

use std::time::SystemTime;

use rusqlite::{Transaction, params};

use crate::backend::{Atomicity, AuditEntry, Backend, Change, WriteUnit};
use crate::connection::SqliteBackend;
use crate::error::Result;
use crate::schema::SchemaReport;
use crate::search::SearchQuery;
use crate::types::{Employee, HistoryEvent, Outcome, Status, Termed, system_time_to_unix_millis};

/// An open SQLite transaction. Rolled back on drop unless committed.
pub struct SqliteUnit<'a> {
    tx: Transaction<'a>,
}

impl SqliteUnit<'_> {
    fn affected(rows: usize) -> Outcome {
        if rows > 0 {
            Outcome::Applied
        } else {
            Outcome::NotFound
        }
    }
}

impl WriteUnit for SqliteUnit<'_> {
    fn apply(&mut self, change: &Change) -> Result<Outcome> {
        let outcome = match change {
            Change::Insert(employee) => {
                let rows = self.tx.execute(
                    r#"
                    INSERT INTO employees (identifier, first_name, last_name, role, company, status, termed)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ON CONFLICT(identifier) DO NOTHING
                    "#,
                    params![
                        employee.identifier,
                        employee.first_name,
                        employee.last_name,
                        employee.role,
                        employee.company,
                        employee.status,
                        employee.termed,
                    ],
                )?;
                if rows > 0 {
                    Outcome::Applied
                } else {
                    Outcome::DuplicateKey
                }
            }
            Change::Update { identifier, update } => {
                let rows = self.tx.execute(
                    r#"
                    UPDATE employees
                    SET first_name = ?2, last_name = ?3, role = ?4, company = ?5, status = ?6,
                        termed = coalesce(?7, termed)
                    WHERE identifier = ?1
                    "#,
                    params![
                        identifier,
                        update.first_name,
                        update.last_name,
                        update.role,
                        update.company,
                        update.status,
                        update.termed,
                    ],
                )?;
                Self::affected(rows)
            }
            Change::Term { identifier } => {
                let rows = self.tx.execute(
                    "UPDATE employees SET termed = ?2, status = ?3 WHERE identifier = ?1",
                    params![identifier, Termed::Yes, Status::Inactive],
                )?;
                Self::affected(rows)
            }
            Change::Delete { identifier } => {
                let rows = self.tx.execute(
                    "DELETE FROM employees WHERE identifier = ?1",
                    params![identifier],
                )?;
                Self::affected(rows)
            }
        };
        Ok(outcome)
    }

    fn record(&mut self, entry: &AuditEntry) -> Result<()> {
        self.tx.execute(
            r#"
            INSERT INTO history (timestamp, action, details, editor)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                system_time_to_unix_millis(SystemTime::now()),
                entry.action.as_str(),
                entry.details,
                entry.editor,
            ],
        )?;
        Ok(())
    }

    fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

impl Backend for SqliteBackend {
    type Unit<'a> = SqliteUnit<'a>;

    fn ensure_schema(&mut self) -> Result<SchemaReport> {
        self.migrate()
    }

    fn atomicity(&self) -> Atomicity {
        Atomicity::Atomic
    }

    fn begin(&mut self) -> Result<SqliteUnit<'_>> {
        Ok(SqliteUnit {
            tx: self.conn.transaction()?,
        })
    }

    fn employees(&self) -> Result<Vec<Employee>> {
        self.query_employees()
    }

    fn search(&self, query: &SearchQuery) -> Result<Vec<Employee>> {
        self.query_search(query)
    }

    fn history(&self) -> Result<Vec<HistoryEvent>> {
        self.query_history()
    }
}
