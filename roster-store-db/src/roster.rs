// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! The roster: record operations bound to their history entries.

use std::path::Path;

use tracing::{debug, error, warn};

use crate::backend::{Atomicity, AuditEntry, Backend, Change, WriteUnit};
use crate::connection::{OpenMode, SqliteBackend};
use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::schema::SchemaReport;
use crate::search::SearchQuery;
use crate::types::{Employee, EmployeeUpdate, HistoryEvent, Outcome};

/// Employee roster over any [`Backend`].
///
/// Mutations take `&mut self`, so writes are serialized and history
/// entries appear in commit order.
pub struct RosterDb<B> {
    backend: B,
    editor: Editor,
    schema: SchemaReport,
}

impl RosterDb<SqliteBackend> {
    /// Open a SQLite roster file, creating it if `mode` allows.
    pub fn open_sqlite<P: AsRef<Path>>(path: P, mode: OpenMode, editor: Editor) -> Result<Self> {
        Self::open(SqliteBackend::open(path, mode)?, editor)
    }

    /// A throwaway in-memory roster.
    pub fn open_memory(editor: Editor) -> Result<Self> {
        Self::open(SqliteBackend::open_memory()?, editor)
    }
}

impl<B: Backend> RosterDb<B> {
    /// Bring the backend's schema up to date and start accepting operations.
    ///
    /// `editor` is recorded on every history entry written through this roster.
    pub fn open(mut backend: B, editor: Editor) -> Result<Self> {
        let schema = backend.ensure_schema()?;
        if let Some(backup) = &schema.quarantined_to {
            warn!("Employee storage was corrupted; old data kept in {backup}");
        }
        debug!("Roster ready for {editor} ({:?})", backend.atomicity());
        Ok(Self {
            backend,
            editor,
            schema,
        })
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// What schema management did when this roster was opened.
    pub fn schema_report(&self) -> &SchemaReport {
        &self.schema
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Add a new employee. Fails with [`Outcome::DuplicateKey`] if the
    /// identifier is taken.
    pub fn insert(&mut self, employee: Employee) -> Result<Outcome> {
        self.commit(Change::Insert(employee))
    }

    /// Replace the mutable fields of an existing employee.
    pub fn update(&mut self, identifier: &str, update: EmployeeUpdate) -> Result<Outcome> {
        self.commit(Change::Update {
            identifier: identifier.to_owned(),
            update,
        })
    }

    /// Mark an employee as termed and inactive.
    pub fn term(&mut self, identifier: &str) -> Result<Outcome> {
        self.commit(Change::Term {
            identifier: identifier.to_owned(),
        })
    }

    pub fn delete(&mut self, identifier: &str) -> Result<Outcome> {
        self.commit(Change::Delete {
            identifier: identifier.to_owned(),
        })
    }

    pub fn employees(&self) -> Result<Vec<Employee>> {
        self.backend.employees()
    }

    pub fn search(&self, query: &str) -> Result<Vec<Employee>> {
        self.backend.search(&SearchQuery::new(query))
    }

    /// History, newest first.
    pub fn history(&self) -> Result<Vec<HistoryEvent>> {
        self.backend.history()
    }

    /// Apply `change` and write its history entry as one unit.
    fn commit(&mut self, change: Change) -> Result<Outcome> {
        let entry = AuditEntry::for_change(&change, self.editor.as_str());
        let atomicity = self.backend.atomicity();

        let mut unit = self.backend.begin()?;
        let outcome = unit.apply(&change)?;
        if !outcome.is_applied() {
            debug!("{} for '{}': {outcome:?}", entry.action, change.identifier());
            return Ok(outcome);
        }

        if let Err(source) = unit.record(&entry) {
            return Err(match atomicity {
                Atomicity::Atomic => source,
                Atomicity::WriteThrough => {
                    warn!(
                        "{} for '{}' is stored without a history entry: {source}",
                        entry.action,
                        change.identifier()
                    );
                    Error::AuditIncomplete {
                        identifier: change.identifier().to_owned(),
                        action: entry.action.as_str(),
                        source: Box::new(source),
                    }
                }
            });
        }

        unit.commit()?;
        debug!("{} by {}", entry.details, entry.editor);
        Ok(outcome)
    }

    pub fn insert_employee(&mut self, employee: Employee) -> bool {
        let identifier = employee.identifier.clone();
        succeeded("insert", &identifier, self.insert(employee))
    }

    pub fn update_employee(&mut self, identifier: &str, update: EmployeeUpdate) -> bool {
        succeeded("update", identifier, self.update(identifier, update))
    }

    pub fn delete_employee(&mut self, identifier: &str) -> bool {
        succeeded("delete", identifier, self.delete(identifier))
    }

    pub fn term_employee(&mut self, identifier: &str) -> bool {
        succeeded("term", identifier, self.term(identifier))
    }

    pub fn fetch_employees(&self) -> Vec<Employee> {
        or_empty("fetch employees", self.employees())
    }

    pub fn search_employees(&self, query: &str) -> Vec<Employee> {
        or_empty("search employees", self.search(query))
    }

    pub fn fetch_history(&self) -> Vec<HistoryEvent> {
        or_empty("fetch history", self.history())
    }
}

fn succeeded(op: &str, identifier: &str, result: Result<Outcome>) -> bool {
    match result {
        Ok(outcome) => outcome.is_applied(),
        Err(e) => {
            error!("Failed to {op} employee '{identifier}': {e}");
            false
        }
    }
}

fn or_empty<T>(op: &str, result: Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        error!("Failed to {op}: {e}");
        Vec::new()
    })
}
