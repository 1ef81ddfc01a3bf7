// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! The storage capability shared by every roster backend.
//!
//! A backend owns both the employee records and the history. Writes go
//! through a [`WriteUnit`]: the coordinator applies one [`Change`], records
//! one [`AuditEntry`] and commits. Dropping a unit without committing
//! abandons it.

use crate::error::Result;
use crate::schema::SchemaReport;
use crate::search::SearchQuery;
use crate::types::{Action, Employee, EmployeeUpdate, HistoryEvent, Outcome};

/// How much a backend's [`WriteUnit`] guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atomicity {
    /// Record change and history entry commit together or not at all.
    Atomic,
    /// Each write is durable as soon as it returns. A failed history
    /// write leaves the record change in place.
    WriteThrough,
}

/// A single record mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Insert(Employee),
    Update {
        identifier: String,
        update: EmployeeUpdate,
    },
    /// Set `termed = Yes` and `status = Inactive`.
    Term { identifier: String },
    Delete { identifier: String },
}

impl Change {
    pub fn identifier(&self) -> &str {
        match self {
            Change::Insert(employee) => &employee.identifier,
            Change::Update { identifier, .. }
            | Change::Term { identifier }
            | Change::Delete { identifier } => identifier,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Change::Insert(_) => Action::Added,
            Change::Update { .. } => Action::Updated,
            Change::Term { .. } => Action::Termed,
            Change::Delete { .. } => Action::Deleted,
        }
    }
}

/// A history entry before the store assigns its sequence and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub action: Action,
    pub details: String,
    pub editor: String,
}

impl AuditEntry {
    pub fn for_change(change: &Change, editor: &str) -> Self {
        let action = change.action();
        Self {
            action,
            details: action.details(change.identifier()),
            editor: editor.to_owned(),
        }
    }
}

/// One pending write against a backend.
pub trait WriteUnit {
    /// Apply a record mutation, reporting whether a record was affected.
    fn apply(&mut self, change: &Change) -> Result<Outcome>;

    /// Append a history entry.
    fn record(&mut self, entry: &AuditEntry) -> Result<()>;

    /// Make the unit's writes durable.
    fn commit(self) -> Result<()>;
}

/// Employee records plus their history, behind one storage handle.
pub trait Backend {
    type Unit<'a>: WriteUnit
    where
        Self: 'a;

    /// Bring the stored shape up to date. Idempotent.
    fn ensure_schema(&mut self) -> Result<SchemaReport>;

    fn atomicity(&self) -> Atomicity;

    /// Start a write unit.
    fn begin(&mut self) -> Result<Self::Unit<'_>>;

    /// Every employee in storage order.
    fn employees(&self) -> Result<Vec<Employee>>;

    /// Employees matching `query`, in storage order.
    fn search(&self, query: &SearchQuery) -> Result<Vec<Employee>> {
        Ok(query.filter(self.employees()?))
    }

    /// The full history, newest first.
    fn history(&self) -> Result<Vec<HistoryEvent>>;
}
