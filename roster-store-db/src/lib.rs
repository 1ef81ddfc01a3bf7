// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! Persistence and audit layer for an employee roster.
//!
//! Records live in either a local SQLite file or a document store. Every
//! successful insert, update, term and delete writes exactly one history
//! entry naming the editor, in the same unit as the record change.
//!
//! # Key Features
//!
//! - Unique identifiers, with duplicates and missing records reported as
//!   an [`Outcome`] rather than an error
//! - Schema migration on open (adds `termed`, quarantines tables that are
//!   not keyed by identifier)
//! - Case-insensitive substring search across every field
//! - Append-only history, newest first
//!
//! # Example
//!
//! ```ignore
//! use roster_store_db::{Editor, Employee, OpenMode, RosterDb, Status};
//!
//! let mut db = RosterDb::open_sqlite(
//!     "employees.db",
//!     OpenMode::Create,
//!     Editor::from_environment(),
//! )?;
//! db.insert_employee(Employee::new("a@x.com", "A", "B", "Eng", "Co", Status::Active));
//! db.term_employee("a@x.com");
//! for event in db.fetch_history() {
//!     println!("{} {}", event.action, event.details);
//! }
//! ```

mod backend;
mod connection;
pub mod documents;
mod editor;
mod error;
mod query;
mod roster;
mod schema;
mod search;
mod types;
mod write;

pub use backend::{Atomicity, AuditEntry, Backend, Change, WriteUnit};
pub use connection::{OpenMode, SqliteBackend};
pub use editor::Editor;
pub use error::{Error, ErrorKind, Result};
pub use roster::RosterDb;
pub use schema::{
    EMPLOYEES_TABLE, HISTORY_TABLE, QUARANTINE_TABLE, SCHEMA_VERSION, SchemaReport, SchemaState,
};
pub use search::SearchQuery;
pub use types::*;
pub use write::SqliteUnit;
