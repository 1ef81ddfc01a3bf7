// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! SQLite connection management.

use std::path::Path;

use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::{EMPLOYEES_TABLE, HISTORY_TABLE, SchemaReport, migrate, table_columns};
use crate::search::casefold;

/// Database open mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read-write access to an existing database
    ReadWrite,
    /// Create new database if it doesn't exist
    Create,
}

/// Employee roster kept in a local SQLite file.
///
/// Holds one connection for its whole lifetime.
pub struct SqliteBackend {
    pub(crate) conn: Connection,
}

impl SqliteBackend {
    /// Open or create a database at a custom path.
    ///
    /// The schema is not touched until [`ensure_schema`](crate::Backend::ensure_schema).
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();
        let flags = match mode {
            OpenMode::ReadWrite => {
                if !path.exists() {
                    return Err(Error::DatabaseNotFound(path.to_owned()));
                }
                OpenFlags::SQLITE_OPEN_READ_WRITE
            }
            OpenMode::Create => OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        };

        let conn = Connection::open_with_flags(path, flags).map_err(|e| Error::DatabaseOpen {
            path: path.to_owned(),
            source: e,
        })?;
        let db = Self { conn };
        db.configure_pragmas()?;
        db.register_functions()?;

        debug!("Opened database at {} ({:?})", path.display(), mode);
        Ok(db)
    }

    /// Create an in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.configure_pragmas()?;
        db.register_functions()?;
        debug!("Created in-memory database");
        Ok(db)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            "#,
        )?;
        Ok(())
    }

    /// `roster_casefold(text)` lowercases exactly like in-memory search.
    /// NULL stays NULL.
    fn register_functions(&self) -> Result<()> {
        self.conn.create_scalar_function(
            "roster_casefold",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: Option<String> = ctx.get(0)?;
                Ok(text.map(|text| casefold(&text)))
            },
        )?;
        Ok(())
    }

    pub(crate) fn migrate(&mut self) -> Result<SchemaReport> {
        migrate(&mut self.conn)
    }

    /// Get raw connection (for advanced usage).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Check if both roster tables exist.
    pub fn has_schema(&self) -> Result<bool> {
        Ok(!table_columns(&self.conn, EMPLOYEES_TABLE)?.is_empty()
            && !table_columns(&self.conn, HISTORY_TABLE)?.is_empty())
    }
}
