// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! A document store kept in one JSON file.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use super::{Document, DocumentStore, Fields};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    next_sequence: u64,
    collections: BTreeMap<String, Vec<Document>>,
}

impl Snapshot {
    fn collection_mut(&mut self, name: &str) -> &mut Vec<Document> {
        self.collections.entry(name.to_owned()).or_default()
    }

    fn position(&self, collection: &str, key: &str) -> Option<usize> {
        self.collections
            .get(collection)?
            .iter()
            .position(|doc| doc.key == key)
    }

    fn stamp(&mut self, key: Option<&str>, fields: Fields) -> Document {
        self.next_sequence += 1;
        let sequence = self.next_sequence;
        Document {
            key: key.map_or_else(|| format!("{sequence:016x}"), str::to_owned),
            sequence,
            created_at: SystemTime::now(),
            fields,
        }
    }
}

/// Document store persisted as a JSON snapshot, or held in memory only.
///
/// Each write replaces the file atomically; a failed write leaves both
/// the file and the in-memory state as they were.
#[derive(Debug, Default)]
pub struct LocalDocumentStore {
    path: Option<PathBuf>,
    snapshot: Snapshot,
}

impl LocalDocumentStore {
    /// Open the store at `path`, starting empty if the file is absent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let snapshot = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|e| Error::DocumentIo {
                path: path.to_owned(),
                source: e,
            })?;
            serde_json::from_str(&contents)?
        } else {
            Snapshot::default()
        };
        debug!("Opened document store at {}", path.display());
        Ok(Self {
            path: Some(path.to_owned()),
            snapshot,
        })
    }

    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |source| Error::DocumentIo {
            path: path.clone(),
            source,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&serde_json::to_vec_pretty(snapshot)?)
            .map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    /// Run `f` on a copy of the state and keep it only once it is on disk.
    fn write<T>(&mut self, f: impl FnOnce(&mut Snapshot) -> T) -> Result<T> {
        let mut next = self.snapshot.clone();
        let out = f(&mut next);
        self.persist(&next)?;
        self.snapshot = next;
        Ok(out)
    }
}

impl DocumentStore for LocalDocumentStore {
    fn create(&mut self, collection: &str, key: &str, fields: Fields) -> Result<bool> {
        if self.snapshot.position(collection, key).is_some() {
            return Ok(false);
        }
        self.write(|snapshot| {
            let doc = snapshot.stamp(Some(key), fields);
            snapshot.collection_mut(collection).push(doc);
            true
        })
    }

    fn update(&mut self, collection: &str, key: &str, fields: Fields) -> Result<bool> {
        let Some(index) = self.snapshot.position(collection, key) else {
            return Ok(false);
        };
        self.write(|snapshot| {
            let doc = &mut snapshot.collection_mut(collection)[index];
            doc.fields.extend(fields);
            true
        })
    }

    fn delete(&mut self, collection: &str, key: &str) -> Result<bool> {
        let Some(index) = self.snapshot.position(collection, key) else {
            return Ok(false);
        };
        self.write(|snapshot| {
            snapshot.collection_mut(collection).remove(index);
            true
        })
    }

    fn append(&mut self, collection: &str, fields: Fields) -> Result<Document> {
        self.write(|snapshot| {
            let doc = snapshot.stamp(None, fields);
            snapshot.collection_mut(collection).push(doc.clone());
            doc
        })
    }

    fn scan(&self, collection: &str) -> Result<Vec<Document>> {
        Ok(self
            .snapshot
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }
}
