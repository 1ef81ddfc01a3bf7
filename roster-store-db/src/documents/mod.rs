// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! Document-store backend.
//!
//! The roster only needs five primitives from a document database:
//! conditional create, merge-update by key, delete by key, a full
//! collection scan, and append with a store-assigned key, sequence and
//! timestamp. [`DocumentStore`] names exactly those, so a hosted client
//! and [`LocalDocumentStore`] are interchangeable.

mod backend;
mod local;

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub use backend::{DocumentBackend, DocumentUnit};
pub use local::LocalDocumentStore;

/// Field map of a document.
pub type Fields = Map<String, Value>;

/// A stored document with its store-assigned metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub key: String,
    /// Store-wide write sequence at creation
    pub sequence: u64,
    /// Store clock at creation
    pub created_at: SystemTime,
    pub fields: Fields,
}

/// Client capability of a document database.
pub trait DocumentStore {
    /// Create `key` unless it already exists. Returns `false` if it did.
    fn create(&mut self, collection: &str, key: &str, fields: Fields) -> Result<bool>;

    /// Merge `fields` into an existing document. Returns `false` if absent.
    fn update(&mut self, collection: &str, key: &str, fields: Fields) -> Result<bool>;

    /// Remove a document. Returns `false` if absent.
    fn delete(&mut self, collection: &str, key: &str) -> Result<bool>;

    /// Add a document under a store-assigned key.
    fn append(&mut self, collection: &str, fields: Fields) -> Result<Document>;

    /// Every document of `collection` in storage order.
    fn scan(&self, collection: &str) -> Result<Vec<Document>>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Box<S> {
    fn create(&mut self, collection: &str, key: &str, fields: Fields) -> Result<bool> {
        (**self).create(collection, key, fields)
    }

    fn update(&mut self, collection: &str, key: &str, fields: Fields) -> Result<bool> {
        (**self).update(collection, key, fields)
    }

    fn delete(&mut self, collection: &str, key: &str) -> Result<bool> {
        (**self).delete(collection, key)
    }

    fn append(&mut self, collection: &str, fields: Fields) -> Result<Document> {
        (**self).append(collection, fields)
    }

    fn scan(&self, collection: &str) -> Result<Vec<Document>> {
        (**self).scan(collection)
    }
}

/// Serialize a struct into a document field map.
pub(crate) fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::document_store(format!(
            "expected a field map, got {other}"
        ))),
    }
}
