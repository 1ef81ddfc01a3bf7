// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{DocumentStore, Fields, to_fields};
use crate::backend::{Atomicity, AuditEntry, Backend, Change, WriteUnit};
use crate::error::{Error, Result};
use crate::schema::{EMPLOYEES_TABLE, HISTORY_TABLE, SchemaReport, SchemaState, quarantine_name};
use crate::types::{Employee, HistoryEvent, Outcome, Status, Termed, sort_newest_first};

#[derive(Serialize)]
struct UpdateFields<'a> {
    first_name: &'a str,
    last_name: &'a str,
    role: &'a str,
    company: &'a str,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    termed: Option<Termed>,
}

/// Roster over a [`DocumentStore`], one document per employee keyed by
/// identifier.
///
/// Writes are [`Atomicity::WriteThrough`]: the record change is durable
/// before the history entry is attempted.
#[derive(Debug)]
pub struct DocumentBackend<S> {
    store: S,
}

impl<S: DocumentStore> DocumentBackend<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Move every employee document into the first empty backup
    /// collection and return its name. Earlier backups are left as they are.
    fn quarantine(&mut self) -> Result<String> {
        let mut n = 0;
        let backup = loop {
            let candidate = quarantine_name(n);
            if self.store.scan(&candidate)?.is_empty() {
                break candidate;
            }
            n += 1;
        };
        for doc in self.store.scan(EMPLOYEES_TABLE)? {
            if !self.store.create(&backup, &doc.key, doc.fields)? {
                return Err(Error::document_store(format!("{backup} already holds '{}'", doc.key)));
            }
            self.store.delete(EMPLOYEES_TABLE, &doc.key)?;
        }
        Ok(backup)
    }
}

fn string_field(fields: &Fields, name: &'static str) -> Result<String> {
    match fields.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        other => Err(Error::InvalidValue {
            field: name,
            value: format!("{other:?}"),
        }),
    }
}

fn has_key(fields: &Fields) -> bool {
    matches!(fields.get("identifier"), Some(Value::String(_)))
}

impl<S: DocumentStore> Backend for DocumentBackend<S> {
    type Unit<'a>
        = DocumentUnit<'a, S>
    where
        Self: 'a;

    fn ensure_schema(&mut self) -> Result<SchemaReport> {
        let docs = self.store.scan(EMPLOYEES_TABLE)?;
        let state = if docs.is_empty() {
            SchemaState::Missing
        } else if !docs.iter().all(|doc| has_key(&doc.fields)) {
            SchemaState::Corrupted
        } else if docs.iter().any(|doc| !doc.fields.contains_key("termed")) {
            SchemaState::LacksTermed
        } else {
            SchemaState::Current
        };

        let mut report = SchemaReport::default();
        match state {
            SchemaState::Missing | SchemaState::Current => {}
            SchemaState::LacksTermed => {
                let backfill = to_fields(&json!({ "termed": Termed::No }))?;
                for doc in docs.iter().filter(|doc| !doc.fields.contains_key("termed")) {
                    self.store
                        .update(EMPLOYEES_TABLE, &doc.key, backfill.clone())?;
                }
                info!("Added termed to employee documents");
                report.added_termed = true;
            }
            SchemaState::Corrupted => {
                let backup = self.quarantine()?;
                warn!("Employee documents without identifier; moved them to {backup}");
                report.created = true;
                report.quarantined_to = Some(backup);
            }
        }
        Ok(report)
    }

    fn atomicity(&self) -> Atomicity {
        Atomicity::WriteThrough
    }

    fn begin(&mut self) -> Result<DocumentUnit<'_, S>> {
        Ok(DocumentUnit {
            store: &mut self.store,
        })
    }

    fn employees(&self) -> Result<Vec<Employee>> {
        self.store
            .scan(EMPLOYEES_TABLE)?
            .into_iter()
            .map(|doc| -> Result<Employee> {
                Ok(serde_json::from_value(Value::Object(doc.fields))?)
            })
            .collect()
    }

    fn history(&self) -> Result<Vec<HistoryEvent>> {
        let mut events = self
            .store
            .scan(HISTORY_TABLE)?
            .into_iter()
            .map(|doc| -> Result<HistoryEvent> {
                Ok(HistoryEvent {
                    sequence_id: doc.sequence as i64,
                    timestamp: doc.created_at,
                    action: string_field(&doc.fields, "action")?,
                    details: string_field(&doc.fields, "details")?,
                    editor: string_field(&doc.fields, "editor")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        sort_newest_first(&mut events);
        Ok(events)
    }
}

/// Writes straight through to the document store.
pub struct DocumentUnit<'a, S> {
    store: &'a mut S,
}

impl<S: DocumentStore> WriteUnit for DocumentUnit<'_, S> {
    fn apply(&mut self, change: &Change) -> Result<Outcome> {
        let (done, missing) = match change {
            Change::Insert(employee) => (
                self.store
                    .create(EMPLOYEES_TABLE, &employee.identifier, to_fields(employee)?)?,
                Outcome::DuplicateKey,
            ),
            Change::Update { identifier, update } => {
                let fields = to_fields(&UpdateFields {
                    first_name: &update.first_name,
                    last_name: &update.last_name,
                    role: &update.role,
                    company: &update.company,
                    status: update.status,
                    termed: update.termed,
                })?;
                (
                    self.store.update(EMPLOYEES_TABLE, identifier, fields)?,
                    Outcome::NotFound,
                )
            }
            Change::Term { identifier } => {
                let fields = to_fields(&json!({
                    "termed": Termed::Yes,
                    "status": Status::Inactive
                }))?;
                (
                    self.store.update(EMPLOYEES_TABLE, identifier, fields)?,
                    Outcome::NotFound,
                )
            }
            Change::Delete { identifier } => (
                self.store.delete(EMPLOYEES_TABLE, identifier)?,
                Outcome::NotFound,
            ),
        };
        Ok(if done { Outcome::Applied } else { missing })
    }

    fn record(&mut self, entry: &AuditEntry) -> Result<()> {
        let fields = to_fields(&json!({
            "action": entry.action.as_str(),
            "details": entry.details,
            "editor": entry.editor
        }))?;
        self.store.append(HISTORY_TABLE, fields)?;
        Ok(())
    }

    fn commit(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::LocalDocumentStore;
    use crate::schema::QUARANTINE_TABLE;

    fn legacy(store: &mut LocalDocumentStore, key: &str, value: Value) {
        let Value::Object(fields) = value else {
            unreachable!()
        };
        store.create(EMPLOYEES_TABLE, key, fields).unwrap();
    }

    #[test]
    fn test_backfills_termed() {
        let mut store = LocalDocumentStore::in_memory();
        legacy(
            &mut store,
            "a@x.com",
            json!({
                "identifier": "a@x.com", "first_name": "A", "last_name": "B",
                "role": "Eng", "company": "Co", "status": "Active"
            }),
        );
        let mut backend = DocumentBackend::new(store);
        let report = backend.ensure_schema().unwrap();
        assert!(report.added_termed);
        assert_eq!(backend.employees().unwrap()[0].termed, Termed::No);
        assert!(backend.ensure_schema().unwrap().is_unchanged());
    }

    #[test]
    fn test_quarantines_unkeyed_documents() {
        let mut store = LocalDocumentStore::in_memory();
        legacy(&mut store, "1", json!({ "name": "John Doe", "gender": "Male" }));
        let mut backend = DocumentBackend::new(store);
        let report = backend.ensure_schema().unwrap();
        assert_eq!(report.quarantined_to.as_deref(), Some(QUARANTINE_TABLE));
        assert!(backend.employees().unwrap().is_empty());
        let backup = backend.store().scan(QUARANTINE_TABLE).unwrap();
        assert_eq!(backup.len(), 1);
        assert_eq!(backup[0].fields["name"], json!("John Doe"));
    }

    #[test]
    fn test_quarantine_keeps_earlier_backup() {
        let mut store = LocalDocumentStore::in_memory();
        let Value::Object(old) = json!({ "name": "Old" }) else {
            unreachable!()
        };
        store.create(QUARANTINE_TABLE, "1", old).unwrap();
        legacy(&mut store, "1", json!({ "name": "New Data" }));

        let mut backend = DocumentBackend::new(store);
        let report = backend.ensure_schema().unwrap();
        let backup = "employees_corrupted_backup_1";
        assert_eq!(report.quarantined_to.as_deref(), Some(backup));
        assert!(backend.employees().unwrap().is_empty());

        let earlier = backend.store().scan(QUARANTINE_TABLE).unwrap();
        assert_eq!(earlier.len(), 1);
        assert_eq!(earlier[0].fields["name"], json!("Old"));
        let moved = backend.store().scan(backup).unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].key, "1");
        assert_eq!(moved[0].fields["name"], json!("New Data"));
    }
}
