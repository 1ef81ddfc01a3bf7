// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! The roster over the JSON document store.

use roster_store_db::documents::{DocumentBackend, LocalDocumentStore};
use roster_store_db::{Atomicity, Backend, Editor, Employee, Outcome, RosterDb, Status};
use roster_utils_test::TempRosterDir;

fn open(dir: &TempRosterDir, editor: &str) -> RosterDb<DocumentBackend<LocalDocumentStore>> {
    let store = LocalDocumentStore::open(dir.documents_path()).unwrap();
    RosterDb::open(DocumentBackend::new(store), Editor::new(editor)).unwrap()
}

#[test]
fn test_end_to_end_scenario() {
    let dir = TempRosterDir::new().unwrap();
    let mut db = open(&dir, "admin");
    assert_eq!(db.backend().atomicity(), Atomicity::WriteThrough);

    assert!(db.insert_employee(Employee::new(
        "a@x.com",
        "A",
        "B",
        "Eng",
        "Co",
        Status::Active
    )));
    assert_eq!(
        db.fetch_employees()[0].row(),
        ["a@x.com", "A", "B", "Eng", "Co", "Active", "No"]
    );
    assert!(db.term_employee("a@x.com"));
    assert_eq!(db.fetch_employees()[0].row()[6], "Yes");

    let history = db.fetch_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, "Employee Termed");
    assert_eq!(history[1].action, "Employee Added");
}

#[test]
fn test_survives_reopen() {
    let dir = TempRosterDir::new().unwrap();
    {
        let mut db = open(&dir, "first");
        db.insert(Employee::new("1", "A", "B", "Eng", "Co", Status::Active))
            .unwrap();
        db.insert(Employee::new("2", "C", "D", "Ops", "Co", Status::Active))
            .unwrap();
    }
    let mut db = open(&dir, "second");
    assert!(db.schema_report().is_unchanged());
    assert_eq!(
        db.insert(Employee::new("1", "X", "Y", "Z", "W", Status::Inactive))
            .unwrap(),
        Outcome::DuplicateKey
    );
    assert_eq!(db.delete("2").unwrap(), Outcome::Applied);

    let ids: Vec<_> = db.employees().unwrap().into_iter().map(|e| e.identifier).collect();
    assert_eq!(ids, vec!["1"]);
    let editors: Vec<_> = db.history().unwrap().into_iter().map(|e| e.editor).collect();
    assert_eq!(editors, vec!["second", "first", "first"]);
}
