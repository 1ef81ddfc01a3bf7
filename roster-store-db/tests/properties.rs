// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! Property tests for uniqueness, round-trip, search and audit counts.

use proptest::prelude::*;

use roster_store_db::documents::{DocumentBackend, LocalDocumentStore};
use roster_store_db::{
    Backend, Editor, Employee, EmployeeUpdate, Outcome, RosterDb, SearchQuery, SqliteBackend,
};
use roster_utils_test::{arb_employee, arb_query, arb_roster};

fn sqlite() -> RosterDb<SqliteBackend> {
    RosterDb::open_memory(Editor::new("prop")).unwrap()
}

fn documents() -> RosterDb<DocumentBackend<LocalDocumentStore>> {
    RosterDb::open(
        DocumentBackend::new(LocalDocumentStore::in_memory()),
        Editor::new("prop"),
    )
    .unwrap()
}

fn reference_search(employees: &[Employee], query: &str) -> Vec<Employee> {
    let needle = query.to_lowercase();
    employees
        .iter()
        .filter(|e| e.row().iter().any(|f| f.to_lowercase().contains(&needle)))
        .cloned()
        .collect()
}

proptest! {
    #[test]
    fn prop_second_insert_is_rejected(first in arb_employee(), second in arb_employee()) {
        let mut db = sqlite();
        let second = Employee { identifier: first.identifier.clone(), ..second };
        prop_assert_eq!(db.insert(first.clone()).unwrap(), Outcome::Applied);
        prop_assert_eq!(db.insert(second).unwrap(), Outcome::DuplicateKey);
        prop_assert_eq!(db.employees().unwrap(), vec![first]);
    }

    #[test]
    fn prop_round_trip(roster in arb_roster(8)) {
        let mut sql = sqlite();
        let mut docs = documents();
        for employee in &roster {
            prop_assert!(sql.insert_employee(employee.clone()));
            prop_assert!(docs.insert_employee(employee.clone()));
        }
        prop_assert_eq!(&sql.employees().unwrap(), &roster);
        prop_assert_eq!(&docs.employees().unwrap(), &roster);
    }

    #[test]
    fn prop_search_matches_reference(roster in arb_roster(8), query in arb_query()) {
        let mut sql = sqlite();
        let mut docs = documents();
        for employee in &roster {
            sql.insert(employee.clone()).unwrap();
            docs.insert(employee.clone()).unwrap();
        }
        let expected = reference_search(&roster, &query);

        // SQL push-down and in-memory filtering must agree.
        prop_assert_eq!(&sql.search(&query).unwrap(), &expected);
        prop_assert_eq!(&docs.search(&query).unwrap(), &expected);
        let filtered = SearchQuery::new(&query).filter(sql.backend().employees().unwrap());
        prop_assert_eq!(&filtered, &expected);
    }

    #[test]
    fn prop_one_event_per_applied_mutation(roster in arb_roster(6)) {
        let mut db = sqlite();
        let mut applied = Vec::new();
        for employee in &roster {
            db.insert(employee.clone()).unwrap();
            applied.push("Employee Added");
        }
        for (i, employee) in roster.iter().enumerate() {
            let outcome = match i % 3 {
                0 => {
                    applied.push("Employee Updated");
                    db.update(&employee.identifier, EmployeeUpdate::from(employee))
                }
                1 => {
                    applied.push("Employee Termed");
                    db.term(&employee.identifier)
                }
                _ => {
                    applied.push("Employee Deleted");
                    db.delete(&employee.identifier)
                }
            };
            prop_assert_eq!(outcome.unwrap(), Outcome::Applied);
            // Misses never add events.
            prop_assert_eq!(db.term("missing-identifier").unwrap(), Outcome::NotFound);
        }

        let history = db.history().unwrap();
        let actions: Vec<&str> = history.iter().map(|e| e.action.as_str()).collect();
        applied.reverse();
        prop_assert_eq!(actions, applied);
    }
}
