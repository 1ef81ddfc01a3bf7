// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! Test utilities for the roster.
//!
//! This crate provides proptest strategies for employee records and a
//! scratch directory for on-disk stores.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use proptest::prelude::*;
use roster_store_db::{Employee, Status, Termed};
use tempfile::TempDir;

/// A temporary directory holding roster files.
pub struct TempRosterDir {
    inner: TempDir,
}

impl TempRosterDir {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            inner: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Location for a SQLite roster file.
    pub fn db_path(&self) -> PathBuf {
        self.inner.path().join("employees.db")
    }

    /// Location for a document store snapshot.
    pub fn documents_path(&self) -> PathBuf {
        self.inner.path().join("roster-documents.json")
    }
}

pub fn arb_identifier() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,8}(\\.[a-z]{1,8})?@[a-z]{2,8}\\.(com|org|example)",
        "[0-9]{1,6}",
    ]
}

/// Free text with mixed case, digits, punctuation and some non-ASCII.
pub fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ._%'ÄÉöü-]{1,16}"
}

pub fn arb_status() -> impl Strategy<Value = Status> {
    prop_oneof![Just(Status::Active), Just(Status::Inactive)]
}

pub fn arb_termed() -> impl Strategy<Value = Termed> {
    prop_oneof![Just(Termed::No), Just(Termed::Yes)]
}

prop_compose! {
    pub fn arb_employee()(
        identifier in arb_identifier(),
        first_name in arb_text(),
        last_name in arb_text(),
        role in arb_text(),
        company in arb_text(),
        status in arb_status(),
        termed in arb_termed(),
    ) -> Employee {
        Employee {
            identifier,
            first_name,
            last_name,
            role,
            company,
            status,
            termed,
        }
    }
}

prop_compose! {
    /// Up to `max` employees with pairwise distinct identifiers.
    pub fn arb_roster(max: usize)(
        employees in prop::collection::vec(arb_employee(), 0..=max),
    ) -> Vec<Employee> {
        let mut seen = BTreeSet::new();
        employees
            .into_iter()
            .filter(|e| seen.insert(e.identifier.clone()))
            .collect()
    }
}

/// Search needles: empty, short fragments, or whole words in any case.
pub fn arb_query() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-zA-Z0-9.@_%]{1,3}",
        arb_text(),
        Just("ACTIVE".to_owned()),
        Just("yes".to_owned()),
    ]
}
