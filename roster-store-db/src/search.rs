// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! Case-insensitive substring search over employee records.

use crate::types::Employee;

/// Lowercasing shared by in-memory filtering and the SQL push-down, so
/// both agree on every input.
pub(crate) fn casefold(text: &str) -> String {
    text.to_lowercase()
}

/// A prepared search needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    pub fn new(query: &str) -> Self {
        Self {
            needle: casefold(query),
        }
    }

    /// The lowercased needle.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// An empty query matches every record.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// True if the needle occurs in any field of `employee`.
    pub fn matches(&self, employee: &Employee) -> bool {
        self.is_empty()
            || employee
                .row()
                .iter()
                .any(|field| casefold(field).contains(&self.needle))
    }

    /// Keep the matching records, preserving their order.
    pub fn filter(&self, employees: Vec<Employee>) -> Vec<Employee> {
        employees.into_iter().filter(|e| self.matches(e)).collect()
    }
}
