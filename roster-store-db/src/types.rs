// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! Record types for the employee roster and its history.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Employment status of a roster entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
        }
    }
}

/// Whether an employee has been offboarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Termed {
    #[default]
    No,
    Yes,
}

impl Termed {
    pub fn as_str(self) -> &'static str {
        match self {
            Termed::No => "No",
            Termed::Yes => "Yes",
        }
    }
}

macro_rules! text_enum {
    ($ty:ident, $field:literal, $($variant:ident),+) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok($ty::$variant),)+
                    other => Err(Error::InvalidValue {
                        field: $field,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: Error| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_enum!(Status, "status", Active, Inactive);
text_enum!(Termed, "termed", No, Yes);

/// An employee record.
///
/// `identifier` is the unique key: an email address or an opaque employee
/// id depending on deployment. It never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub identifier: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub company: String,
    pub status: Status,
    #[serde(default)]
    pub termed: Termed,
}

impl Employee {
    /// Build a record that has not been termed.
    pub fn new(
        identifier: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: impl Into<String>,
        company: impl Into<String>,
        status: Status,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role: role.into(),
            company: company.into(),
            status,
            termed: Termed::No,
        }
    }

    /// The record as an ordered field tuple, in column order.
    pub fn row(&self) -> [&str; 7] {
        [
            &self.identifier,
            &self.first_name,
            &self.last_name,
            &self.role,
            &self.company,
            self.status.as_str(),
            self.termed.as_str(),
        ]
    }
}

/// Replacement values for the mutable fields of an employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeUpdate {
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub company: String,
    pub status: Status,
    /// `None` leaves the stored flag untouched.
    pub termed: Option<Termed>,
}

impl From<&Employee> for EmployeeUpdate {
    fn from(employee: &Employee) -> Self {
        Self {
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            role: employee.role.clone(),
            company: employee.company.clone(),
            status: employee.status,
            termed: Some(employee.termed),
        }
    }
}

/// Result of a mutating roster operation that reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The record changed and a history entry was written.
    Applied,
    /// An insert collided with an existing identifier. Nothing changed.
    DuplicateKey,
    /// No record has the given identifier. Nothing changed.
    NotFound,
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Outcome::Applied
    }
}

/// The kinds of change written to history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Added,
    Updated,
    Termed,
    Deleted,
}

impl Action {
    /// Tag stored in the history `action` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Added => "Employee Added",
            Action::Updated => "Employee Updated",
            Action::Termed => "Employee Termed",
            Action::Deleted => "Employee Deleted",
        }
    }

    /// Human readable description of the change to `identifier`.
    pub fn details(self, identifier: &str) -> String {
        let verb = match self {
            Action::Added => "Added",
            Action::Updated => "Updated",
            Action::Termed => "Termed",
            Action::Deleted => "Deleted",
        };
        format!("{verb} employee: {identifier}")
    }

    pub fn parse(tag: &str) -> Option<Self> {
        [Action::Added, Action::Updated, Action::Termed, Action::Deleted]
            .into_iter()
            .find(|action| action.as_str() == tag)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the append-only history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEvent {
    /// Store-assigned, strictly increasing
    pub sequence_id: i64,
    /// Store-assigned write time
    pub timestamp: SystemTime,
    pub action: String,
    pub details: String,
    /// Who made the change
    pub editor: String,
}

impl HistoryEvent {
    /// The write tag, if it is one this crate produces.
    pub fn action_kind(&self) -> Option<Action> {
        Action::parse(&self.action)
    }
}

/// Sort newest first: timestamp descending, then sequence descending.
pub(crate) fn sort_newest_first(events: &mut [HistoryEvent]) {
    events.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then(b.sequence_id.cmp(&a.sequence_id))
    });
}

/// Convert Unix milliseconds to SystemTime.
pub(crate) fn unix_millis_to_system_time(millis: i64) -> SystemTime {
    if millis >= 0 {
        UNIX_EPOCH + Duration::from_millis(millis as u64)
    } else {
        UNIX_EPOCH - Duration::from_millis(millis.unsigned_abs())
    }
}

/// Convert SystemTime to Unix milliseconds.
pub(crate) fn system_time_to_unix_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_millis() as i64,
        Err(e) => -(e.duration().as_millis() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[test]
    fn test_unix_millis_roundtrip() {
        let now = SystemTime::now();
        let millis = system_time_to_unix_millis(now);
        let back = unix_millis_to_system_time(millis);
        let diff = now.duration_since(back).unwrap_or_default();
        assert!(diff.as_millis() <= 1);
    }

    #[test]
    fn test_pre_epoch_millis() {
        let before = UNIX_EPOCH - Duration::from_millis(1500);
        assert_eq!(system_time_to_unix_millis(before), -1500);
        assert_eq!(unix_millis_to_system_time(-1500), before);
    }

    #[rstest]
    #[case("Active", Ok(Status::Active))]
    #[case("Inactive", Ok(Status::Inactive))]
    #[case("active", Err(()))]
    #[case("", Err(()))]
    fn parse_status(#[case] input: &str, #[case] expected: Result<Status, ()>) {
        assert_eq!(input.parse::<Status>().map_err(|_| ()), expected);
    }

    #[rstest]
    #[case(Action::Added, "Employee Added", "Added employee: a@x.com")]
    #[case(Action::Updated, "Employee Updated", "Updated employee: a@x.com")]
    #[case(Action::Termed, "Employee Termed", "Termed employee: a@x.com")]
    #[case(Action::Deleted, "Employee Deleted", "Deleted employee: a@x.com")]
    fn action_text(#[case] action: Action, #[case] tag: &str, #[case] details: &str) {
        assert_eq!(action.as_str(), tag);
        assert_eq!(action.details("a@x.com"), details);
        assert_eq!(Action::parse(tag), Some(action));
    }

    #[test]
    fn test_row_order() {
        let employee = Employee::new("a@x.com", "A", "B", "Eng", "Co", Status::Active);
        assert_eq!(
            employee.row(),
            ["a@x.com", "A", "B", "Eng", "Co", "Active", "No"]
        );
    }

    #[test]
    fn test_newest_first_breaks_ties_by_sequence() {
        let at = UNIX_EPOCH + Duration::from_secs(10);
        let event = |sequence_id, timestamp| HistoryEvent {
            sequence_id,
            timestamp,
            action: String::new(),
            details: String::new(),
            editor: String::new(),
        };
        let mut events = vec![event(1, at), event(3, UNIX_EPOCH), event(2, at)];
        sort_newest_first(&mut events);
        let order: Vec<i64> = events.iter().map(|e| e.sequence_id).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn test_termed_defaults_when_absent_in_json() {
        let employee: Employee = serde_json::from_str(
            r#"{"identifier":"1","first_name":"A","last_name":"B","role":"R","company":"C","status":"Active"}"#,
        )
        .unwrap();
        assert_eq!(employee.termed, Termed::No);
    }
}
