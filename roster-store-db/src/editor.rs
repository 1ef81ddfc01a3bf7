// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

//! Identity of the person making roster changes.

use std::fmt;

use tracing::debug;

/// Environment variables consulted for the login name, in order.
const LOGIN_VARS: [&str; 4] = ["LOGNAME", "USER", "LNAME", "USERNAME"];

/// The actor recorded in every history entry of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Editor(String);

impl Editor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Resolve the current user from the process environment.
    ///
    /// Login variables win over the password database. Falls back to
    /// `"unknown"` when neither yields a name.
    pub fn from_environment() -> Self {
        let name = resolve_name(|var| std::env::var(var).ok(), passwd_name);
        debug!("Resolved editor identity {name:?}");
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First non-empty login variable, else the password database entry,
/// else `"unknown"`.
fn resolve_name(
    env: impl Fn(&str) -> Option<String>,
    passwd: impl FnOnce() -> Option<String>,
) -> String {
    LOGIN_VARS
        .iter()
        .filter_map(|var| env(var))
        .find(|name| !name.is_empty())
        .or_else(passwd)
        .unwrap_or_else(|| "unknown".to_owned())
}

#[cfg(unix)]
fn passwd_name() -> Option<String> {
    use nix::unistd::{Uid, User};

    User::from_uid(Uid::current())
        .ok()
        .flatten()
        .map(|user| user.name)
}

#[cfg(not(unix))]
fn passwd_name() -> Option<String> {
    None
}
