// SPDX-FileCopyrightText: 2025 Roster contributors
// SPDX-License-Identifier: MIT

use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Which store backs the roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum BackendKind {
    #[default]
    Sqlite,
    Documents,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("employees.db")
}

fn default_documents_path() -> PathBuf {
    PathBuf::from("roster-documents.json")
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) backend: BackendKind,
    #[serde(default = "default_database_path")]
    pub(crate) database_path: PathBuf,
    /// Location of the document store file (its credential/location file
    /// when the store is hosted)
    #[serde(default = "default_documents_path")]
    pub(crate) documents_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub(crate) log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            database_path: default_database_path(),
            documents_path: default_documents_path(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub(crate) fn load(settings_file: &Path) -> Result<Config> {
        let contents = read_to_string(settings_file).map_err(|e| ConfigError::ReadFile {
            path: settings_file.display().to_string(),
            source: e,
        })?;
        let config = Self::parse(&contents)?;
        Ok(config)
    }

    fn parse(contents: &str) -> std::result::Result<Config, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        let path = match self.backend {
            BackendKind::Sqlite => &self.database_path,
            BackendKind::Documents => &self.documents_path,
        };
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                reason: format!("{:?} backend needs a non-empty path", self.backend),
            });
        }
        Ok(())
    }
}

/// Resolve configuration: `--config`, then `CONFIG_FILE`, then
/// `roster.toml` in the working directory, then defaults.
pub(crate) fn load(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path);
    }
    match std::env::var("CONFIG_FILE") {
        Ok(settings_file) => Config::load(Path::new(&settings_file)),
        Err(_) => {
            if Path::new("roster.toml").exists() {
                Config::load(Path::new("roster.toml"))
            } else {
                Ok(Config::default())
            }
        }
    }
}
