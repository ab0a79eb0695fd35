//! Harness configuration, loadable from YAML.

use crate::error::{HarnessError, HarnessResult};
use mt_db::MEMORY_LOCATION;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Options for the connection a [`crate::MigrationHarness`] opens.
///
/// ```yaml
/// database:
///   path: ./migrations.db
/// foreign_keys: true
/// busy_timeout_ms: 500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Database location
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Enforce foreign key constraints (`PRAGMA foreign_keys = ON`)
    #[serde(default = "default_true")]
    pub foreign_keys: bool,

    /// How long a statement waits on a locked file-backed database
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
}

/// Database location for the harness connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// File path, or `:memory:` for a private in-memory database
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            foreign_keys: true,
            busy_timeout_ms: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    /// Whether this selects an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_LOCATION
    }
}

fn default_true() -> bool {
    true
}

fn default_db_path() -> String {
    MEMORY_LOCATION.to_string()
}

impl HarnessConfig {
    /// Config for a file-backed database at `path`, other options default.
    pub fn file(path: &Path) -> Self {
        Self {
            database: DatabaseConfig {
                path: path.display().to_string(),
            },
            ..Self::default()
        }
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(yaml: &str) -> HarnessResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        if !path.exists() {
            return Err(HarnessError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| HarnessError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    pub fn busy_timeout(&self) -> Option<Duration> {
        self.busy_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
