//! Runtime configuration for hosts embedding the pet store.
//!
//! Values come from `PETSTORE_*` environment variables; blank values fall
//! back to defaults.

use crate::contract::CONTENT_AUTHORITY;
use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "PETSTORE_DB_PATH";
pub const ENV_AUTHORITY: &str = "PETSTORE_AUTHORITY";
pub const ENV_LOG_LEVEL: &str = "PETSTORE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PETSTORE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "petstore.sqlite3";

/// Store wiring resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub authority: String,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            authority: CONTENT_AUTHORITY.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, e.g. a map in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        Self {
            db_path: read(ENV_DB_PATH).map_or(defaults.db_path, PathBuf::from),
            authority: read(ENV_AUTHORITY).unwrap_or(defaults.authority),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, ENV_AUTHORITY, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> StoreConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        StoreConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(config_from(&[]), StoreConfig::default());
    }

    #[test]
    fn environment_overrides_are_trimmed() {
        let config = config_from(&[
            (ENV_DB_PATH, " /var/lib/pets.db "),
            (ENV_AUTHORITY, "org.shelter.pets"),
            (ENV_LOG_LEVEL, "warn"),
            (ENV_LOG_DIR, "/var/log/petstore"),
        ]);

        assert_eq!(config.db_path, PathBuf::from("/var/lib/pets.db"));
        assert_eq!(config.authority, "org.shelter.pets");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/petstore")));
    }

    #[test]
    fn blank_values_fall_back() {
        let config = config_from(&[(ENV_AUTHORITY, "   "), (ENV_LOG_DIR, "")]);
        assert_eq!(config.authority, StoreConfig::default().authority);
        assert_eq!(config.log_dir, None);
    }
}
