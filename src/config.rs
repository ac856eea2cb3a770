use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Placeholder value meaning "the user never configured an email".
pub const UNSET_EMAIL: &str = "Default Email";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read config file `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write config file `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config file `{path}` is malformed")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Caller-supplied fallbacks for every recognized config key.
///
/// A default is only ever used for a key that is absent from the
/// persisted config, existing values are never overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDefaults {
    pub include_email: bool,
    pub include_day_name: bool,
    pub date_format: String,
    pub include_entry_hours: bool,
    pub entry_on_current_day: bool,
    pub default_name: String,
    pub default_email: String,
}

impl Default for ConfigDefaults {
    fn default() -> Self {
        Self {
            include_email: true,
            include_day_name: true,
            date_format: "MLA".to_string(),
            include_entry_hours: true,
            entry_on_current_day: true,
            default_name: "Default Name".to_string(),
            default_email: UNSET_EMAIL.to_string(),
        }
    }
}

/// The resolved configuration. Every recognized key is guaranteed to be
/// present with a valid type, so readers never have to deal with
/// missing keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    pub include_email: bool,
    pub include_day_name: bool,
    pub date_format: String,
    pub include_entry_hours: bool,
    pub entry_on_current_day: bool,
    pub default_name: String,
    pub default_email: String,
}

/// Resolves the persisted config against caller defaults and writes it
/// back when resolution had to fill in missing keys.
///
/// The store keeps the raw JSON object around in addition to the typed
/// [`Config`], so that keys it does not recognize survive a
/// load/persist round-trip unchanged.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    data: Map<String, Value>,
    config: Config,
    changed: bool,
    newly_created: bool,
}

impl ConfigStore {
    /// Reads the config file at `path` and resolves it.
    ///
    /// A missing or empty file means "brand new config": the resolved
    /// record is exactly `defaults`.
    pub fn load(
        path: impl Into<PathBuf>,
        defaults: &ConfigDefaults,
    ) -> Result<Self, PersistenceError> {
        let path = path.into();
        trace!("reading config from: {}", path.display());

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => String::new(),
            Err(source) => return Err(PersistenceError::Read { path, source }),
        };

        let source = if raw.trim().is_empty() {
            Map::new()
        } else {
            serde_json::from_str(&raw).map_err(|source| PersistenceError::Malformed {
                path: path.clone(),
                source,
            })?
        };

        Self::resolve(path, source, defaults)
    }

    /// Resolves an already-loaded config object against `defaults`.
    pub fn resolve(
        path: impl Into<PathBuf>,
        mut source: Map<String, Value>,
        defaults: &ConfigDefaults,
    ) -> Result<Self, PersistenceError> {
        let path = path.into();
        let newly_created = source.is_empty();
        let changed = fill_missing(&mut source, defaults);

        if newly_created {
            info!("config `{}` does not exist yet, using defaults", path.display());
        } else if changed {
            debug!("config `{}` was missing some keys", path.display());
        }

        let config = serde_json::from_value(Value::Object(source.clone())).map_err(|source| {
            PersistenceError::Malformed {
                path: path.clone(),
                source,
            }
        })?;

        Ok(Self {
            path,
            data: source,
            config,
            changed,
            newly_created,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns whether resolution had to fill in any missing key.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Returns whether the persisted source was empty or absent.
    #[must_use]
    pub fn newly_created(&self) -> bool {
        self.newly_created
    }

    /// Writes the resolved record back to its file, but only if
    /// resolution changed it. Configs that were already complete are
    /// never rewritten.
    pub fn persist(&mut self) -> Result<(), PersistenceError> {
        if !self.changed {
            trace!("config `{}` is unchanged, not persisting", self.path.display());
            return Ok(());
        }

        let contents = serde_json::to_string_pretty(&Value::Object(self.data.clone())).map_err(
            |source| PersistenceError::Malformed {
                path: self.path.clone(),
                source,
            },
        )?;

        trace!("writing config to: {}", self.path.display());
        fs::write(&self.path, contents).map_err(|source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        })?;

        self.changed = false;
        Ok(())
    }
}

/// Copies every recognized key that is absent from `source` out of
/// `defaults`. Returns whether anything had to be copied. Keys that are
/// already present (recognized or not) are left untouched.
fn fill_missing(source: &mut Map<String, Value>, defaults: &ConfigDefaults) -> bool {
    let defaults = match serde_json::to_value(defaults) {
        Ok(Value::Object(map)) => map,
        _ => unreachable!("ConfigDefaults serializes to a JSON object"),
    };

    let mut changed = false;
    for (key, value) in defaults {
        if !source.contains_key(&key) {
            source.insert(key, value);
            changed = true;
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn test_empty_source_resolves_to_defaults() {
        let defaults = ConfigDefaults::default();
        let store = ConfigStore::resolve("unused.txt", Map::new(), &defaults).unwrap();

        assert!(store.changed());
        assert!(store.newly_created());
        assert_eq!(
            store.config(),
            &Config {
                include_email: true,
                include_day_name: true,
                date_format: "MLA".to_string(),
                include_entry_hours: true,
                entry_on_current_day: true,
                default_name: "Default Name".to_string(),
                default_email: UNSET_EMAIL.to_string(),
            }
        );
    }

    #[test]
    fn test_partial_source_keeps_existing_values() {
        let source = object(json!({
            "include_email": false,
            "default_name": "Ada Lovelace",
        }));

        let store = ConfigStore::resolve("unused.txt", source, &ConfigDefaults::default()).unwrap();

        assert!(store.changed());
        assert!(!store.newly_created());

        let config = store.config();
        assert_eq!(config.include_email, false);
        assert_eq!(config.default_name, "Ada Lovelace");
        // the rest is filled from the defaults
        assert_eq!(config.include_day_name, true);
        assert_eq!(config.date_format, "MLA");
        assert_eq!(config.default_email, UNSET_EMAIL);
    }

    #[test]
    fn test_complete_source_is_not_marked_changed() {
        let source = object(json!({
            "include_email": true,
            "include_day_name": false,
            "date_format": "MLA",
            "include_entry_hours": false,
            "entry_on_current_day": true,
            "default_name": "Ada Lovelace",
            "default_email": "ada@example.com",
        }));

        let store = ConfigStore::resolve("unused.txt", source, &ConfigDefaults::default()).unwrap();

        assert!(!store.changed());
        assert!(!store.newly_created());
    }

    #[test]
    fn test_unrecognized_keys_survive() {
        let source = object(json!({
            "default_name": "Ada Lovelace",
            "future_option": { "nested": [1, 2, 3] },
        }));

        let mut store =
            ConfigStore::resolve("unused.txt", source, &ConfigDefaults::default()).unwrap();

        assert_eq!(
            store.data.get("future_option"),
            Some(&json!({ "nested": [1, 2, 3] }))
        );

        // and they survive a persist round-trip
        let dir = tempfile::tempdir().unwrap();
        store.path = dir.path().join("config.txt");
        store.persist().unwrap();

        let reloaded = ConfigStore::load(&store.path, &ConfigDefaults::default()).unwrap();
        assert_eq!(
            reloaded.data.get("future_option"),
            Some(&json!({ "nested": [1, 2, 3] }))
        );
        assert_eq!(reloaded.config(), store.config());
        assert!(!reloaded.changed());
    }

    #[test]
    fn test_wrong_type_for_recognized_key_is_malformed() {
        let source = object(json!({ "include_email": "yes please" }));

        let result = ConfigStore::resolve("unused.txt", source, &ConfigDefaults::default());
        assert!(matches!(
            result,
            Err(PersistenceError::Malformed { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_a_new_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.txt");

        let store = ConfigStore::load(&path, &ConfigDefaults::default()).unwrap();
        assert!(store.newly_created());
        assert!(store.changed());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.txt");
        fs::write(&path, "{ not json").unwrap();

        let result = ConfigStore::load(&path, &ConfigDefaults::default());
        assert!(matches!(result, Err(PersistenceError::Malformed { .. })));
    }

    #[test]
    fn test_unchanged_config_is_never_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.txt");

        // oddly formatted on purpose, a rewrite would normalize it
        let raw = concat!(
            "{\"include_email\":true,\"include_day_name\":true,",
            "\"date_format\":\"MLA\",\"include_entry_hours\":true,",
            "\"entry_on_current_day\":true,\"default_name\":\"Ada\",",
            "\"default_email\":\"ada@example.com\"}"
        );
        fs::write(&path, raw).unwrap();

        let mut store = ConfigStore::load(&path, &ConfigDefaults::default()).unwrap();
        assert!(!store.changed());
        store.persist().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), raw);
    }

    #[test]
    fn test_persist_round_trip_has_no_drift() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.txt");

        let mut store = ConfigStore::load(&path, &ConfigDefaults::default()).unwrap();
        store.persist().unwrap();

        let reloaded = ConfigStore::load(&path, &ConfigDefaults::default()).unwrap();
        assert_eq!(reloaded.config(), store.config());
        assert!(!reloaded.changed());
        assert!(!reloaded.newly_created());
    }
}
