//! Project configuration store
//!
//! This module holds the project's configuration options and persists
//! changes made by install hooks. Options are loaded from
//! `config/config.toml` under the project root and layered over built-in
//! defaults for the directories every project needs.
//!
//! The store is an explicit value: the binary initializes one per hook
//! invocation and hands it to [`crate::hooks::InstallHooks`] by mutable
//! reference. Nothing is cached between invocations apart from what
//! [`ConfigStore::update`] writes to disk.
//!
//! # File Format
//!
//! ```toml
//! sourceDir = "source"
//! publicDir = "public"
//! pluginDir = "plugins"
//! patternExtension = "mustache"
//! ```

use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::{debug, info};

use crate::constants::{
    CONFIG_DIR, CONFIG_FILE_NAME, DEFAULT_PLUGIN_DIR, DEFAULT_PUBLIC_DIR, DEFAULT_SOURCE_DIR,
    OPTION_PLUGIN_DIR, OPTION_PUBLIC_DIR, OPTION_SOURCE_DIR,
};
use crate::error::{InstallerError, Result};

/// How strictly [`ConfigStore::init`] treats a missing config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitMode {
    /// A missing config file is tolerated and defaults are used
    #[default]
    Lenient,
    /// A missing config file is an error
    Strict,
}

/// Configuration options for one project
#[derive(Debug, Clone)]
pub struct ConfigStore {
    project_root: PathBuf,
    /// `None` for stores that never touch the disk
    path: Option<PathBuf>,
    options: Table,
}

impl ConfigStore {
    /// Loads the project's options, layered over the defaults
    ///
    /// # Arguments
    ///
    /// * `project_root` - Directory the config file and relative directory options are resolved against
    /// * `mode` - Whether a missing config file is tolerated
    ///
    /// # Errors
    ///
    /// * `ConfigRead` - The file is missing in strict mode, or exists but cannot be read
    /// * `ConfigParse` - The file is not a valid TOML table
    pub fn init(project_root: &Path, mode: InitMode) -> Result<Self> {
        let path = Self::config_path(project_root);
        let mut options = Self::default_options();

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let table = toml::from_str::<Table>(&content).map_err(|e| {
                    InstallerError::ConfigParse {
                        path: path.clone(),
                        reason: e.to_string(),
                    }
                })?;
                debug!(path = %path.display(), options = table.len(), "loaded config file");
                options.extend(table);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && mode == InitMode::Lenient => {
                info!(path = %path.display(), "config file not found, using defaults");
            }
            Err(source) => return Err(InstallerError::ConfigRead { path, source }),
        }

        Ok(Self {
            project_root: project_root.to_path_buf(),
            path: Some(path),
            options,
        })
    }

    /// Creates a store that lives only in memory
    ///
    /// `options` are layered over the defaults. Updates are kept in memory
    /// and never written anywhere.
    pub fn in_memory(project_root: &Path, options: Table) -> Self {
        let mut merged = Self::default_options();
        merged.extend(options);
        Self {
            project_root: project_root.to_path_buf(),
            path: None,
            options: merged,
        }
    }

    /// Location of the config file for a project root
    pub fn config_path(project_root: &Path) -> PathBuf {
        project_root.join(CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    fn default_options() -> Table {
        let mut table = Table::new();
        table.insert(OPTION_SOURCE_DIR.into(), DEFAULT_SOURCE_DIR.into());
        table.insert(OPTION_PUBLIC_DIR.into(), DEFAULT_PUBLIC_DIR.into());
        table.insert(OPTION_PLUGIN_DIR.into(), DEFAULT_PLUGIN_DIR.into());
        table
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Path of the backing config file, if the store persists
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn options(&self) -> &Table {
        &self.options
    }

    pub fn contains(&self, option: &str) -> bool {
        self.options.contains_key(option)
    }

    pub fn get(&self, option: &str) -> Option<&Value> {
        self.options.get(option)
    }

    /// Resolves a directory option against the project root
    ///
    /// Absolute values are returned unchanged.
    pub fn dir(&self, option: &str) -> Result<PathBuf> {
        match self.options.get(option) {
            Some(Value::String(dir)) => Ok(self.project_root.join(dir)),
            Some(other) => Err(InstallerError::ConfigValue {
                option: option.to_string(),
                reason: format!("expected a directory path, found {}", other.type_str()),
            }),
            None => Err(InstallerError::ConfigValue {
                option: option.to_string(),
                reason: "option is not set".to_string(),
            }),
        }
    }

    pub fn source_dir(&self) -> Result<PathBuf> {
        self.dir(OPTION_SOURCE_DIR)
    }

    pub fn public_dir(&self) -> Result<PathBuf> {
        self.dir(OPTION_PUBLIC_DIR)
    }

    pub fn plugin_dir(&self) -> Result<PathBuf> {
        self.dir(OPTION_PLUGIN_DIR)
    }

    /// Sets an option and writes the store back to its config file
    ///
    /// The whole option table, defaults included, is written so that the
    /// file records every value the project now depends on. The config
    /// directory is created if needed.
    pub fn update(&mut self, option: &str, value: Value) -> Result<()> {
        self.options.insert(option.to_string(), value);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let write_error = |reason: String| InstallerError::ConfigWrite {
            path: path.clone(),
            reason,
        };

        let content =
            toml::to_string_pretty(&self.options).map_err(|e| write_error(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| write_error(e.to_string()))?;
        debug!(path = %path.display(), "config file written");
        Ok(())
    }
}

/// Converts a JSON value from a package declaration into a config value
///
/// JSON `null` has no TOML counterpart and is rejected, as are arrays or
/// objects containing one.
pub fn json_to_config_value(value: &serde_json::Value) -> std::result::Result<Value, String> {
    match value {
        serde_json::Value::Null => Err("null has no config representation".to_string()),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(format!("number {n} is out of range"))
            }
        }
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Array(items) => items
            .iter()
            .map(json_to_config_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_json::Value::Object(map) => {
            let mut table = Table::new();
            for (key, item) in map {
                table.insert(key.clone(), json_to_config_value(item)?);
            }
            Ok(Value::Table(table))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_memory_store_has_defaults() -> Result<()> {
        let store = ConfigStore::in_memory(Path::new("/project"), Table::new());
        assert_eq!(store.source_dir()?, PathBuf::from("/project/source"));
        assert_eq!(store.public_dir()?, PathBuf::from("/project/public"));
        assert_eq!(store.plugin_dir()?, PathBuf::from("/project/plugins"));
        assert!(store.path().is_none());
        Ok(())
    }

    #[test]
    fn test_absolute_dir_option_is_kept() -> Result<()> {
        let mut options = Table::new();
        options.insert(OPTION_PUBLIC_DIR.into(), "/srv/www".into());
        let store = ConfigStore::in_memory(Path::new("/project"), options);
        assert_eq!(store.public_dir()?, PathBuf::from("/srv/www"));
        Ok(())
    }

    #[test]
    fn test_non_string_dir_option_is_rejected() {
        let mut options = Table::new();
        options.insert(OPTION_SOURCE_DIR.into(), Value::Integer(3));
        let store = ConfigStore::in_memory(Path::new("/project"), options);
        assert!(matches!(
            store.source_dir(),
            Err(InstallerError::ConfigValue { .. })
        ));
    }

    #[test]
    fn test_in_memory_update_does_not_persist() -> Result<()> {
        let mut store = ConfigStore::in_memory(Path::new("/nonexistent/project"), Table::new());
        store.update("patternExtension", "twig".into())?;
        assert_eq!(store.get("patternExtension"), Some(&Value::from("twig")));
        Ok(())
    }

    #[test]
    fn test_json_to_config_value_conversions() {
        assert_eq!(json_to_config_value(&json!(true)), Ok(Value::Boolean(true)));
        assert_eq!(json_to_config_value(&json!(42)), Ok(Value::Integer(42)));
        assert_eq!(json_to_config_value(&json!(1.5)), Ok(Value::Float(1.5)));
        assert_eq!(json_to_config_value(&json!("twig")), Ok(Value::from("twig")));
        assert_eq!(
            json_to_config_value(&json!(["a", "b"])),
            Ok(Value::Array(vec!["a".into(), "b".into()]))
        );
        assert!(json_to_config_value(&json!(null)).is_err());
        assert!(json_to_config_value(&json!({"nested": null})).is_err());
    }
}
