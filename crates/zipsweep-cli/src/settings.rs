//! File-backed settings store.
//!
//! Persists the last-used root, extension list, and age selector as a flat
//! JSON object:
//!
//! ```json
//! { "workDir": "/var/log/app", "extensions": "log,txt", "age": "two-years" }
//! ```

use directories::ProjectDirs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zipsweep_core::config::ConfigStore;
use zipsweep_core::model::{AgeSelector, FilterCriteria};
use zipsweep_core::ConfigError;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SettingsFile {
    work_dir: Option<PathBuf>,
    extensions: String,
    age: AgeSelector,
}

/// Returns the platform-specific settings path, e.g.
/// `~/.config/zipsweep/settings.json` on Linux.
pub fn default_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("io", "zipsweep", "zipsweep")
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

/// [`ConfigStore`] that reads and writes a JSON settings file.
#[derive(Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file; missing means defaults, unparsable means defaults with
    /// a warning.
    fn read(&self) -> Result<SettingsFile, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {:?}, using defaults", self.path);
                return Ok(SettingsFile::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_str::<SettingsFile>(&content) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse settings file at {:?}: {}. Falling back to defaults.",
                    self.path,
                    e
                );
                Ok(SettingsFile::default())
            }
        }
    }

    fn write(&self, settings: &SettingsFile) -> Result<(), ConfigError> {
        let io_err = |source: io::Error| ConfigError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| ConfigError::Backend(Box::new(e)))?;
        fs::write(&self.path, json).map_err(io_err)
    }
}

impl ConfigStore for JsonSettingsStore {
    fn load_criteria(&self) -> Result<FilterCriteria, ConfigError> {
        let settings = self.read()?;
        Ok(FilterCriteria::new(
            FilterCriteria::parse_extension_list(&settings.extensions),
            settings.age,
        ))
    }

    fn load_root_dir(&self) -> Result<Option<PathBuf>, ConfigError> {
        Ok(self.read()?.work_dir)
    }

    fn store_criteria(
        &self,
        criteria: &FilterCriteria,
        root_dir: &Path,
    ) -> Result<(), ConfigError> {
        let _guard = self.write_lock.lock();
        let settings = SettingsFile {
            work_dir: Some(root_dir.to_path_buf()),
            extensions: criteria.extension_list(),
            age: criteria.age(),
        };
        self.write(&settings)?;
        tracing::debug!("Saved settings to {:?}", self.path);
        Ok(())
    }
}
