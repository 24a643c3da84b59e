//! Client-local persisted settings.
//!
//! Values are plain strings keyed by name with no schema versioning, kept in a
//! small TOML file under the user's home directory.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-supplied backend base URL override.
pub const API_BASE_URL_KEY: &str = "api_base_url";
/// Preferred board poll interval in seconds.
pub const BOARD_REFRESH_SEC_KEY: &str = "board_refresh_sec";

/// Directory override for the preferences file.
pub const HOME_ENV: &str = "BINGO_HOME";

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("unable to determine home directory")]
    NoHome,
    #[error("io error on {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("preferences file is not valid toml: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for PreferenceError {
    fn from(value: toml::de::Error) -> Self {
        PreferenceError::Toml(value.to_string())
    }
}

impl From<toml::ser::Error> for PreferenceError {
    fn from(value: toml::ser::Error) -> Self {
        PreferenceError::Toml(value.to_string())
    }
}

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
    fn remove(&self, key: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// File-backed store. Reads happen once at open; every write rewrites the file.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FilePreferences {
    pub fn default_path() -> Result<PathBuf, PreferenceError> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|dir| !dir.is_empty()) {
            return Ok(PathBuf::from(dir).join("preferences"));
        }
        let base = BaseDirs::new().ok_or(PreferenceError::NoHome)?;
        Ok(base.home_dir().join(".bingo").join("preferences"))
    }

    pub fn open_default() -> Result<Self, PreferenceError> {
        Self::open(Self::default_path()?)
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| PreferenceError::Io {
                path: path.clone(),
                source,
            })?;
            toml::from_str::<PreferenceFile>(&raw)?.values
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), PreferenceError> {
        let io_err = |source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let serialized = toml::to_string_pretty(&PreferenceFile {
            values: values.clone(),
        })?;
        let mut options = OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(io_err)?;
        file.write_all(serialized.as_bytes()).map_err(io_err)?;
        // `mode` only applies on create; an older file keeps its bits otherwise.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = file.metadata().map_err(io_err)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms).map_err(io_err)?;
        }
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        let mut values = self.values.lock();
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, value: &str) -> Self {
        self.values.lock().insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        self.values.lock().remove(key);
        Ok(())
    }
}
