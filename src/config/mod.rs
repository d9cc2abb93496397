//! # Configuration
//!
//! Flat `key=value` properties file plus command-line overrides. The file is
//! read once by [`ConfigCell`]; afterwards the resulting [`Config`] is shared
//! by reference.
//!
//! Lookup order: override, then file. A missing key is a warning, not an
//! error, unless the caller asks for it with [`Config::require`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

/// Base URL of the users API.
pub const URL_API_USERS: &str = "url.res.req";

/// Properties file used when none is given, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "src/main/resources/config.properties";

/// Value some property files use to mean "unset".
const NULL_SENTINEL: &str = "null";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Exception occurred when attempting to load property file - {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Property value not found for key: {0}")]
    MissingKey(String),
}

/// Command-line overrides: `-Dkey=value` or `--key=value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    values: HashMap<String, String>,
}

impl Overrides {
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values = args
            .into_iter()
            .filter_map(|arg| {
                let arg = arg.as_ref();
                let raw = arg.strip_prefix("-D").or_else(|| arg.strip_prefix("--"))?;
                let (key, value) = raw.split_once('=')?;
                let key = key.trim();
                (!key.is_empty()).then(|| (key.to_string(), value.to_string()))
            })
            .collect();
        Self { values }
    }

    /// Overrides from this process's own arguments.
    pub fn from_env_args() -> Self {
        Self::from_args(std::env::args().skip(1))
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    properties: HashMap<String, String>,
    overrides: Overrides,
}

impl Config {
    pub fn new(properties: HashMap<String, String>, overrides: Overrides) -> Self {
        Self {
            properties,
            overrides,
        }
    }

    /// Read `path`. A file that does not exist gives an empty configuration
    /// and a warning; one that exists but cannot be read is an error.
    pub fn load(path: impl AsRef<Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!(
                "Configuration file - {} - not found, using overrides only",
                path.display()
            );
            return Ok(Self::new(HashMap::new(), overrides));
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let properties = parse_properties(&raw);
        log::info!("Configuration file - {} - successfully loaded", path.display());
        Ok(Self::new(properties, overrides))
    }

    /// Override first, then file.
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = self
            .overrides
            .get(key)
            .or_else(|| self.properties.get(key).map(String::as_str));
        present(key, value)
    }

    /// File only, ignoring overrides.
    pub fn get_file_only(&self, key: &str) -> Option<&str> {
        present(key, self.properties.get(key).map(String::as_str))
    }

    /// Like [`Config::get`] but a missing key is an error.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }
}

fn present<'a>(key: &str, value: Option<&'a str>) -> Option<&'a str> {
    match value {
        Some(value) if value != NULL_SENTINEL => Some(value),
        _ => {
            log::warn!("Property value not found for key: {key}");
            None
        }
    }
}

/// Parse Java-style properties: `key=value` or `key: value`, `#` and `!`
/// comments, a trailing `\` continues the value on the next line.
pub fn parse_properties(raw: &str) -> HashMap<String, String> {
    let mut properties = HashMap::new();
    let mut pending = String::new();

    for line in raw.lines() {
        let trimmed = line.trim();
        if pending.is_empty() && (trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!')) {
            continue;
        }
        if let Some(continued) = trimmed.strip_suffix('\\') {
            pending.push_str(continued);
            continue;
        }
        pending.push_str(trimmed);
        let entry = std::mem::take(&mut pending);

        let (key, value) = match entry.find(['=', ':']) {
            Some(idx) => (&entry[..idx], &entry[idx + 1..]),
            None => (entry.as_str(), ""),
        };
        let key = key.trim();
        if !key.is_empty() {
            properties.insert(key.to_string(), value.trim().to_string());
        }
    }

    properties
}

/// Loads a [`Config`] at most once, however many threads ask for it.
#[derive(Debug)]
pub struct ConfigCell {
    path: PathBuf,
    overrides: Overrides,
    loaded: OnceLock<Config>,
    init: Mutex<()>,
}

impl ConfigCell {
    pub fn new(path: impl Into<PathBuf>, overrides: Overrides) -> Self {
        Self {
            path: path.into(),
            overrides,
            loaded: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// [`DEFAULT_CONFIG_FILE`] under the working directory, with this
    /// process's arguments as overrides.
    pub fn from_process() -> Self {
        Self::new(
            crate::utils::current_dir_or_dot().join(DEFAULT_CONFIG_FILE),
            Overrides::from_env_args(),
        )
    }

    pub fn get_or_load(&self) -> Result<&Config, ConfigError> {
        if let Some(config) = self.loaded.get() {
            return Ok(config);
        }
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(config) = self.loaded.get() {
            return Ok(config);
        }
        let config = Config::load(&self.path, self.overrides.clone())?;
        Ok(self.loaded.get_or_init(|| config))
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }
}
