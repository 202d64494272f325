//! # TuneDeck Configuration Module
//!
//! This crate provides configuration management for TuneDeck:
//! - Loading configuration from a YAML file
//! - Merging with an embedded default configuration
//! - Environment variable overrides (`TUNEDECK_CONFIG__SECTION__KEY=value`)
//! - Typed getters and setters for configuration values
//!
//! Crates that own a configuration section extend [`Config`] through their
//! own `*ConfigExt` traits rather than adding getters here.
//!
//! ## Usage
//!
//! ```no_run
//! use tuneconfig::Config;
//!
//! let config = Config::load_config("")?;
//! let tick = config.get_tick_interval_ms()?;
//! config.set_tick_interval_ms(500)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, info};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("tunedeck.yaml");

const ENV_CONFIG_DIR: &str = "TUNEDECK_CONFIG";
const ENV_PREFIX: &str = "TUNEDECK_CONFIG__";
const CONFIG_DIR_NAME: &str = ".tunedeck";
const CONFIG_FILE_NAME: &str = "config.yaml";

const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_TICK_INTERVAL_MS: usize = 1000;
const DEFAULT_REQUEST_TIMEOUT_SECS: usize = 10;

/// Macro to generate getter/setter for usize values with default
macro_rules! impl_usize_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<usize> {
            Ok(self.get_usize($path).unwrap_or($default))
        }

        pub fn $setter(&self, value: usize) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(value)))
        }
    };
}

/// Macro to generate getter/setter for string values with default
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<String> {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.is_empty() => Ok(s),
                _ => Ok($default.to_string()),
            }
        }

        pub fn $setter(&self, value: String) -> Result<()> {
            self.set_value($path, Value::String(value))
        }
    };
}

/// Configuration manager for TuneDeck
///
/// Values live in a YAML tree guarded by a mutex. Keys are case-insensitive:
/// they are lowered at load time and on every lookup.
///
/// Setters only touch the in-memory tree; [`Config::save`] writes it back.
#[derive(Debug)]
pub struct Config {
    config_dir: PathBuf,
    path: PathBuf,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(self.snapshot()),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    ///
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `TUNEDECK_CONFIG` environment variable
    /// 3. `.tunedeck` in the current directory
    /// 4. `.tunedeck` in the user's home directory
    pub fn find_config_dir(directory: &str) -> PathBuf {
        if !directory.is_empty() {
            return PathBuf::from(directory);
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return PathBuf::from(env_path);
        }

        if Path::new(CONFIG_DIR_NAME).exists() {
            return PathBuf::from(CONFIG_DIR_NAME);
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config;
            }
        }

        PathBuf::from(CONFIG_DIR_NAME)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    ///
    /// Nothing is written; call [`Config::save`] to persist the merged tree.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        info!(config_dir = %config_dir.display(), "Using config directory");

        let path = config_dir.join(CONFIG_FILE_NAME);
        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        match fs::read(&path) {
            Ok(data) => {
                info!(config_file = %path.display(), "Loaded config file");
                let external: Value = serde_yaml::from_slice(&data)?;
                merge_yaml(&mut config_value, &lower_keys_value(external));
            }
            Err(_) => {
                info!(config_file = %path.display(), "Config file not found, using default embedded config");
            }
        }

        let mut config_value = lower_keys_value(config_value);
        apply_env_overrides(&mut config_value, env::vars());

        Ok(Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        })
    }

    /// Builds a configuration from an inline YAML document merged over the
    /// embedded defaults. Environment overrides are not applied.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        if !yaml.trim().is_empty() {
            let external: Value = serde_yaml::from_str(yaml)?;
            merge_yaml(&mut config_value, &lower_keys_value(external));
        }

        Ok(Config {
            config_dir: PathBuf::from("."),
            path: PathBuf::from(CONFIG_FILE_NAME),
            data: Mutex::new(lower_keys_value(config_value)),
        })
    }

    /// Embedded defaults only.
    pub fn defaults() -> Result<Self> {
        Self::from_yaml_str("")
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Saves the current configuration to the config.yaml file, creating the
    /// configuration directory if needed.
    pub fn save(&self) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
        }
        let yaml = serde_yaml::to_string(&self.snapshot())?;
        fs::write(&self.path, yaml)?;
        debug!(config_file = %self.path.display(), "Configuration saved");
        Ok(())
    }

    /// Sets a configuration value at the specified path
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["playback", "tick_interval_ms"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.lock();
        set_value_internal(&mut data, path, value)
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if any segment of the path does not exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock();
        get_value_internal(&data, path)
    }

    /// Reads a non-negative integer, accepting numeric strings as produced by
    /// environment overrides quoted in YAML.
    pub fn get_usize(&self, path: &[&str]) -> Option<usize> {
        match self.get_value(path).ok()? {
            Value::Number(n) => n.as_u64().map(|v| v as usize),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Reads a string value; `None` when absent, empty or not a string.
    pub fn get_string(&self, path: &[&str]) -> Option<String> {
        match self.get_value(path).ok()? {
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Resolves a path setting against the configuration directory.
    pub fn resolve_path(&self, value: &str) -> PathBuf {
        let path = Path::new(value);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }

    impl_string_config!(
        get_log_min_level,
        set_log_min_level,
        &["log", "min_level"],
        DEFAULT_LOG_MIN_LEVEL
    );

    impl_usize_config!(
        get_tick_interval_ms,
        set_tick_interval_ms,
        &["playback", "tick_interval_ms"],
        DEFAULT_TICK_INTERVAL_MS
    );

    impl_usize_config!(
        get_request_timeout_secs,
        set_request_timeout_secs,
        &["catalog", "request_timeout_secs"],
        DEFAULT_REQUEST_TIMEOUT_SECS
    );

    fn snapshot(&self) -> Value {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Value> {
        // Mutations are single inserts, a poisoned tree is still consistent.
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key_value = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key_value, value);
        } else {
            let entry = map
                .entry(key_value)
                .or_insert(Value::Mapping(Mapping::new()));
            set_value_internal(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}

fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
    let mut current = data;
    for (i, key) in path.iter().enumerate() {
        if let Value::Mapping(map) = current {
            match map.get(&Value::String(key.to_lowercase())) {
                Some(next) => current = next,
                None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
            }
        } else {
            return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
        }
    }
    Ok(current.clone())
}

/// Applies `TUNEDECK_CONFIG__A__B=value` pairs onto the tree.
fn apply_env_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(rest) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let key_path = rest.split("__").collect::<Vec<_>>();
        debug!(key = %key, "Applying config override from environment");
        let _ = set_value_internal(config, &key_path, convert_env_value(&value));
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Merges external YAML configuration into default configuration
///
/// Mappings are merged key by key; scalars and sequences from `external`
/// replace the default.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}
