//! Configuration system for simple-roles
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (SIMPLE_ROLES_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    /// Role registry and membership settings
    pub roles: RoleSettings,

    /// Presence tracking settings
    pub presence: PresenceSettings,

    /// Group storage location
    pub storage: StorageSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Role registry and membership settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleSettings {
    /// Prefix that marks a group id as a managed role
    pub namespace_prefix: String,

    /// Fail `join` when the storage rejects the new membership
    /// instead of reporting success anyway
    pub strict_join: bool,
}

/// Presence tracking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceSettings {
    /// Presence tick period in milliseconds
    pub tick_interval_ms: u64,

    /// File listing the currently connected users, one per line
    pub roster_file: String,
}

/// Storage path settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Base data directory
    pub data_dir: String,

    /// Group table file name, relative to `data_dir`
    pub store_file: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for RoleSettings {
    fn default() -> Self {
        Self {
            namespace_prefix: "roles.".to_string(),
            strict_join: false,
        }
    }
}

impl Default for PresenceSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            roster_file: "~/.simple-roles/online.txt".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.simple-roles".to_string(),
            store_file: "groups.json".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl RolesConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("{}: {}", path.display(), e.to_string().trim()),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::ConfigNotFound { path });
        }

        let search_paths = [
            PathBuf::from("simple-roles.toml"),
            dirs::config_dir()
                .map(|p| p.join("simple-roles").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".simple-roles").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/simple-roles/config.toml"),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SIMPLE_ROLES_NAMESPACE_PREFIX") {
            self.roles.namespace_prefix = val;
        }
        if let Ok(val) = std::env::var("SIMPLE_ROLES_STRICT_JOIN") {
            self.roles.strict_join = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("SIMPLE_ROLES_TICK_INTERVAL_MS") {
            if let Ok(n) = val.parse() {
                self.presence.tick_interval_ms = n;
            }
        }
        if let Ok(val) = std::env::var("SIMPLE_ROLES_ROSTER_FILE") {
            self.presence.roster_file = val;
        }

        if let Ok(val) = std::env::var("SIMPLE_ROLES_DATA_DIR") {
            self.storage.data_dir = val;
        }
        if let Ok(val) = std::env::var("SIMPLE_ROLES_STORE_FILE") {
            self.storage.store_file = val;
        }

        if let Ok(val) = std::env::var("SIMPLE_ROLES_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("SIMPLE_ROLES_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("SIMPLE_ROLES_LOG_JSON") {
            self.logging.json_format = parse_bool(&val);
        }
    }

    /// Expand ~ and environment variables in paths
    fn expand_paths(&mut self) {
        self.storage.data_dir = expand_path(&self.storage.data_dir);
        self.presence.roster_file = expand_path(&self.presence.roster_file);

        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        let prefix = &self.roles.namespace_prefix;
        if prefix.is_empty() || !prefix.ends_with('.') {
            return Err(Error::Config(format!(
                "namespace_prefix '{}' must be non-empty and end with '.'",
                prefix
            )));
        }

        if !(1..=60_000).contains(&self.presence.tick_interval_ms) {
            return Err(Error::Config(
                "tick_interval_ms must be between 1 and 60000".to_string(),
            ));
        }

        if self.storage.store_file.is_empty() {
            return Err(Error::Config("store_file cannot be empty".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Full path of the persisted group table
    pub fn store_path(&self) -> PathBuf {
        Path::new(&self.storage.data_dir).join(&self.storage.store_file)
    }

    pub fn roster_path(&self) -> PathBuf {
        PathBuf::from(&self.presence.roster_file)
    }
}

fn parse_bool(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".simple-roles")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Default configuration content with comments
const DEFAULT_CONFIG: &str = r#"# simple-roles configuration

[roles]
# Group ids starting with this prefix are managed roles
namespace_prefix = "roles."

# Fail "roles join" if the group storage rejects the membership
strict_join = false

[presence]
# Presence tick period in milliseconds
tick_interval_ms = 1000

# File listing connected users, one per line
roster_file = "~/.simple-roles/online.txt"

[storage]
# Base data directory
data_dir = "~/.simple-roles"

# Group table, relative to data_dir
store_file = "groups.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log file path (comment out to disable file logging)
# file = "~/.simple-roles/logs/roles.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#;
