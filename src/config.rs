//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::parse::{PrefixFormat, DEFAULT_PREFIX_FORMAT};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agenda: AgendaConfig,

    #[serde(default)]
    pub vault: VaultConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How dates are recognised and which items are indexed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaConfig {
    /// Date-prefix pattern (moment-style tokens)
    #[serde(default = "default_prefix_format")]
    pub prefix_format: String,

    /// Also index headings that start with a date
    #[serde(default = "default_include_headings")]
    pub include_headings: bool,
}

fn default_prefix_format() -> String {
    DEFAULT_PREFIX_FORMAT.to_string()
}

fn default_include_headings() -> bool {
    true
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            prefix_format: default_prefix_format(),
            include_headings: default_include_headings(),
        }
    }
}

/// Filesystem vault configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default = "default_vault_root")]
    pub root: String,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub include_hidden: bool,
}

fn default_vault_root() -> String {
    ".".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: default_vault_root(),
            extensions: default_extensions(),
            include_hidden: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    ///
    /// The first config file that exists wins. A file that exists but
    /// can't be read or parsed is an error, not a silent fallback.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_first(Self::search_paths())
    }

    /// Load the first existing file of `paths`, or environment-only config
    pub fn load_first(paths: impl IntoIterator<Item = PathBuf>) -> Result<Self, ConfigError> {
        for path in paths {
            if path.exists() {
                let config = Self::load_with_env(&path)?;
                tracing::info!("Loaded config from {:?}", path);
                return Ok(config);
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Ok(Self::from_env())
    }

    /// Config file locations, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        [
            Some(PathBuf::from("./almanac.toml")),
            Self::default_path(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Per-user config file (`<config dir>/almanac/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("almanac").join("config.toml"))
    }

    /// Persist configuration as TOML
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            error: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
            }
        }

        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Compile the configured prefix format
    pub fn prefix_format(&self) -> Result<PrefixFormat, ConfigError> {
        PrefixFormat::compile(&self.agenda.prefix_format).map_err(ConfigError::InvalidFormat)
    }

    /// Check settings that can't be checked by deserialization alone
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.prefix_format()?;
        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Agenda overrides
        if let Ok(format) = std::env::var("ALMANAC_PREFIX_FORMAT") {
            self.agenda.prefix_format = format;
        }

        // Vault overrides
        if let Ok(root) = std::env::var("ALMANAC_VAULT") {
            self.vault.root = root;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("ALMANAC_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ALMANAC_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Failed to serialize config: {error}")]
    Serialize { error: String },

    #[error("Invalid prefix format: {0}")]
    InvalidFormat(#[from] crate::parse::FormatError),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Almanac Configuration
#
# Environment variables override these settings:
# - ALMANAC_PREFIX_FORMAT
# - ALMANAC_VAULT
# - ALMANAC_LOG_LEVEL
# - ALMANAC_LOG_FORMAT

[agenda]
# Date prefix at the start of note names, in moment-style tokens.
# Should match the "unique prefix" your note creator uses.
prefix_format = "YYYYMMDDHHmm"

# Also show headings that start with a date
include_headings = true

[vault]
# Vault directory
root = "."

# File extensions to index
extensions = ["md"]

# Index files under hidden directories (.obsidian, .trash, ...)
include_hidden = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/almanac/almanac.log"
"#
    .to_string()
}
