//! Configuration loading and persistence with atomic file operations.

use crate::schema::Config;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "CCMD_CONFIG_PATH";

/// Configuration file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading or writing the configuration file
    #[error("Failed to access configuration file {path}: {source}")]
    Io {
        /// File that could not be accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Failed to write TOML configuration: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {message}")]
    EnvParse {
        /// Variable name.
        var: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    Validation(String),

    /// File watcher error
    #[error("Failed to watch configuration file: {0}")]
    Watch(#[from] notify::Error),
}

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`, also the fallback for unknown extensions.
    Yaml,
    /// `.toml`
    Toml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Self::Toml,
            Some("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    /// Parses configuration text.
    pub fn parse(self, content: &str) -> Result<Config, ConfigError> {
        Ok(match self {
            Self::Yaml => serde_yaml::from_str(content)?,
            Self::Toml => toml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        })
    }

    /// Serializes configuration to text.
    pub fn render(self, config: &Config) -> Result<String, ConfigError> {
        Ok(match self {
            Self::Yaml => serde_yaml::to_string(config)?,
            Self::Toml => toml::to_string_pretty(config)?,
            Self::Json => serde_json::to_string_pretty(config)?,
        })
    }
}

/// Configuration loader with atomic file operations.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a loader for `CCMD_CONFIG_PATH`, or `config.yaml` when unset.
    pub fn from_env() -> Self {
        Self::new(env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()))
    }

    /// Path of the configuration file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads, overrides from the environment and validates the configuration.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut config = ConfigFormat::from_path(&self.path).parse(&content)?;
        debug!(
            path = %self.path.display(),
            commands = config.custom_commands.len(),
            "Parsed configuration file"
        );

        apply_overrides(&mut config, |var| env::var(var).ok())?;
        config
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        Ok(config)
    }

    /// Writes a default configuration file if none exists.
    ///
    /// Returns whether a file was written. Nothing is logged, so this can run
    /// before logging is set up.
    pub fn init_if_missing(&self) -> Result<bool, ConfigError> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&Config::default())?;
        Ok(true)
    }

    /// Loads the configuration, first writing a default file if none exists.
    pub fn load_or_init(&self) -> Result<Config, ConfigError> {
        if self.init_if_missing()? {
            warn!(path = %self.path.display(), "Configuration file not found, wrote defaults");
        }
        self.load()
    }

    /// Saves configuration to file atomically.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let content = ConfigFormat::from_path(&self.path).render(config)?;
        let io_error = |source: std::io::Error| ConfigError::Io {
            path: self.path.clone(),
            source,
        };

        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&directory).map_err(io_error)?;

        let mut file = tempfile::NamedTempFile::new_in(&directory).map_err(io_error)?;
        file.write_all(content.as_bytes()).map_err(io_error)?;
        file.persist(&self.path).map_err(|e| io_error(e.error))?;
        Ok(())
    }
}

/// Applies environment overrides using `lookup` to read variables.
///
/// Recognized variables: `DISCORD_TOKEN`, `CCMD_REQUEST_TIMEOUT`,
/// `CCMD_STATE_PATH` and `CCMD_LOG_LEVEL`.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup("DISCORD_TOKEN") {
        config.discord.token = token;
    }

    if let Some(timeout) = lookup("CCMD_REQUEST_TIMEOUT") {
        config.discord.request_timeout_seconds =
            timeout.trim().parse().map_err(|e| ConfigError::EnvParse {
                var: "CCMD_REQUEST_TIMEOUT".to_string(),
                message: format!("{e}"),
            })?;
    }

    if let Some(path) = lookup("CCMD_STATE_PATH") {
        config.state.path = PathBuf::from(path);
    }

    if let Some(level) = lookup("CCMD_LOG_LEVEL") {
        config.logging.level = level;
    }

    Ok(())
}
