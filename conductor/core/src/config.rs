//! TOML Configuration File Support
//!
//! Centralized configuration loading for First-Aid Buddy surfaces, with an
//! optional TOML file at `~/.config/first-aid-buddy/config.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied by the caller through [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:8000"
//! timeout_secs = 0          # 0 = wait indefinitely
//!
//! [session]
//! region = "UK"             # UK | US | EU
//! late_responses = "apply"  # apply | discard-after-clear
//! ```
//!
//! # Environment Variables
//!
//! - `BUDDY_API_URL`: service base URL
//! - `BUDDY_TIMEOUT_SECS`: transport timeout in seconds (0 = none)
//! - `BUDDY_REGION`: initial region
//! - `BUDDY_LATE_RESPONSES`: late response policy

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::BackendConfig;
use crate::conductor::{ConductorConfig, LateResponsePolicy};
use crate::region::Region;

/// Environment variable for the service base URL
pub const ENV_API_URL: &str = "BUDDY_API_URL";
/// Environment variable for the transport timeout
pub const ENV_TIMEOUT_SECS: &str = "BUDDY_TIMEOUT_SECS";
/// Environment variable for the initial region
pub const ENV_REGION: &str = "BUDDY_REGION";
/// Environment variable for the late response policy
pub const ENV_LATE_RESPONSES: &str = "BUDDY_LATE_RESPONSES";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the configuration came from (highest layer that set a value)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Backend section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// Service base URL
    pub base_url: Option<String>,
    /// Transport timeout in seconds (0 = no timeout)
    pub timeout_secs: Option<u64>,
}

/// Session section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    /// Initial region
    pub region: Option<String>,
    /// Late response policy
    pub late_responses: Option<String>,
}

/// Root TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuddyToml {
    /// Backend settings
    pub backend: BackendToml,
    /// Session settings
    pub session: SessionToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved configuration
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuddyConfig {
    /// Transport settings
    pub backend: BackendConfig,
    /// Conductor settings
    pub conductor: ConductorConfig,
    /// The file that was loaded, if any
    pub config_file_path: Option<PathBuf>,
    source: ConfigSource,
}

impl BuddyConfig {
    /// Defaults only
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the configuration came from
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check values that cannot be expressed in types
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a base URL that is not
    /// `http://` or `https://`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend.base_url.trim();
        let rest = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"));
        match rest {
            Some(host) if !host.trim_matches('/').is_empty() => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "base URL must start with http:// or https:// and name a host, got '{url}'"
            ))),
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/first-aid-buddy/config.toml` or the platform
/// equivalent.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("first-aid-buddy").join("config.toml"))
}

/// Load configuration from the default file and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if any
/// value fails validation. A missing config file is not an error.
pub fn load_config() -> Result<BuddyConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if any value
/// fails validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<BuddyConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<BuddyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = BuddyConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: BuddyToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env)?;
    config.validate()?;

    Ok(config)
}

fn parse_region(value: &str) -> Result<Region, ConfigError> {
    value
        .parse()
        .map_err(|e: crate::region::UnknownRegion| ConfigError::ValidationError(e.to_string()))
}

fn parse_late_responses(value: &str) -> Result<LateResponsePolicy, ConfigError> {
    value.parse().map_err(ConfigError::ValidationError)
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut BuddyConfig, toml: &BuddyToml) -> Result<(), ConfigError> {
    if let Some(ref url) = toml.backend.base_url {
        config.backend.base_url = url.clone();
    }
    if let Some(secs) = toml.backend.timeout_secs {
        config.backend.timeout = timeout_from_secs(secs);
    }
    if let Some(ref region) = toml.session.region {
        config.conductor.default_region = parse_region(region)?;
    }
    if let Some(ref policy) = toml.session.late_responses {
        config.conductor.late_responses = parse_late_responses(policy)?;
    }
    Ok(())
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut BuddyConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(ENV_API_URL) {
        config.backend.base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(secs) = env(ENV_TIMEOUT_SECS) {
        let secs = secs.trim().parse::<u64>().map_err(|_| {
            ConfigError::ValidationError(format!("{ENV_TIMEOUT_SECS} must be a whole number, got '{secs}'"))
        })?;
        config.backend.timeout = timeout_from_secs(secs);
        config.source = ConfigSource::Env;
    }
    if let Some(region) = env(ENV_REGION) {
        config.conductor.default_region = parse_region(&region)?;
        config.source = ConfigSource::Env;
    }
    if let Some(policy) = env(ENV_LATE_RESPONSES) {
        config.conductor.late_responses = parse_late_responses(&policy)?;
        config.source = ConfigSource::Env;
    }
    Ok(())
}

// =============================================================================
// CLI Overrides
// =============================================================================

/// Overrides supplied on the command line
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Service base URL
    pub api_url: Option<String>,
    /// Initial region
    pub region: Option<Region>,
    /// Transport timeout in seconds (0 = none)
    pub timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// No overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the base URL
    #[must_use]
    pub fn with_api_url(mut self, url: String) -> Self {
        self.api_url = Some(url);
        self
    }

    /// Override the initial region
    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Override the transport timeout
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Apply overrides, then re-validate
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if an override is invalid.
    pub fn apply(&self, config: &mut BuddyConfig) -> Result<(), ConfigError> {
        let mut changed = false;
        if let Some(ref url) = self.api_url {
            config.backend.base_url = url.clone();
            changed = true;
        }
        if let Some(region) = self.region {
            config.conductor.default_region = region;
            changed = true;
        }
        if let Some(secs) = self.timeout_secs {
            config.backend.timeout = timeout_from_secs(secs);
            changed = true;
        }
        if changed {
            config.source = ConfigSource::Cli;
        }
        config.validate()
    }
}
