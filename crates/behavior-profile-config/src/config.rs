// crates/behavior-profile-config/src/config.rs
// ============================================================================
// Module: Behavior Profile Configuration
// Description: Configuration loading and validation for the profile runtime.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: behavior-profile-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section has defaults, so an empty file (or a missing default file)
//! yields the stock interpreter settings. Invalid values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use behavior_profile_core::InterpreterConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "behavior-profile.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "BEHAVIOR_PROFILE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default profile document size limit.
pub(crate) const DEFAULT_MAX_PROFILE_BYTES: usize = 1024 * 1024;
/// Upper bound for the configurable profile document size limit.
pub(crate) const MAX_PROFILE_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Upper bound for any configured tick count.
pub(crate) const MAX_TICKS: u32 = 100_000;
/// Maximum length of the log filter directive.
pub(crate) const MAX_LOG_FILTER_LENGTH: usize = 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Behavior profile runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Interpreter scheduling settings.
    #[serde(default)]
    pub interpreter: InterpreterSettings,
    /// Profile loading settings.
    #[serde(default)]
    pub profile: ProfileSettings,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Path the configuration was read from, when it came from disk.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is taken from `path`, then from `BEHAVIOR_PROFILE_CONFIG`,
    /// then `behavior-profile.toml` in the working directory. Only the
    /// default file may be absent, in which case defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = match fs::read(&resolved) {
            Ok(bytes) => bytes,
            Err(err) if !explicit && err.kind() == ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(err) => return Err(ConfigError::Io(err.to_string())),
        };
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml(content)?;
        config.source_path = Some(resolved);
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.interpreter.validate()?;
        self.profile.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Returns the interpreter configuration these settings describe.
    #[must_use]
    pub const fn to_interpreter_config(&self) -> InterpreterConfig {
        self.interpreter.to_interpreter_config()
    }
}

/// Interpreter scheduling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterpreterSettings {
    /// Ticks to wait before retrying an unresolvable behavior.
    #[serde(default = "default_retry_wait_ticks")]
    pub retry_wait_ticks: u32,
    /// Ticks to wait per iteration once the sub-behavior has completed.
    #[serde(default = "default_idle_wait_ticks")]
    pub idle_wait_ticks: u32,
    /// Ticks to yield after driving a running sub-behavior.
    #[serde(default = "default_yield_ticks")]
    pub yield_ticks: u32,
    /// Consecutive state changes allowed before yielding to the host.
    #[serde(default = "default_max_transitions_per_tick")]
    pub max_transitions_per_tick: u32,
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        Self {
            retry_wait_ticks: default_retry_wait_ticks(),
            idle_wait_ticks: default_idle_wait_ticks(),
            yield_ticks: default_yield_ticks(),
            max_transitions_per_tick: default_max_transitions_per_tick(),
        }
    }
}

impl InterpreterSettings {
    /// Validates interpreter scheduling settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_ticks("interpreter.retry_wait_ticks", self.retry_wait_ticks)?;
        validate_ticks("interpreter.idle_wait_ticks", self.idle_wait_ticks)?;
        validate_ticks("interpreter.yield_ticks", self.yield_ticks)?;
        validate_ticks("interpreter.max_transitions_per_tick", self.max_transitions_per_tick)?;
        if self.idle_wait_ticks >= self.retry_wait_ticks {
            return Err(ConfigError::Invalid(
                "interpreter.idle_wait_ticks must be < interpreter.retry_wait_ticks".to_string(),
            ));
        }
        Ok(())
    }

    /// Converts the settings into the interpreter's configuration type.
    #[must_use]
    pub const fn to_interpreter_config(&self) -> InterpreterConfig {
        InterpreterConfig {
            retry_wait_ticks: self.retry_wait_ticks,
            idle_wait_ticks: self.idle_wait_ticks,
            yield_ticks: self.yield_ticks,
            max_transitions_per_tick: self.max_transitions_per_tick,
        }
    }
}

/// Profile document loading configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSettings {
    /// Reject profiles that fail authoring validation before running them.
    #[serde(default)]
    pub strict_validation: bool,
    /// Maximum accepted profile document size in bytes.
    #[serde(default = "default_max_profile_bytes")]
    pub max_profile_bytes: usize,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            strict_validation: false,
            max_profile_bytes: default_max_profile_bytes(),
        }
    }
}

impl ProfileSettings {
    /// Validates profile loading settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_profile_bytes == 0 {
            return Err(ConfigError::Invalid("profile.max_profile_bytes must be > 0".to_string()));
        }
        if self.max_profile_bytes > MAX_PROFILE_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "profile.max_profile_bytes must be <= {MAX_PROFILE_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl LoggingSettings {
    /// Validates logging settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let trimmed = self.filter.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid("logging.filter must be non-empty".to_string()));
        }
        if trimmed.len() > MAX_LOG_FILTER_LENGTH {
            return Err(ConfigError::Invalid("logging.filter exceeds max length".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path, reporting whether it was explicitly requested.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a tick count is within `1..=MAX_TICKS`.
fn validate_ticks(field: &str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{field} must be >= 1")));
    }
    if value > MAX_TICKS {
        return Err(ConfigError::Invalid(format!("{field} must be <= {MAX_TICKS}")));
    }
    Ok(())
}

/// Default retry wait in ticks.
const fn default_retry_wait_ticks() -> u32 {
    20
}

/// Default idle wait in ticks.
const fn default_idle_wait_ticks() -> u32 {
    5
}

/// Default yield in ticks.
const fn default_yield_ticks() -> u32 {
    1
}

/// Default state-change budget per tick.
const fn default_max_transitions_per_tick() -> u32 {
    64
}

/// Default profile size limit.
const fn default_max_profile_bytes() -> usize {
    DEFAULT_MAX_PROFILE_BYTES
}

/// Default log filter directive.
fn default_log_filter() -> String {
    "info".to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
