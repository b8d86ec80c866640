//! Metamodel configuration via `causeway.toml`
//!
//! Every setting has a default, so an empty file (or no file at all) gives
//! lazy, sequential introspection with incremental validation enabled.

use causeway_core::{MetamodelError, MetamodelResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "causeway.toml";

/// Default capacity of the pending re-validation queue.
pub const DEFAULT_VALIDATION_QUEUE_CAPACITY: usize = 1024;

/// How much of the metamodel is introspected at bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntrospectionMode {
    /// Only what bootstrap needs; the rest on first access
    #[default]
    Lazy,
    /// Every cached spec is fully introspected before bootstrap completes
    Full,
}

/// `[introspector]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectorConfig {
    /// Introspect batches on the rayon thread pool
    #[serde(default)]
    pub parallelize: bool,
    /// Lazy or full introspection
    #[serde(default)]
    pub mode: IntrospectionMode,
    /// Re-validate whenever a spec is discovered after bootstrap
    #[serde(default = "default_true")]
    pub validate_incrementally: bool,
}

impl Default for IntrospectorConfig {
    fn default() -> Self {
        Self {
            parallelize: false,
            mode: IntrospectionMode::Lazy,
            validate_incrementally: true,
        }
    }
}

/// `[validator]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Run validators on the rayon thread pool
    #[serde(default)]
    pub parallelize: bool,
    /// Capacity of the pending re-validation queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            parallelize: false,
            queue_capacity: DEFAULT_VALIDATION_QUEUE_CAPACITY,
        }
    }
}

/// `[lifecycle]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Upper bound on waiting for in-flight validation during disposal
    #[serde(default = "default_dispose_timeout_ms")]
    pub dispose_timeout_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            dispose_timeout_ms: default_dispose_timeout_ms(),
        }
    }
}

/// Metamodel configuration loaded from `causeway.toml`.
///
/// # Example
///
/// ```toml
/// [introspector]
/// parallelize = false
/// mode = "lazy"
/// validate_incrementally = true
///
/// [validator]
/// parallelize = false
/// queue_capacity = 1024
///
/// [lifecycle]
/// dispose_timeout_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MetamodelConfig {
    /// Introspection settings
    #[serde(default)]
    pub introspector: IntrospectorConfig,
    /// Validation settings
    #[serde(default)]
    pub validator: ValidatorConfig,
    /// Create/dispose settings
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

fn default_true() -> bool {
    true
}

fn default_queue_capacity() -> usize {
    DEFAULT_VALIDATION_QUEUE_CAPACITY
}

fn default_dispose_timeout_ms() -> u64 {
    5000
}

impl MetamodelConfig {
    /// True if bootstrap must fully introspect every cached spec
    pub fn is_full_introspect(&self) -> bool {
        self.introspector.mode == IntrospectionMode::Full
    }

    /// Disposal wait bound as a `Duration`
    pub fn dispose_timeout(&self) -> Duration {
        Duration::from_millis(self.lifecycle.dispose_timeout_ms)
    }

    /// Reject settings that cannot work.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the queue capacity is zero.
    pub fn validate(&self) -> MetamodelResult<()> {
        if self.validator.queue_capacity == 0 {
            return Err(MetamodelError::config(
                "validator.queue_capacity must be at least 1",
            ));
        }
        Ok(())
    }

    /// Parse from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the text does not parse or fails
    /// [`MetamodelConfig::validate`].
    pub fn from_toml_str(content: &str) -> MetamodelResult<Self> {
        let config: MetamodelConfig = toml::from_str(content)
            .map_err(|e| MetamodelError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Causeway metamodel configuration

[introspector]
# Introspect spec batches in parallel (default: false)
parallelize = false
# "lazy" (default) introspects on demand; "full" introspects every spec at bootstrap
mode = "lazy"
# Re-validate the metamodel whenever a spec is discovered after bootstrap
validate_incrementally = true

[validator]
# Run validators in parallel (default: false)
parallelize = false
# Capacity of the pending re-validation queue
queue_capacity = 1024

[lifecycle]
# Maximum time disposal waits for in-flight validation, in milliseconds
dispose_timeout_ms = 5000
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> MetamodelResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MetamodelError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| {
            MetamodelError::config(format!("Invalid config file '{}': {}", path.display(), e))
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> MetamodelResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                MetamodelError::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> MetamodelResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MetamodelError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            MetamodelError::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
