//! TOML-based configuration for semcube.
//!
//! Example configuration:
//! ```toml
//! [compiler]
//! dialect = "snowflake"
//!
//! [variations]
//! default_policy = "deny"    # roles missing from a variation see nothing
//! enforcement = "predicate"  # out-of-set filter values are restricted, not rejected
//!
//! [grains]
//! allowed = ["day", "week", "month"]
//!
//! [cache]
//! enabled = true
//! max_entries = 10000
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::TimeGrain;
use crate::sql::dialect::Dialect;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SEMCUBE_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub compiler: CompilerSettings,
    pub variations: VariationSettings,
    pub grains: GrainSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Target SQL dialect.
    pub dialect: Dialect,
}

/// Visibility for a role with no variation on a varied dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariationPolicy {
    /// Full visibility.
    #[default]
    Open,
    /// No visibility: the request is rejected.
    Deny,
}

/// Treatment of explicit `equals` values outside a role's set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariationEnforcement {
    /// Reject the request.
    #[default]
    Strict,
    /// Add the role's `IN (allowed)` predicate and let the filter run.
    Predicate,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VariationSettings {
    pub default_policy: VariationPolicy,
    pub enforcement: VariationEnforcement,
}

/// The grains callers may request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GrainSettings {
    pub allowed: Vec<TimeGrain>,
}

impl Default for GrainSettings {
    fn default() -> Self {
        Self {
            allowed: vec![
                TimeGrain::Day,
                TimeGrain::Week,
                TimeGrain::Month,
                TimeGrain::Quarter,
                TimeGrain::Year,
            ],
        }
    }
}

impl GrainSettings {
    pub fn allows(&self, grain: TimeGrain) -> bool {
        self.allowed.contains(&grain)
    }
}

/// Plan cache configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,

    /// Upper bound on stored plans. Unbounded when absent.
    pub max_entries: Option<usize>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SEMCUBE_CONFIG`
    /// 2. `./semcube.toml`
    /// 3. `~/.config/semcube/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("semcube.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("semcube").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.grains.allowed.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "grains.allowed must list at least one grain".into(),
            ));
        }
        if self.cache.max_entries == Some(0) {
            return Err(SettingsError::InvalidConfig(
                "cache.max_entries must be positive; set cache.enabled = false instead".into(),
            ));
        }
        Ok(())
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.compiler.dialect = dialect;
        self
    }

    pub fn with_variation_policy(mut self, policy: VariationPolicy) -> Self {
        self.variations.default_policy = policy;
        self
    }

    pub fn with_enforcement(mut self, enforcement: VariationEnforcement) -> Self {
        self.variations.enforcement = enforcement;
        self
    }
}
