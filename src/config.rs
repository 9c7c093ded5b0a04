//! YAML Configuration File Support for UIPM
//!
//! Loads the storage and matcher settings for an embedded [`Uipm`](crate::Uipm)
//! from a single YAML file. The HTTP server has its own environment-driven
//! configuration (`server::ServerConfig`).
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # UIPM Configuration
//! version: "1.0"
//!
//! store:
//!   backend: "file"
//!   path: "data/naming-patterns.json"
//!
//! matcher:
//!   default_limit: 3
//!   default_min_score: 0.5
//!   exact_match_threshold: 0.95
//!   weights:
//!     preset: "custom"
//!     custom:
//!       childCount: 0.2
//!       childTypes: 0.2
//!       layoutMode: 0.1
//!       positionZone: 0.1
//!       aspectRatio: 0.1
//!       childNames: 0.1
//!       parentName: 0.1
//!       vectorPathHash: 0.05
//!       textFingerprint: 0.05
//! ```

use std::fs;
use std::path::Path;

use matcher::{MatchOptions, Weights, DEFAULT_LIMIT, DEFAULT_MIN_SCORE, EXACT_MATCH_THRESHOLD};
use serde::{Deserialize, Serialize};
use store::BackendConfig;
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Top-level YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UipmConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub store: StoreYamlConfig,

    #[serde(default)]
    pub matcher: MatcherYamlConfig,
}

impl UipmConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: UipmConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.store.validate()?;
        self.matcher.validate()?;

        Ok(())
    }
}

impl Default for UipmConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            store: StoreYamlConfig::default(),
            matcher: MatcherYamlConfig::default(),
        }
    }
}

/// Where the pattern library lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendKind {
    #[default]
    File,
    InMemory,
}

/// Store YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreYamlConfig {
    #[serde(default)]
    pub backend: StoreBackendKind,

    /// Document path, used by the `file` backend.
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl StoreYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.backend == StoreBackendKind::File && self.path.trim().is_empty() {
            return Err(ConfigLoadError::MissingField("store.path".to_string()));
        }
        Ok(())
    }

    pub fn backend_config(&self) -> BackendConfig {
        match self.backend {
            StoreBackendKind::File => BackendConfig::file(self.path.clone()),
            StoreBackendKind::InMemory => BackendConfig::in_memory(),
        }
    }
}

impl Default for StoreYamlConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackendKind::File,
            path: default_store_path(),
        }
    }
}

/// Named weight tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightsPreset {
    #[default]
    Default,
    Legacy,
    Custom,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightsYamlConfig {
    #[serde(default)]
    pub preset: WeightsPreset,

    /// Required when `preset` is `custom`; ignored otherwise.
    #[serde(default)]
    pub custom: Option<Weights>,
}

impl WeightsYamlConfig {
    /// The table this configuration selects.
    pub fn resolve(&self) -> Result<Weights, ConfigLoadError> {
        match self.preset {
            WeightsPreset::Default => Ok(Weights::default()),
            WeightsPreset::Legacy => Ok(Weights::legacy()),
            WeightsPreset::Custom => self
                .custom
                .ok_or_else(|| ConfigLoadError::MissingField("matcher.weights.custom".to_string())),
        }
    }
}

/// Matcher YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherYamlConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    #[serde(default = "default_min_score")]
    pub default_min_score: f64,

    #[serde(default = "default_exact_match_threshold")]
    pub exact_match_threshold: f64,

    #[serde(default)]
    pub weights: WeightsYamlConfig,
}

impl MatcherYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.default_limit == 0 {
            return Err(ConfigLoadError::Validation(
                "matcher.default_limit must be >= 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.default_min_score) {
            return Err(ConfigLoadError::Validation(
                "matcher.default_min_score must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.exact_match_threshold) {
            return Err(ConfigLoadError::Validation(
                "matcher.exact_match_threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        self.weights
            .resolve()?
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("matcher.weights: {err}")))?;
        Ok(())
    }

    /// Options applied when a caller does not pass its own.
    pub fn default_options(&self) -> MatchOptions {
        MatchOptions::default()
            .with_limit(self.default_limit)
            .with_min_score(self.default_min_score)
    }
}

impl Default for MatcherYamlConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            default_min_score: DEFAULT_MIN_SCORE,
            exact_match_threshold: EXACT_MATCH_THRESHOLD,
            weights: WeightsYamlConfig::default(),
        }
    }
}

// Helper functions for serde defaults
fn default_store_path() -> String {
    "data/naming-patterns.json".to_string()
}
fn default_limit() -> usize {
    DEFAULT_LIMIT
}
fn default_min_score() -> f64 {
    DEFAULT_MIN_SCORE
}
fn default_exact_match_threshold() -> f64 {
    EXACT_MATCH_THRESHOLD
}
