//! # Configuration
//!
//! Optional `tessera.toml` read at startup.
//!
//! ```toml
//! [neighborhood]
//! label_attribute = "label"
//! index_attribute = "index"
//! key_attribute = "key"
//!
//! [output]
//! json = false
//! ```
//!
//! Every key is optional. A missing file means all defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tessera_core::{NeighborhoodConfig, TesseraError};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TesseraConfig {
    /// Attribute names used by neighborhood commands.
    pub neighborhood: NeighborhoodConfig,
    pub output: OutputConfig,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Emit JSON even without `--json`.
    pub json: bool,
}

impl TesseraConfig {
    /// Parse configuration text.
    pub fn from_toml(text: &str) -> Result<Self, TesseraError> {
        toml::from_str(text).map_err(|e| TesseraError::ConfigError(e.to_string()))
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, TesseraError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            TesseraError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml(&text).map_err(|e| match e {
            TesseraError::ConfigError(detail) => {
                TesseraError::ConfigError(format!("{}: {}", path.display(), detail))
            }
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}
