//! Analytics configuration loaded from TOML.

use crate::allocation::DEFAULT_TOLERANCE;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Tunables for the analytics and the CLI that renders them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Remainders below this count as a complete allocation
    pub allocation_tolerance: f64,
    /// Decimals shown for composition percentages
    pub display_decimals: u32,
    /// Snapshot file used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            allocation_tolerance: DEFAULT_TOLERANCE,
            display_decimals: 1,
            snapshot_path: None,
        }
    }
}

impl AnalyticsConfig {
    /// Get the default config file path.
    ///
    /// Default path: `~/.folio/config.toml`
    /// Can be overridden with `FOLIO_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("FOLIO_CONFIG") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".folio/config.toml"))
            .unwrap_or_else(|| PathBuf::from("folio.toml"))
    }

    /// Load from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load from a specific path; a missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Round a figure to the configured display precision.
    pub fn round(&self, value: f64) -> f64 {
        round_to(value, self.display_decimals)
    }

    fn validate(&self) -> Result<()> {
        if !self.allocation_tolerance.is_finite() || self.allocation_tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "allocation_tolerance must be a non-negative number, got {}",
                self.allocation_tolerance
            )));
        }
        Ok(())
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
