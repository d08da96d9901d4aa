//! Configuration file support for GliMind.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/glimind/config.toml`.

use crate::classifier::Advisor;
use crate::types::{TimingPolicy, Wording};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub advisory: AdvisoryConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Advisory engine configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AdvisoryConfig {
    #[serde(default)]
    pub timing: TimingPolicy,

    #[serde(default)]
    pub wording: Wording,
}

impl AdvisoryConfig {
    pub fn advisor(&self) -> Advisor {
        Advisor::new(self.timing, self.wording)
    }
}

/// Input validation limits applied before classification
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Values above this are rejected as implausible entries
    #[serde(default = "default_max_glucose_mg_dl")]
    pub max_glucose_mg_dl: i32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_glucose_mg_dl: default_max_glucose_mg_dl(),
        }
    }
}

/// Measurement reminder configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_recheck_after_hours")]
    pub recheck_after_hours: i64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            recheck_after_hours: default_recheck_after_hours(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("glimind")
}

fn default_max_glucose_mg_dl() -> i32 {
    1000
}

fn default_recheck_after_hours() -> i64 {
    6
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("glimind").join("config.toml")
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.validation.max_glucose_mg_dl <= 0 {
            return Err(Error::Config(format!(
                "validation.max_glucose_mg_dl must be positive, got {}",
                self.validation.max_glucose_mg_dl
            )));
        }
        if self.monitoring.recheck_after_hours <= 0 {
            return Err(Error::Config(format!(
                "monitoring.recheck_after_hours must be positive, got {}",
                self.monitoring.recheck_after_hours
            )));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
