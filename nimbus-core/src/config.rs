use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    model::Coordinates,
    registry::{CityRegistry, Zone},
};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_PREDICT_URL: &str = "https://nahuelito22-nimbus-ai.hf.space/api/predict";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Mendoza Capital.
pub const FALLBACK_COORDINATES: Coordinates = Coordinates::new(-32.8908, -68.8272);

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local backend serving `/api/meteo/*`.
    pub backend_url: String,

    /// Hail prediction endpoint (full URL, POST).
    pub predict_url: String,

    /// Open-Meteo compatible forecast endpoint.
    pub forecast_url: String,

    pub geolocation_timeout_secs: u64,

    /// Fixed position used instead of asking for geolocation.
    pub position: Option<Coordinates>,

    /// Where to fall back to when no position can be obtained.
    pub fallback: Coordinates,

    /// Example TOML:
    /// [[zones]]
    /// name = "norte"
    /// cities = [{ name = "Lavalle", lat = -32.7, lng = -68.5833 }]
    ///
    /// Empty means the built-in Mendoza table.
    pub zones: Vec<Zone>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            predict_url: DEFAULT_PREDICT_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            geolocation_timeout_secs: 5,
            position: None,
            fallback: FALLBACK_COORDINATES,
            zones: Vec::new(),
        }
    }
}

impl Config {
    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_secs(self.geolocation_timeout_secs)
    }

    /// Registry injected into the controller at startup.
    pub fn registry(&self) -> CityRegistry {
        if self.zones.is_empty() {
            CityRegistry::mendoza()
        } else {
            CityRegistry::new(self.zones.clone())
        }
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        for zone in &self.zones {
            if zone.name.is_empty() {
                return Err(anyhow!("Zone names must not be empty"));
            }
            if zone.name == crate::registry::ALL_ZONES {
                return Err(anyhow!(
                    "'{}' is reserved for the all-zones view and cannot name a zone",
                    zone.name
                ));
            }
        }
        Ok(())
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "nimbus", "nimbus")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
