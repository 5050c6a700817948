use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    model::{Coordinates, Units},
    presenter::{DEFAULT_TILE_URL, DEFAULT_ZOOM, MAX_ZOOM, TileSource},
};

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How many decorative markers to scatter, and how far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub count: usize,
    pub radius_km: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self { count: 10, radius_km: 35.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub zoom: u8,
    pub tile_url: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { zoom: DEFAULT_ZOOM, tile_url: DEFAULT_TILE_URL.to_string() }
    }
}

impl MapConfig {
    pub fn tile_source(&self) -> TileSource {
        TileSource::new(self.tile_url.clone())
    }
}

/// Position reported by the platform. Absent means geolocation is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeolocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeolocationConfig {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "imperial"
///
/// [overlay]
/// count = 10
/// radius_km = 35.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub units: Units,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub overlay: OverlayConfig,
    pub map: MapConfig,
    pub geolocation: GeolocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            units: Units::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            overlay: OverlayConfig::default(),
            map: MapConfig::default(),
            geolocation: GeolocationConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk (or defaults on first run) and apply `OPENWEATHER_API_KEY`.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env_override(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weathermap", "weathermap")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// A non-empty environment value replaces the stored key.
    pub fn apply_env_override(&mut self, env_key: Option<String>) {
        if let Some(key) = env_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Returns the API key, or a hint on how to configure one.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `weathermap configure` or set {API_KEY_ENV}."
            )
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.overlay.count == 0 {
            bail!("overlay.count must be at least 1");
        }
        if !self.overlay.radius_km.is_finite() || self.overlay.radius_km <= 0.0 {
            bail!("overlay.radius_km must be a positive number, got {}", self.overlay.radius_km);
        }
        if self.map.zoom > MAX_ZOOM {
            bail!("map.zoom must be between 0 and {MAX_ZOOM}, got {}", self.map.zoom);
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("weathermap-test-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn defaults_match_dashboard() {
        let cfg = Config::default();
        assert_eq!(cfg.overlay.count, 10);
        assert_eq!(cfg.overlay.radius_km, 35.0);
        assert_eq!(cfg.map.zoom, 10);
        assert_eq!(cfg.units, Units::Imperial);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn require_api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.require_api_key().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains(API_KEY_ENV));
    }

    #[test]
    fn env_override_wins_over_file() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        cfg.apply_env_override(Some("ENV_KEY".into()));
        assert_eq!(cfg.require_api_key().unwrap(), "ENV_KEY");
    }

    #[test]
    fn blank_env_override_is_ignored() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        cfg.apply_env_override(Some("  ".into()));
        cfg.apply_env_override(None);
        assert_eq!(cfg.require_api_key().unwrap(), "FILE_KEY");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "abc"
            units = "metric"

            [overlay]
            radius_km = 12.5
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.units, Units::Metric);
        assert_eq!(cfg.overlay.radius_km, 12.5);
        assert_eq!(cfg.overlay.count, 10);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.geolocation.coordinates(), None);
    }

    #[test]
    fn validate_rejects_bad_overlay() {
        let mut cfg = Config::default();
        cfg.overlay.count = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.overlay.radius_km = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.map.zoom = 25;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn save_then_load_from_path() {
        let path = temp_config_path("roundtrip");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.geolocation = GeolocationConfig { latitude: Some(22.57), longitude: Some(88.36) };
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.geolocation.coordinates(), Some(Coordinates::new(22.57, 88.36)));

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = temp_config_path("missing");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
    }
}
