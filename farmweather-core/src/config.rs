use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

use crate::{
    geolocation::{DEFAULT_IP_LOOKUP_URL, FixedLocation, GeolocationProvider, IpGeolocation},
    model::Coordinates,
    provider::{OpenWeatherProvider, WeatherProvider, openweather},
};

/// Environment variable that takes precedence over the configured API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// OpenWeather access settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: openweather::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Where the position comes from when none is given on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Fall back to an IP-based lookup when no coordinates are configured.
    /// Off until the user opts in, since it sends the public IP to a third party.
    pub ip_lookup: bool,
    pub ip_lookup_url: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            ip_lookup: false,
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [openweather]
/// api_key = "..."
///
/// [location]
/// latitude = -1.29
/// longitude = 36.82
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub openweather: OpenWeatherConfig,
    pub location: LocationConfig,
}

impl Config {
    /// Load config from the platform path, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform path, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

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
        let dirs = ProjectDirs::from("dev", "farmweather", "farmweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key from the environment value if set, otherwise from the file.
    pub fn resolve_api_key(&self, env_value: Option<String>) -> Result<String> {
        env_value
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.openweather.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: set {API_KEY_ENV} or run `farmweather configure`."
                )
            })
    }

    pub fn api_key_from_env(&self) -> Result<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }

    /// Configured default coordinates, if both are present.
    pub fn fixed_coordinates(&self) -> Result<Option<Coordinates>> {
        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon)
                .map(Some)
                .context("Invalid coordinates in config file"),
            (None, None) => Ok(None),
            _ => Err(anyhow!(
                "Config file sets only one of latitude/longitude; set both or neither."
            )),
        }
    }

    pub fn set_fixed_coordinates(&mut self, coords: Option<Coordinates>) {
        self.location.latitude = coords.map(|c| c.latitude);
        self.location.longitude = coords.map(|c| c.longitude);
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.openweather.timeout_secs.max(1))
    }

    /// Geolocation source for a run: explicit coordinates win, then the
    /// configured ones, then an IP lookup if enabled. `None` means the
    /// position cannot be determined at all.
    pub fn geolocation(
        &self,
        override_coords: Option<Coordinates>,
    ) -> Result<Option<Box<dyn GeolocationProvider>>> {
        let coords = match override_coords {
            Some(coords) => Some(coords),
            None => self.fixed_coordinates()?,
        };
        if let Some(coords) = coords {
            return Ok(Some(Box::new(FixedLocation(coords))));
        }

        if self.location.ip_lookup {
            let ip = IpGeolocation::new(self.location.ip_lookup_url.clone(), self.timeout())?;
            return Ok(Some(Box::new(ip)));
        }

        Ok(None)
    }

    pub fn weather_provider(&self, api_key: String) -> Result<Box<dyn WeatherProvider>> {
        let provider = OpenWeatherProvider::with_base_url(
            api_key,
            self.openweather.base_url.clone(),
            self.timeout(),
        )?;
        Ok(Box::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("defaults");

        assert_eq!(cfg, Config::default());
        assert!(!cfg.location.ip_lookup);
        assert_eq!(cfg.openweather.base_url, openweather::DEFAULT_BASE_URL);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.openweather.api_key = Some("KEY".into());
        cfg.set_fixed_coordinates(Some(Coordinates::new(-1.29, 36.82).expect("valid")));
        cfg.location.ip_lookup = true;

        cfg.save_to(&path).expect("save");
        let loaded = Config::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[openweather]\napi_key = \"FILE_KEY\"\n").expect("write");

        let cfg = Config::load_from(&path).expect("load");
        assert_eq!(cfg.openweather.api_key.as_deref(), Some("FILE_KEY"));
        assert_eq!(cfg.openweather.timeout_secs, 10);
        assert!(!cfg.location.ip_lookup);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "openweather = [").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn env_key_wins_over_file() {
        let mut cfg = Config::default();
        cfg.openweather.api_key = Some("FILE_KEY".into());

        assert_eq!(cfg.resolve_api_key(Some("ENV_KEY".into())).expect("key"), "ENV_KEY");
        assert_eq!(cfg.resolve_api_key(None).expect("key"), "FILE_KEY");
        assert_eq!(cfg.resolve_api_key(Some("  ".into())).expect("key"), "FILE_KEY");
    }

    #[test]
    fn missing_key_has_hint() {
        let err = Config::default().resolve_api_key(None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("No OpenWeather API key configured"));
        assert!(msg.contains(API_KEY_ENV));
    }

    #[test]
    fn half_configured_coordinates_are_rejected() {
        let mut cfg = Config::default();
        cfg.location.latitude = Some(10.0);
        assert!(cfg.fixed_coordinates().is_err());

        cfg.location.longitude = Some(200.0);
        assert!(cfg.fixed_coordinates().is_err());

        cfg.location.longitude = Some(20.0);
        assert_eq!(
            cfg.fixed_coordinates().expect("valid"),
            Some(Coordinates { latitude: 10.0, longitude: 20.0 })
        );
    }

    #[test]
    fn geolocation_source_selection() {
        let mut cfg = Config::default();
        cfg.location.ip_lookup = false;
        assert!(cfg.geolocation(None).expect("no error").is_none());

        let coords = Coordinates::new(1.0, 2.0).expect("valid");
        assert!(cfg.geolocation(Some(coords)).expect("no error").is_some());

        cfg.location.ip_lookup = true;
        assert!(cfg.geolocation(None).expect("no error").is_some());
    }

    #[test]
    fn explicit_coordinates_bypass_half_configured_file() {
        let mut cfg = Config::default();
        cfg.location.latitude = Some(10.0);

        let coords = Coordinates::new(1.0, 2.0).expect("valid");
        let source = cfg
            .geolocation(Some(coords))
            .expect("override ignores the config location");
        assert!(source.is_some());

        assert!(cfg.geolocation(None).is_err());
    }

    #[tokio::test]
    async fn explicit_coordinates_win_over_configured_ones() {
        let mut cfg = Config::default();
        cfg.set_fixed_coordinates(Some(Coordinates::new(10.0, 20.0).expect("valid")));

        let coords = Coordinates::new(1.0, 2.0).expect("valid");
        let source = cfg
            .geolocation(Some(coords))
            .expect("no error")
            .expect("a source");
        assert_eq!(source.current_position().await, Ok(coords));
    }
}
