use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{Coordinate, DonationCenter};

/// Main configuration structure
///
/// Loaded from the config file with defaults for anything missing.
/// Priority: CLI > Env > File > Defaults (like a sensible person would do)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub location: LocationConfig,
    /// Donation center catalog used for proximity ranking
    #[serde(default = "default_centers")]
    pub centers: Vec<DonationCenter>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            location: LocationConfig::default(),
            centers: default_centers(),
        }
    }
}

impl Config {
    /// Load config from default location, falling back to defaults if the
    /// file doesn't exist yet
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Get the config file path
    /// Uses XDG on Linux/macOS, AppData on Windows
    fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("shelfwatch");

        Ok(config_dir.join("config.toml"))
    }

    /// Default location of the item database
    pub fn db_path() -> crate::Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
            .join("shelfwatch");

        Ok(data_dir.join("items.db"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Seconds between scans in watch mode
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    60
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Fixed home coordinate; set it to skip the geoip lookup entirely
    pub home: Option<Coordinate>,

    /// IP geolocation endpoint (ip-api.com response shape)
    #[serde(default = "default_geoip_url")]
    pub geoip_url: String,

    /// Lookup timeout in seconds; on expiry the location counts as unknown
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_geoip_url() -> String {
    "http://ip-api.com/json".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            home: None,
            geoip_url: default_geoip_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_centers() -> Vec<DonationCenter> {
    vec![
        DonationCenter {
            name: "City Food Bank A".to_string(),
            address: "Central district".to_string(),
            lat: 28.644800,
            lon: 77.216721,
        },
        DonationCenter {
            name: "Community Kitchen B".to_string(),
            address: "Near market".to_string(),
            lat: 28.535517,
            lon: 77.391029,
        },
        DonationCenter {
            name: "NGO Pantry C".to_string(),
            address: "Local shelter".to_string(),
            lat: 28.459497,
            lon: 77.026638,
        },
        DonationCenter {
            name: "Neighborhood Donation Hub".to_string(),
            address: "Community center".to_string(),
            lat: 28.669156,
            lon: 77.453758,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scan.interval_secs, 60);
        assert_eq!(config.location.timeout_secs, 10);
        assert!(config.location.home.is_none());
        assert_eq!(config.centers.len(), 4);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [scan]
            interval_secs = 300

            [location]
            home = { lat = 28.61, lon = 77.20 }
            "#,
        )
        .unwrap();

        assert_eq!(config.scan.interval_secs, 300);
        assert_eq!(
            config.location.home,
            Some(Coordinate {
                lat: 28.61,
                lon: 77.20
            })
        );
        assert_eq!(config.location.timeout_secs, 10);
        assert_eq!(config.centers.len(), 4);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.centers, config.centers);
        assert_eq!(parsed.scan.interval_secs, config.scan.interval_secs);
    }
}
