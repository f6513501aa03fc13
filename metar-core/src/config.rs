use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::report::SelectionPolicy;

/// Station used when neither the command line nor the config names one.
pub const DEMO_STATION: &str = "KIND";

pub const DEFAULT_BASE_URL: &str =
    "https://www.aviationweather.gov/adds/dataserver_current/httpparam";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_station = "KIND"
/// selection = "require_unique"
/// timeout_secs = 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// METAR data server endpoint.
    pub base_url: String,

    /// Whole-request timeout for the fetch.
    pub timeout_secs: u64,

    /// How far back the data server should look for reports.
    pub hours_before_now: u32,

    /// Policy applied when a station string matches several stations.
    pub selection: SelectionPolicy,

    pub default_station: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            hours_before_now: 1,
            selection: SelectionPolicy::default(),
            default_station: None,
        }
    }
}

impl Config {
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
        if cfg.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }
        Ok(cfg)
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
        let dirs = ProjectDirs::from("dev", "metar", "metar-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Explicit station if given and non-blank, then the configured default, then [`DEMO_STATION`].
    pub fn station_or_default<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or(self.default_station.as_deref())
            .unwrap_or(DEMO_STATION)
    }
}
