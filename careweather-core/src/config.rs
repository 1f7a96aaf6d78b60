use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::Units;

/// Environment variable consulted before the config file for the API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeather API key. The `OPENWEATHER_API_KEY` environment variable
    /// takes precedence when set.
    pub api_key: Option<String>,

    /// Default unit system, e.g. "imperial".
    pub units: Option<String>,
}

impl Config {
    /// Resolve the API key: environment first, then the config file.
    /// Blank values count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        Self::pick_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.clone())
    }

    fn pick_api_key(from_env: Option<String>, configured: Option<String>) -> Option<String> {
        from_env
            .filter(|key| !key.trim().is_empty())
            .or_else(|| configured.filter(|key| !key.trim().is_empty()))
    }

    /// Default unit system, falling back to imperial when unset.
    pub fn default_units(&self) -> Result<Units> {
        match self.units.as_deref() {
            Some(value) => Units::try_from(value),
            None => Ok(Units::Imperial),
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn set_default_units(&mut self, units: Units) {
        self.units = Some(units.to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

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
        let dirs = ProjectDirs::from("dev", "careweather", "careweather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_wins_over_configured_key() {
        let picked =
            Config::pick_api_key(Some("ENV_KEY".to_string()), Some("FILE_KEY".to_string()));
        assert_eq!(picked.as_deref(), Some("ENV_KEY"));
    }

    #[test]
    fn blank_env_key_falls_back_to_configured_key() {
        let picked = Config::pick_api_key(Some("   ".to_string()), Some("FILE_KEY".to_string()));
        assert_eq!(picked.as_deref(), Some("FILE_KEY"));
    }

    #[test]
    fn blank_configured_key_counts_as_absent() {
        let picked = Config::pick_api_key(None, Some(String::new()));
        assert!(picked.is_none());
    }

    #[test]
    fn default_units_fall_back_to_imperial() {
        let cfg = Config::default();
        assert_eq!(cfg.default_units().unwrap(), Units::Imperial);
    }

    #[test]
    fn configured_units_are_parsed() {
        let mut cfg = Config::default();
        cfg.set_default_units(Units::Metric);
        assert_eq!(cfg.default_units().unwrap(), Units::Metric);
    }

    #[test]
    fn unknown_configured_units_error() {
        let cfg = Config {
            api_key: None,
            units: Some("kelvin".to_string()),
        };

        let err = cfg.default_units().unwrap_err();
        assert!(err.to_string().contains("Unknown unit system"));
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());
        cfg.set_default_units(Units::Standard);

        let serialized = toml::to_string_pretty(&cfg).expect("serializes");
        let parsed: Config = toml::from_str(&serialized).expect("parses");

        assert_eq!(parsed.api_key.as_deref(), Some("KEY"));
        assert_eq!(parsed.default_units().unwrap(), Units::Standard);
    }
}
