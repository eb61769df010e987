use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use chrono_tz::Tz;
use directories::ProjectDirs;
use log::debug;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::event::DEFAULT_EVENT_DURATION_MINUTES;
use crate::summary::MAX_UPCOMING_DAYS;

/// Longest event a command line may create: one week.
pub const MAX_EVENT_DURATION_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub calendar_id: String,
    /// IANA zone attached to times that do not name their own zone
    pub time_zone: String,
    pub event_duration_minutes: i64,
    pub description: String,
    pub upcoming_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Environment variable holding the OAuth access token
    pub access_token_env: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            time_zone: "Asia/Singapore".to_string(),
            event_duration_minutes: DEFAULT_EVENT_DURATION_MINUTES,
            description: "Event added via app".to_string(),
            upcoming_days: 7,
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            request_timeout_secs: 30,
            access_token_env: "EVENTLINE_ACCESS_TOKEN".to_string(),
        }
    }
}

impl Config {
    /// Load and validate from `path`, or from the default location when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`] but without validation, for inspecting or
    /// replacing a broken file.
    pub fn read(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => get_config_path()?,
        };

        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.time_zone()?;
        if self.calendar.calendar_id.trim().is_empty() {
            return Err(anyhow!("calendar.calendar_id must not be empty"));
        }
        self.event_duration()?;
        if !(1..=MAX_UPCOMING_DAYS).contains(&self.calendar.upcoming_days) {
            return Err(anyhow!(
                "calendar.upcoming_days must be between 1 and {}, got {}",
                MAX_UPCOMING_DAYS,
                self.calendar.upcoming_days
            ));
        }
        Ok(())
    }

    pub fn time_zone(&self) -> Result<Tz> {
        let name = &self.calendar.time_zone;
        name.parse::<Tz>()
            .map_err(|e| anyhow!("Unknown time zone '{}': {}", name, e))
    }

    pub fn event_duration(&self) -> Result<Duration> {
        let minutes = self.calendar.event_duration_minutes;
        if !(1..=MAX_EVENT_DURATION_MINUTES).contains(&minutes) {
            return Err(anyhow!(
                "calendar.event_duration_minutes must be between 1 and {}, got {}",
                MAX_EVENT_DURATION_MINUTES,
                minutes
            ));
        }
        Duration::try_minutes(minutes)
            .ok_or_else(|| anyhow!("calendar.event_duration_minutes is out of range: {}", minutes))
    }

    /// Read the access token from the environment variable named in the config.
    pub fn access_token(&self) -> Result<SecretString> {
        let var = &self.google.access_token_env;
        match std::env::var(var) {
            Ok(token) if !token.trim().is_empty() => {
                Ok(SecretString::from(token.trim().to_string()))
            }
            _ => Err(anyhow!(
                "No access token found. Set {} to a Google Calendar OAuth access token",
                var
            )),
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "eventline", "eventline")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.calendar.calendar_id, "primary");
        assert_eq!(config.calendar.event_duration_minutes, 120);
        assert_eq!(config.calendar.upcoming_days, 7);
        assert_eq!(config.time_zone().unwrap(), chrono_tz::Asia::Singapore);
        assert_eq!(config.event_duration().unwrap(), Duration::hours(2));
    }

    #[test]
    fn test_config_save_load() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.calendar.time_zone = "Europe/Berlin".to_string();
        config.calendar.event_duration_minutes = 45;
        config.save(&config_path)?;

        let loaded = Config::load(Some(&config_path))?;
        assert_eq!(loaded, config);

        Ok(())
    }

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let temp_dir = tempdir()?;
        let loaded = Config::load(Some(&temp_dir.path().join("absent.toml")))?;
        assert_eq!(loaded, Config::default());
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[calendar]\ntime_zone = \"UTC\"\n")?;

        let loaded = Config::load(Some(&path))?;
        assert_eq!(loaded.calendar.time_zone, "UTC");
        assert_eq!(loaded.calendar.calendar_id, "primary");
        assert_eq!(loaded.google, GoogleConfig::default());
        Ok(())
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = Config::default();
        config.calendar.time_zone = "Mars/Olympus_Mons".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.calendar.event_duration_minutes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.calendar.event_duration_minutes = MAX_EVENT_DURATION_MINUTES + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.calendar.upcoming_days = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.calendar.upcoming_days = MAX_UPCOMING_DAYS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_duration_in_file_is_an_error() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[calendar]\nevent_duration_minutes = 9223372036854775807\n",
        )?;

        assert!(Config::load(Some(&path)).is_err());

        let config = Config::read(Some(&path))?;
        assert!(config.event_duration().is_err());
        Ok(())
    }

    #[test]
    fn test_read_skips_validation() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[calendar]\ntime_zone = \"Nowhere/Land\"\n")?;

        assert!(Config::load(Some(&path)).is_err());
        let config = Config::read(Some(&path))?;
        assert_eq!(config.calendar.time_zone, "Nowhere/Land");
        Ok(())
    }

    #[test]
    fn test_access_token_from_named_variable() {
        let mut config = Config::default();
        config.google.access_token_env = "EVENTLINE_TEST_TOKEN_CONFIG".to_string();

        assert!(config.access_token().is_err());

        std::env::set_var("EVENTLINE_TEST_TOKEN_CONFIG", " abc123 ");
        let token = config.access_token().unwrap();
        assert_eq!(token.expose_secret(), "abc123");
        std::env::remove_var("EVENTLINE_TEST_TOKEN_CONFIG");
    }
}
