//! Configuration management for HandsUp
//!
//! Loads settings from a TOML file and `HANDSUP_` environment variables and
//! validates every value before use.

use crate::HandsUpError;
use crate::emergency::AustralianState;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandsUpConfig {
    /// On-device storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Warning feed settings
    #[serde(default)]
    pub warnings: WarningsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default query and message settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the key-value store
    #[serde(default = "default_storage_location")]
    pub location: String,
}

/// Warning feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningsConfig {
    /// Weather bureau RSS feed; derived from the selected state when unset
    #[serde(default)]
    pub feed_url: Option<String>,
    /// Query the state fire service as well
    #[serde(default = "default_fire_feed_enabled")]
    pub fire_feed_enabled: bool,
    /// Seconds between automatic refreshes
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    /// Upper bound for one whole refresh
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient HTTP failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Radius for nearby campsites in kilometers
    #[serde(default = "default_campsite_radius")]
    pub campsite_radius_km: f64,
    /// Radius for relevant warnings in kilometers
    #[serde(default = "default_warning_radius")]
    pub warning_radius_km: f64,
    /// Name placed in SOS messages
    #[serde(default)]
    pub user_name: String,
    /// Selected Australian state or territory
    #[serde(default = "default_state")]
    pub state: String,
    /// IANA time zone used for message timestamps
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_emergency_number")]
    pub emergency_number: String,
}

// Default value functions
fn default_storage_location() -> String {
    "~/.local/share/handsup".to_string()
}

fn default_fire_feed_enabled() -> bool {
    true
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_campsite_radius() -> f64 {
    50.0
}

fn default_warning_radius() -> f64 {
    100.0
}

fn default_state() -> String {
    "Victoria".to_string()
}

fn default_timezone() -> String {
    "Australia/Sydney".to_string()
}

fn default_emergency_number() -> String {
    "000".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            location: default_storage_location(),
        }
    }
}

impl Default for WarningsConfig {
    fn default() -> Self {
        Self {
            feed_url: None,
            fire_feed_enabled: default_fire_feed_enabled(),
            refresh_interval_seconds: default_refresh_interval(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            campsite_radius_km: default_campsite_radius(),
            warning_radius_km: default_warning_radius(),
            user_name: String::new(),
            state: default_state(),
            timezone: default_timezone(),
            emergency_number: default_emergency_number(),
        }
    }
}

impl StorageConfig {
    /// Storage directory with a leading `~` expanded
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        match self.location.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.location)),
            None => PathBuf::from(&self.location),
        }
    }
}

impl WarningsConfig {
    /// Configured feed URL, or the weather bureau feed covering `state`
    #[must_use]
    pub fn feed_url_for(&self, state: AustralianState) -> String {
        self.feed_url
            .clone()
            .unwrap_or_else(|| state.bom_warnings_feed_url().to_string())
    }
}

impl DefaultsConfig {
    pub fn australian_state(&self) -> crate::Result<AustralianState> {
        AustralianState::from_name(&self.state)
            .ok_or_else(|| HandsUpError::config(format!("Unknown state '{}'", self.state)))
    }

    /// Parsed time zone; `validate` guarantees this succeeds for loaded configs
    pub fn time_zone(&self) -> crate::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| HandsUpError::config(format!("Unknown time zone '{}'", self.timezone)))
    }
}

impl HandsUpConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // e.g. HANDSUP_WARNINGS__FEED_URL
        builder = builder.add_source(
            Environment::with_prefix("HANDSUP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: HandsUpConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("handsup").join("config.toml"))
    }

    /// Replace empty or zero values with defaults
    pub fn apply_defaults(&mut self) {
        if self.storage.location.is_empty() {
            self.storage.location = default_storage_location();
        }
        if self.warnings.feed_url.as_deref().is_some_and(|url| url.trim().is_empty()) {
            self.warnings.feed_url = None;
        }
        if self.warnings.refresh_interval_seconds == 0 {
            self.warnings.refresh_interval_seconds = default_refresh_interval();
        }
        if self.warnings.timeout_seconds == 0 {
            self.warnings.timeout_seconds = default_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.campsite_radius_km <= 0.0 {
            self.defaults.campsite_radius_km = default_campsite_radius();
        }
        if self.defaults.warning_radius_km <= 0.0 {
            self.defaults.warning_radius_km = default_warning_radius();
        }
        if self.defaults.state.is_empty() {
            self.defaults.state = default_state();
        }
        if self.defaults.timezone.is_empty() {
            self.defaults.timezone = default_timezone();
        }
        if self.defaults.emergency_number.is_empty() {
            self.defaults.emergency_number = default_emergency_number();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.warnings.timeout_seconds > 300 {
            return Err(HandsUpError::config("Warning feed timeout cannot exceed 300 seconds").into());
        }

        if self.warnings.max_retries > 10 {
            return Err(HandsUpError::config("Warning feed max retries cannot exceed 10").into());
        }

        if !(30..=86_400).contains(&self.warnings.refresh_interval_seconds) {
            return Err(HandsUpError::config(
                "Warning refresh interval must be between 30 seconds and 24 hours",
            )
            .into());
        }

        for (name, radius) in [
            ("Campsite", self.defaults.campsite_radius_km),
            ("Warning", self.defaults.warning_radius_km),
        ] {
            if !radius.is_finite() || radius > 1000.0 {
                return Err(
                    HandsUpError::config(format!("{name} radius cannot exceed 1000 km")).into(),
                );
            }
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(HandsUpError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(HandsUpError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if let Some(url) = &self.warnings.feed_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(HandsUpError::config(
                    "Warning feed URL must be a valid HTTP or HTTPS URL",
                )
                .into());
            }
        }

        self.defaults.australian_state()?;

        self.defaults.time_zone()?;

        if !self
            .defaults
            .emergency_number
            .chars()
            .all(|c| c.is_ascii_digit())
        {
            return Err(HandsUpError::config("Emergency number must contain only digits").into());
        }

        Ok(())
    }

    /// Create configuration directory if it doesn't exist
    pub fn ensure_config_dir() -> Result<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            let handsup_config_dir = config_dir.join("handsup");
            std::fs::create_dir_all(&handsup_config_dir).with_context(|| {
                format!(
                    "Failed to create config directory: {}",
                    handsup_config_dir.display()
                )
            })?;
            Ok(handsup_config_dir)
        } else {
            Err(HandsUpError::config("Unable to determine config directory").into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = HandsUpConfig::default();
        assert_eq!(config.warnings.refresh_interval_seconds, 300);
        assert_eq!(config.warnings.timeout_seconds, 30);
        assert_eq!(config.defaults.campsite_radius_km, 50.0);
        assert_eq!(config.defaults.warning_radius_km, 100.0);
        assert_eq!(config.defaults.emergency_number, "000");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = HandsUpConfig::default();
        config.logging.level = "loud".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_numeric_ranges() {
        let mut config = HandsUpConfig::default();
        config.warnings.timeout_seconds = 500;
        assert!(
            config
                .validate()
                .unwrap_err()
                .to_string()
                .contains("timeout cannot exceed")
        );

        let mut config = HandsUpConfig::default();
        config.warnings.refresh_interval_seconds = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_timezone_and_state() {
        let mut config = HandsUpConfig::default();
        config.defaults.timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.validate().is_err());

        let mut config = HandsUpConfig::default();
        config.defaults.state = "Atlantis".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("Unknown state"));
    }

    #[test]
    fn test_non_http_feed_url() {
        let mut config = HandsUpConfig::default();
        config.warnings.feed_url = Some("ftp://example.com/warnings.xml".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_feed_url_follows_state() {
        let mut warnings = WarningsConfig::default();
        assert!(warnings.feed_url_for(AustralianState::Victoria).contains("warnings_vic"));
        assert!(warnings.feed_url_for(AustralianState::AustralianCapitalTerritory).contains("warnings_nsw"));

        warnings.feed_url = Some("http://localhost:8080/feed.xml".to_string());
        assert_eq!(
            warnings.feed_url_for(AustralianState::Victoria),
            "http://localhost:8080/feed.xml"
        );
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = HandsUpConfig::default();
        config.warnings.refresh_interval_seconds = 0;
        config.defaults.campsite_radius_km = 0.0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.warnings.refresh_interval_seconds, 300);
        assert_eq!(config.defaults.campsite_radius_km, 50.0);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[warnings]
refresh_interval_seconds = 600

[defaults]
user_name = "Sam"
state = "New South Wales"
"#
        )
        .unwrap();

        let config = HandsUpConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.warnings.refresh_interval_seconds, 600);
        assert_eq!(config.warnings.timeout_seconds, 30);
        assert_eq!(config.defaults.user_name, "Sam");
        assert_eq!(config.defaults.state, "New South Wales");
    }

    #[test]
    fn test_resolved_path_expands_home() {
        let storage = StorageConfig {
            location: "/var/lib/handsup".to_string(),
        };
        assert_eq!(storage.resolved_path(), PathBuf::from("/var/lib/handsup"));

        if let Some(home) = dirs::home_dir() {
            let storage = StorageConfig::default();
            assert_eq!(storage.resolved_path(), home.join(".local/share/handsup"));
        }
    }

    #[test]
    fn test_config_path_generation() {
        let path = HandsUpConfig::get_config_path();
        if let Some(path) = path {
            assert!(path.to_string_lossy().contains("handsup"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
