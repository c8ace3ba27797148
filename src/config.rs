//! Configuration management for range-bar

use chrono::format::{Item, StrftimeItems};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::date_range::{DateFormat, DEFAULT_DATE_FORMAT, DEFAULT_SEPARATOR};
use crate::error::{Error, Result};
use crate::query::QueryKeys;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Query parameter names
    pub query: QueryKeys,

    /// Trigger and calendar presentation
    pub display: DisplayConfig,

    /// Preset catalog behavior
    pub presets: PresetConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// How dates are shown to the user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// chrono strftime pattern for a single day
    pub date_format: String,

    /// Text between the two ends of a range
    pub separator: String,

    /// First column of the calendar grid
    pub week_starts_on: Weekday,

    /// Number of month grids shown side by side
    pub months_shown: u32,
}

/// Preset catalog settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    /// Re-anchor presets to the current day every time the popover opens.
    ///
    /// Off by default: presets stay anchored to the day the controller was
    /// built, even if the session crosses midnight.
    pub refresh_on_open: bool,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            week_starts_on: Weekday::Mon,
            months_shown: 2,
        }
    }
}

impl DisplayConfig {
    /// Formatter for the trigger label and captions.
    #[must_use]
    pub fn date_format(&self) -> DateFormat {
        DateFormat::new(&self.date_format, &self.separator)
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::config("Could not determine config directory"))?;
        Ok(config_dir.join("range-bar").join("config.toml"))
    }

    /// Validate configuration values.
    ///
    /// Call this after loading to ensure all values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "log_level must be one of {:?}, got '{}'",
                valid_levels, self.general.log_level
            )));
        }

        let (from, to) = (self.query.from.trim(), self.query.to.trim());
        if from.is_empty() || to.is_empty() {
            return Err(Error::config("query keys must not be empty"));
        }
        if from == to {
            return Err(Error::config(format!(
                "query keys must differ, both are '{from}'"
            )));
        }

        if self.display.date_format.is_empty()
            || StrftimeItems::new(&self.display.date_format).any(|item| matches!(item, Item::Error))
        {
            return Err(Error::config(format!(
                "date_format is not a valid strftime pattern: '{}'",
                self.display.date_format
            )));
        }

        if !(1..=12).contains(&self.display.months_shown) {
            return Err(Error::config(format!(
                "months_shown must be between 1 and 12, got {}",
                self.display.months_shown
            )));
        }

        Ok(())
    }
}
