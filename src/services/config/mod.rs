//! Configuration loading.
//!
//! Settings live in `config.toml` under the platform config directory. A
//! missing file means defaults; a malformed one is an error the caller
//! reports before falling back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use directories::ProjectDirs;
use thiserror::Error;

use crate::models::settings::LayoutSettings;

const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_SWIPE_THRESHOLD: f32 = 50.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),
    #[error("hour_height must be a positive number of pixels, got {0}")]
    InvalidHourHeight(f32),
}

/// Settings after validation, with the timezone resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub settings: LayoutSettings,
    pub tz: Tz,
}

impl ResolvedSettings {
    pub fn hour_height(&self) -> f32 {
        self.settings.hour_height()
    }
}

/// `<config dir>/config.toml`, or `None` when the platform has no home.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "DealCalendar", "DealCalendar")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Parse settings from TOML text. Unset keys take their defaults.
pub fn parse_settings(content: &str) -> Result<LayoutSettings> {
    toml::from_str(content).context("failed to parse layout settings")
}

/// Load settings from `path`; a missing file yields the defaults.
pub fn load_settings(path: &Path) -> Result<LayoutSettings> {
    if !path.exists() {
        log::info!("No config at {}; using defaults", path.display());
        return Ok(LayoutSettings::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    parse_settings(&content).with_context(|| format!("invalid config in {}", path.display()))
}

/// Write settings as TOML, creating the parent directory.
pub fn save_settings(path: &Path, settings: &LayoutSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create dir {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(settings).context("failed to serialize settings")?;
    fs::write(path, content)
        .with_context(|| format!("failed to write config to {}", path.display()))?;
    Ok(())
}

/// Validate settings, clamping out-of-range values that have an obvious
/// correction and rejecting the ones that do not.
pub fn resolve(mut settings: LayoutSettings) -> Result<ResolvedSettings, ConfigError> {
    let tz: Tz = settings
        .timezone
        .parse()
        .map_err(|_| ConfigError::UnknownTimezone(settings.timezone.clone()))?;

    if let Some(height) = settings.hour_height {
        if !height.is_finite() || height <= 0.0 {
            return Err(ConfigError::InvalidHourHeight(height));
        }
    }

    if settings.look_behind_hours > 23 {
        log::warn!("look_behind_hours {} clamped to 23", settings.look_behind_hours);
        settings.look_behind_hours = 23;
    }
    if settings.first_day_of_week > 6 {
        log::warn!("first_day_of_week {} wrapped into 0..=6", settings.first_day_of_week);
        settings.first_day_of_week %= 7;
    }
    if !(settings.swipe_threshold.is_finite() && settings.swipe_threshold > 0.0) {
        settings.swipe_threshold = DEFAULT_SWIPE_THRESHOLD;
    }
    settings.slot_minutes = settings.slot_minutes.clamp(1, 60);

    Ok(ResolvedSettings { settings, tz })
}
