// Settings module
// Grid geometry and behaviour configuration

use serde::{Deserialize, Serialize};

/// Number of day columns shown by the time grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VisibleDays {
    Three,
    Seven,
}

impl VisibleDays {
    pub fn count(self) -> usize {
        match self {
            VisibleDays::Three => 3,
            VisibleDays::Seven => 7,
        }
    }
}

impl TryFrom<u8> for VisibleDays {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(VisibleDays::Three),
            7 => Ok(VisibleDays::Seven),
            other => Err(format!("visible_days must be 3 or 7, got {}", other)),
        }
    }
}

impl From<VisibleDays> for u8 {
    fn from(value: VisibleDays) -> Self {
        value.count() as u8
    }
}

/// Screen-size variant. Each variant has its own pixels-per-hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceSize {
    Compact,
    #[default]
    Regular,
    Large,
}

impl DeviceSize {
    pub fn hour_height(self) -> f32 {
        match self {
            DeviceSize::Compact => 48.0,
            DeviceSize::Regular => 60.0,
            DeviceSize::Large => 72.0,
        }
    }
}

/// How concurrent events are split into columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapStrategy {
    /// Each event is sized against the events that directly overlap it.
    #[default]
    Pairwise,
    /// Transitively overlapping events share one column count and are packed
    /// first-fit, so intersecting events never share a band.
    Clustered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub device: DeviceSize,
    /// Overrides the device's hour height when set
    pub hour_height: Option<f32>,
    pub visible_days: VisibleDays,
    /// Hours shown above the current hour on first display
    pub look_behind_hours: u32,
    pub first_day_of_week: u8, // 0 = Sunday
    /// IANA timezone name used for all time-of-day math
    pub timezone: String,
    pub overlap_strategy: OverlapStrategy,
    /// Minimum horizontal travel (px) for a swipe to navigate
    pub swipe_threshold: f32,
    /// Granularity of empty-slot clicks
    pub slot_minutes: u32,
    /// Event feed to display (JSON)
    pub events_path: Option<String>,
}

impl LayoutSettings {
    /// Pixels per hour after applying the override.
    pub fn hour_height(&self) -> f32 {
        self.hour_height.unwrap_or_else(|| self.device.hour_height())
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            device: DeviceSize::Regular,
            hour_height: None,
            visible_days: VisibleDays::Seven,
            look_behind_hours: 1,
            first_day_of_week: 0,
            timezone: "UTC".to_string(),
            overlap_strategy: OverlapStrategy::Pairwise,
            swipe_threshold: 50.0,
            slot_minutes: 30,
            events_path: None,
        }
    }
}
