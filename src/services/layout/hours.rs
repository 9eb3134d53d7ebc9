use crate::utils::date::hour_label;

pub const HOURS_PER_DAY: u32 = 24;

/// One row of the time rail on the left of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourMarker {
    pub hour: u32,
    pub label: String,
}

/// Hour markers for a full day, midnight first.
pub fn compute_day_hours() -> Vec<HourMarker> {
    (0..HOURS_PER_DAY)
        .map(|hour| HourMarker {
            hour,
            label: hour_label(hour),
        })
        .collect()
}
