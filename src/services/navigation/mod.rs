//! Visible-window arithmetic and swipe navigation for the time grid.

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::settings::VisibleDays;
use crate::utils::date::date_range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Previous,
    Next,
}

/// Calculate the start of the week containing the given date.
///
/// # Arguments
/// * `date` - The date to find the week start for
/// * `first_day_of_week` - 0 = Sunday, 1 = Monday, etc.
pub fn get_week_start(date: NaiveDate, first_day_of_week: u8) -> NaiveDate {
    let weekday = date.weekday().num_days_from_sunday() as i64;
    let offset = (weekday - (first_day_of_week % 7) as i64 + 7) % 7;
    date - Duration::days(offset)
}

/// Dates shown for `anchor`: the surrounding week for the 7-day grid, or
/// the anchor and the two days after it for the 3-day grid.
pub fn visible_dates(anchor: NaiveDate, visible: VisibleDays, first_day_of_week: u8) -> Vec<NaiveDate> {
    match visible {
        VisibleDays::Seven => date_range(get_week_start(anchor, first_day_of_week), 7),
        VisibleDays::Three => date_range(anchor, 3),
    }
}

/// New anchor after moving one window in `direction`.
pub fn shift_window(anchor: NaiveDate, visible: VisibleDays, direction: NavDirection) -> NaiveDate {
    let step = Duration::days(visible.count() as i64);
    match direction {
        NavDirection::Previous => anchor - step,
        NavDirection::Next => anchor + step,
    }
}

/// Horizontal swipe detection from touch start/end positions.
///
/// There is no debouncing: each completed gesture is judged on its own.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f32,
    start_x: Option<f32>,
}

impl SwipeTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            start_x: None,
        }
    }

    pub fn touch_start(&mut self, x: f32) {
        self.start_x = Some(x);
    }

    /// Finish a gesture. A leftward swipe moves forward in time.
    pub fn touch_end(&mut self, x: f32) -> Option<NavDirection> {
        let start = self.start_x.take()?;
        let delta = x - start;

        if delta.abs() < self.threshold {
            return None;
        }

        if delta < 0.0 {
            Some(NavDirection::Next)
        } else {
            Some(NavDirection::Previous)
        }
    }

    pub fn cancel(&mut self) {
        self.start_x = None;
    }

    pub fn is_tracking(&self) -> bool {
        self.start_x.is_some()
    }
}
