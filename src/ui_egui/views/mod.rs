//! Calendar grid views and the interaction results they report upward.

use chrono::NaiveDate;

use crate::models::event::CalendarEvent;
use crate::services::layout::TimeSlot;

pub(crate) mod palette;
pub mod time_grid;

/// What the user did with the grid during one frame.
///
/// Views never mutate events; they report clicks and navigation here and the
/// host decides what to do.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GridInteraction {
    /// Existing event that was activated
    pub event_clicked: Option<CalendarEvent>,
    /// Empty slot that was activated
    pub slot_clicked: Option<(NaiveDate, TimeSlot)>,
    /// Anchor date the visible window should move to
    pub navigate_to: Option<NaiveDate>,
}

impl GridInteraction {
    /// Merge another result into this one. Later values win.
    pub fn merge(&mut self, other: GridInteraction) {
        if other.event_clicked.is_some() {
            self.event_clicked = other.event_clicked;
        }
        if other.slot_clicked.is_some() {
            self.slot_clicked = other.slot_clicked;
        }
        if other.navigate_to.is_some() {
            self.navigate_to = other.navigate_to;
        }
    }

    pub fn has_actions(&self) -> bool {
        self.event_clicked.is_some() || self.slot_clicked.is_some() || self.navigate_to.is_some()
    }
}
