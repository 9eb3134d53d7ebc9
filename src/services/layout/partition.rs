use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::models::event::CalendarEvent;
use crate::utils::date::local_date;

/// Visible events split into the timed grid and the all-day row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayPartition {
    pub timed: BTreeMap<NaiveDate, Vec<CalendarEvent>>,
    pub all_day: BTreeMap<NaiveDate, Vec<CalendarEvent>>,
}

impl DayPartition {
    pub fn timed_for(&self, date: NaiveDate) -> &[CalendarEvent] {
        self.timed.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all_day_for(&self, date: NaiveDate) -> &[CalendarEvent] {
        self.all_day.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_all_day_events(&self) -> bool {
        self.all_day.values().any(|events| !events.is_empty())
    }
}

/// Group events by the visible day their start falls on (in `tz`).
///
/// Timed events are attributed to their start day only; an event running
/// past midnight is drawn in its start column and overflows downward rather
/// than being split. Events starting outside `days` are dropped. With
/// `include_all_day` false the all-day row stays empty.
pub fn partition_by_day(
    events: &[CalendarEvent],
    days: &[NaiveDate],
    tz: &Tz,
    include_all_day: bool,
) -> DayPartition {
    let mut partition = DayPartition::default();
    for day in days {
        partition.timed.insert(*day, Vec::new());
        if include_all_day {
            partition.all_day.insert(*day, Vec::new());
        }
    }

    for event in events {
        let day = local_date(event.start_time, tz);

        let bucket = if event.all_day {
            if !include_all_day {
                continue;
            }
            partition.all_day.get_mut(&day)
        } else {
            partition.timed.get_mut(&day)
        };

        if let Some(bucket) = bucket {
            bucket.push(event.clone());
        }
    }

    partition
}
