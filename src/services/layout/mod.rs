//! Event layout engine for the week and 3-day time grids.
//!
//! Everything here is a pure function of its inputs: the grid recomputes the
//! layout from the current event snapshot on every frame and never mutates
//! the events it is given.

mod hours;
mod now;
mod partition;

pub use hours::{compute_day_hours, HourMarker, HOURS_PER_DAY};
pub use now::{
    initial_scroll_offset, marker_day_index, now_offset, slot_at_offset, TimeSlot,
};
pub use partition::{partition_by_day, DayPartition};

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::models::event::CalendarEvent;
use crate::models::settings::OverlapStrategy;
use crate::utils::date::{local_minutes_since_midnight, minutes_between};

/// Shortest duration an event is treated as having, in minutes.
const MIN_DURATION_MINUTES: f32 = 1.0;

/// Geometry of one event inside a day column.
///
/// `top` and `height` are pixels from local midnight; the fractions are
/// relative to the column width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventSlot {
    pub top: f32,
    pub height: f32,
    pub width_fraction: f32,
    pub left_fraction: f32,
}

/// Per-day layout keyed by event id.
pub type DayLayout = BTreeMap<String, EventSlot>;

/// The events that directly overlap one event, itself included, in column
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapGroup {
    pub event_id: String,
    pub member_ids: Vec<String>,
    pub column: usize,
}

impl OverlapGroup {
    pub fn total_columns(&self) -> usize {
        self.member_ids.len()
    }
}

/// Interval used for overlap tests. Inverted or zero-length records are
/// widened to the minimum duration so they still occupy a column.
#[derive(Debug, Clone, Copy)]
struct Span {
    index: usize,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Span {
    fn of(index: usize, event: &CalendarEvent) -> Self {
        let start = event.start_time;
        let floor = start + Duration::minutes(MIN_DURATION_MINUTES as i64);
        Self {
            index,
            start,
            end: event.effective_end().max(floor),
        }
    }

    fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Lay out the timed events of a single day.
///
/// `day_events` should already exclude all-day events. Returns an empty
/// layout for an empty day.
pub fn layout_day(
    day_events: &[CalendarEvent],
    hour_height: f32,
    tz: &Tz,
    strategy: OverlapStrategy,
) -> DayLayout {
    let mut layout = DayLayout::new();
    if day_events.is_empty() {
        return layout;
    }

    let columns = match strategy {
        OverlapStrategy::Pairwise => pairwise_columns(day_events),
        OverlapStrategy::Clustered => clustered_columns(day_events),
    };

    for (event, (column, total_columns)) in day_events.iter().zip(columns) {
        let (top, height) = vertical_extent(event, hour_height, tz);
        let total = total_columns.max(1) as f32;

        if event.has_inverted_range() {
            log::debug!(
                "Event {} ends before it starts; rendering at minimum height",
                event.id
            );
        }

        let slot = EventSlot {
            top,
            height,
            width_fraction: 1.0 / total,
            left_fraction: column as f32 / total,
        };

        if layout.insert(event.id.clone(), slot).is_some() {
            log::debug!("Duplicate event id {} in day layout; keeping the later record", event.id);
        }
    }

    log::trace!("Laid out {} events ({:?})", layout.len(), strategy);
    layout
}

/// Pixel top and height of an event on a grid with `hour_height` px per hour.
///
/// Height never drops below half an hour so short and malformed events stay
/// clickable.
pub fn vertical_extent(event: &CalendarEvent, hour_height: f32, tz: &Tz) -> (f32, f32) {
    let start_minutes = local_minutes_since_midnight(event.start_time, tz);
    let duration_minutes =
        minutes_between(event.start_time, event.effective_end()).max(MIN_DURATION_MINUTES);

    let top = start_minutes / 60.0 * hour_height;
    let height = (duration_minutes / 60.0 * hour_height).max(hour_height / 2.0);
    (top, height)
}

/// Direct-overlap group of every event, in input order.
///
/// Members are ordered by id (input position breaks ties between duplicate
/// ids), which fixes each event's column across frames.
pub fn overlap_groups(day_events: &[CalendarEvent]) -> Vec<OverlapGroup> {
    let spans: Vec<Span> = day_events
        .iter()
        .enumerate()
        .map(|(index, event)| Span::of(index, event))
        .collect();

    spans
        .iter()
        .map(|span| {
            let mut members: Vec<usize> = spans
                .iter()
                .filter(|other| other.index == span.index || span.overlaps(other))
                .map(|other| other.index)
                .collect();
            members.sort_by(|a, b| {
                day_events[*a]
                    .id
                    .cmp(&day_events[*b].id)
                    .then(a.cmp(b))
            });

            let column = members
                .iter()
                .position(|member| *member == span.index)
                .unwrap_or(0);

            OverlapGroup {
                event_id: day_events[span.index].id.clone(),
                member_ids: members
                    .iter()
                    .map(|member| day_events[*member].id.clone())
                    .collect(),
                column,
            }
        })
        .collect()
}

fn pairwise_columns(day_events: &[CalendarEvent]) -> Vec<(usize, usize)> {
    overlap_groups(day_events)
        .into_iter()
        .map(|group| (group.column, group.total_columns()))
        .collect()
}

/// First-fit packing over transitive overlap clusters.
fn clustered_columns(day_events: &[CalendarEvent]) -> Vec<(usize, usize)> {
    let mut spans: Vec<Span> = day_events
        .iter()
        .enumerate()
        .map(|(index, event)| Span::of(index, event))
        .collect();
    spans.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| day_events[a.index].id.cmp(&day_events[b.index].id))
            .then(a.index.cmp(&b.index))
    });

    let mut result = vec![(0, 1); day_events.len()];
    let mut cluster: Vec<(usize, usize)> = Vec::new(); // (event index, column)
    let mut column_ends: Vec<DateTime<Utc>> = Vec::new();
    let mut cluster_end: Option<DateTime<Utc>> = None;

    let mut flush = |cluster: &mut Vec<(usize, usize)>, column_ends: &mut Vec<DateTime<Utc>>| {
        let total = column_ends.len().max(1);
        for (index, column) in cluster.drain(..) {
            result[index] = (column, total);
        }
        column_ends.clear();
    };

    for span in &spans {
        if cluster_end.is_some_and(|end| span.start >= end) {
            flush(&mut cluster, &mut column_ends);
            cluster_end = None;
        }

        let column = match column_ends.iter().position(|end| *end <= span.start) {
            Some(free) => {
                column_ends[free] = span.end;
                free
            }
            None => {
                column_ends.push(span.end);
                column_ends.len() - 1
            }
        };

        cluster.push((span.index, column));
        cluster_end = Some(cluster_end.map_or(span.end, |end| end.max(span.end)));
    }
    flush(&mut cluster, &mut column_ends);

    result
}
