// Test fixtures - reusable test data
// Provides consistent events and dates across integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use deal_calendar::models::event::CalendarEvent;

/// Monday, June 2, 2025
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

/// Instant on `monday()` at the given UTC wall time
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, minute, 0).unwrap()
}

/// Timed event on `monday()` lasting `minutes`
pub fn meeting(id: &str, hour: u32, minute: u32, minutes: i64) -> CalendarEvent {
    let start = at(hour, minute);
    CalendarEvent::new(id, format!("Meeting {}", id), start, Some(start + Duration::minutes(minutes)))
}

/// The three-event scenario: two overlapping showings and a later call
pub fn showing_day() -> Vec<CalendarEvent> {
    vec![
        meeting("1", 9, 0, 60),
        meeting("2", 9, 30, 60),
        meeting("3", 11, 0, 30),
    ]
}

/// Feed document in the data layer's JSON shape
pub const SAMPLE_FEED: &str = r#"[
    {"id": "1", "title": "Showing: 4 Elm St", "start_time": "2025-06-02T09:00:00Z",
     "end_time": "2025-06-02T10:00:00Z", "source": "google"},
    {"id": "2", "title": "Listing agreement", "start_time": "2025-06-02T09:30:00Z",
     "end_time": "2025-06-02T10:30:00Z", "location": "Office"},
    {"id": "3", "title": "Investor call", "start_time": "2025-06-02T11:00:00Z",
     "end_time": "2025-06-02T11:30:00Z"},
    {"id": "4", "title": "Closing day", "start_time": "2025-06-03", "all_day": true},
    {"id": "5", "title": "Corrupt sync", "start_time": "not-a-time"},
    {"id": "6", "title": "Inspection", "start_time": "2025-06-04T14:00:00Z"}
]"#;
