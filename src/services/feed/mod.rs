//! Decoding of the event feed handed over by the data layer.
//!
//! The feed is a JSON array of event records. A single bad record never
//! fails the whole feed: bad timestamps are degraded to a fixed placement
//! and records that cannot be read at all are skipped, both with a warning.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::event::{CalendarEvent, EventSource};
use crate::utils::date::start_of_day;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("event feed is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event feed must be a JSON array, found {0}")]
    NotAnArray(&'static str),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedReport {
    pub total: usize,
    /// Records kept with substituted timestamps or ids
    pub degraded: usize,
    /// Records skipped entirely
    pub rejected: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFeed {
    pub events: Vec<CalendarEvent>,
    pub report: FeedReport,
}

/// Every field is read loosely so a mistyped value degrades its record
/// instead of rejecting it. Only non-object records are unreadable.
#[derive(Debug, Deserialize)]
struct RawEventRecord {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    start_time: Option<Value>,
    #[serde(default)]
    end_time: Option<Value>,
    #[serde(default)]
    all_day: Option<Value>,
    #[serde(default)]
    location: Option<Value>,
    #[serde(default)]
    source: Option<Value>,
}

/// Decode a feed document.
///
/// `fallback_day` is where records with an unreadable start are placed
/// (its midnight in `tz`, at minimum height). Ids in the result are unique.
pub fn decode_feed(json: &str, fallback_day: NaiveDate, tz: &Tz) -> Result<DecodedFeed, FeedError> {
    let document: Value = serde_json::from_str(json)?;
    let records = match document {
        Value::Array(records) => records,
        Value::Object(_) => return Err(FeedError::NotAnArray("an object")),
        Value::String(_) => return Err(FeedError::NotAnArray("a string")),
        Value::Number(_) => return Err(FeedError::NotAnArray("a number")),
        Value::Bool(_) => return Err(FeedError::NotAnArray("a boolean")),
        Value::Null => return Err(FeedError::NotAnArray("null")),
    };

    let fallback = start_of_day(fallback_day, tz);
    let mut feed = DecodedFeed::default();
    feed.report.total = records.len();

    let mut readable = Vec::with_capacity(records.len());
    for (index, value) in records.into_iter().enumerate() {
        match serde_json::from_value::<RawEventRecord>(value) {
            Ok(raw) => readable.push((index, raw)),
            Err(err) => {
                log::warn!("Skipping unreadable event record #{}: {}", index, err);
                feed.report.rejected += 1;
            }
        }
    }

    // Explicit ids are reserved up front so a synthesized id never takes
    // the place of a real one that appears later in the feed.
    let reserved: HashSet<String> = readable
        .iter()
        .filter_map(|(_, raw)| raw.id.as_ref().and_then(explicit_id))
        .collect();
    let mut claimed = HashSet::with_capacity(readable.len());

    for (index, raw) in readable {
        let mut degraded = false;

        let id = match raw.id.as_ref().and_then(explicit_id) {
            Some(id) if !claimed.contains(&id) => id,
            Some(id) => {
                let unique = unique_id(&id, &reserved, &claimed);
                log::warn!("Event id {} appears more than once; record #{} renamed to {}", id, index, unique);
                degraded = true;
                unique
            }
            None => {
                let unique = unique_id(&format!("feed-{}", index), &reserved, &claimed);
                log::warn!("Event record #{} has no usable id; using {}", index, unique);
                degraded = true;
                unique
            }
        };
        claimed.insert(id.clone());

        let (event, record_degraded) = record_to_event(raw, id, fallback, tz);
        if degraded || record_degraded {
            feed.report.degraded += 1;
        }
        feed.events.push(event);
    }

    log::info!(
        "Decoded event feed: {} records, {} degraded, {} rejected",
        feed.report.total,
        feed.report.degraded,
        feed.report.rejected
    );
    Ok(feed)
}

/// Read and decode a feed file.
pub fn load_feed_file(path: &Path, fallback_day: NaiveDate, tz: &Tz) -> Result<DecodedFeed> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read event feed from {}", path.display()))?;
    decode_feed(&data, fallback_day, tz)
        .with_context(|| format!("failed to decode event feed from {}", path.display()))
}

fn explicit_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// `base`, or `base-2`, `base-3`, ... whichever is free first.
fn unique_id(base: &str, reserved: &HashSet<String>, claimed: &HashSet<String>) -> String {
    let taken = |candidate: &str| reserved.contains(candidate) || claimed.contains(candidate);
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|suffix| format!("{}-{}", base, suffix))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

fn record_to_event(
    raw: RawEventRecord,
    id: String,
    fallback: DateTime<Utc>,
    tz: &Tz,
) -> (CalendarEvent, bool) {
    let mut degraded = false;

    let all_day = match raw.all_day {
        None => false,
        Some(Value::Bool(flag)) => flag,
        Some(other) => {
            let coerced = match &other {
                Value::String(text) => text.trim().eq_ignore_ascii_case("true"),
                Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
                _ => false,
            };
            log::warn!("Event {} has non-boolean all_day {}; reading it as {}", id, other, coerced);
            degraded = true;
            coerced
        }
    };

    let start = raw
        .start_time
        .as_ref()
        .and_then(|value| read_timestamp(value, all_day, tz));
    let start_time = match start {
        Some(start) => start,
        None => {
            log::warn!(
                "Event {} has unreadable start {:?}; placing at {}",
                id,
                raw.start_time,
                fallback
            );
            degraded = true;
            fallback
        }
    };

    // Degraded placements collapse to zero length so the event renders at
    // minimum height; a missing end on a readable start keeps the default
    // duration.
    let end_time = match (start, raw.end_time.as_ref()) {
        (None, _) => Some(start_time),
        (Some(_), None) => None,
        (Some(_), Some(value)) => match read_timestamp(value, all_day, tz) {
            Some(end) => Some(end),
            None => {
                log::warn!("Event {} has unreadable end {}", id, value);
                degraded = true;
                Some(start_time)
            }
        },
    };

    let title = match raw.title {
        None => String::new(),
        Some(Value::String(title)) => title,
        Some(other) => {
            log::warn!("Event {} has a non-text title {}", id, other);
            degraded = true;
            match other {
                Value::Number(_) | Value::Bool(_) => other.to_string(),
                _ => String::new(),
            }
        }
    };

    let location = match raw.location {
        None => None,
        Some(Value::String(location)) => Some(location).filter(|location| !location.trim().is_empty()),
        Some(other) => {
            log::warn!("Event {} has a non-text location {}; dropping it", id, other);
            degraded = true;
            None
        }
    };

    let source = match raw.source {
        None => EventSource::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|_| {
            log::warn!("Event {} has an unreadable source {}", id, value);
            degraded = true;
            EventSource::Unknown
        }),
    };

    let event = CalendarEvent {
        id,
        title,
        start_time,
        end_time,
        all_day,
        location,
        source,
    };
    (event, degraded)
}

/// Only strings carry timestamps; anything else is unreadable.
fn read_timestamp(value: &Value, all_day: bool, tz: &Tz) -> Option<DateTime<Utc>> {
    let Value::String(text) = value else {
        return None;
    };
    if all_day {
        parse_calendar_date(text, tz)
    } else {
        parse_timestamp(text, tz)
    }
}

/// All-day records name a calendar day. The written date is taken as-is
/// so an instant like `2025-06-03T00:00:00Z` stays on June 3 in any zone.
fn parse_calendar_date(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();
    value
        .get(..10)
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .map(|date| start_of_day(date, tz))
        .or_else(|| parse_timestamp(value, tz))
}

/// RFC 3339, a zone-less date-time read in `tz`, or a bare date (midnight in `tz`).
fn parse_timestamp(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| start_of_day(date, tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::OverlapStrategy;
    use crate::services::layout::layout_day;
    use crate::utils::date::local_date;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn test_decode_well_formed_feed() {
        let json = r#"[
            {"id": "a", "title": "Listing call", "start_time": "2025-06-02T09:00:00Z",
             "end_time": "2025-06-02T10:00:00Z", "location": "Office", "source": "google"},
            {"id": 7, "title": "Inspection", "start_time": "2025-06-02T13:00:00+02:00"}
        ]"#;
        let feed = decode_feed(json, anchor(), &Tz::UTC).unwrap();

        assert_eq!(feed.report, FeedReport { total: 2, degraded: 0, rejected: 0 });
        assert_eq!(feed.events[0].source, EventSource::Google);
        assert_eq!(feed.events[0].location.as_deref(), Some("Office"));
        assert_eq!(feed.events[1].id, "7");
        assert_eq!(
            feed.events[1].start_time,
            Utc.with_ymd_and_hms(2025, 6, 2, 11, 0, 0).unwrap()
        );
        assert!(feed.events[1].end_time.is_none());
    }

    #[test]
    fn test_unreadable_start_falls_back_to_anchor_midnight() {
        let json = r#"[{"id": "x", "title": "Broken", "start_time": "next tuesday"}]"#;
        let feed = decode_feed(json, anchor(), &Tz::UTC).unwrap();

        let event = &feed.events[0];
        assert_eq!(event.start_time, Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap());
        assert_eq!(event.end_time, Some(event.start_time));
        assert_eq!(feed.report.degraded, 1);
    }

    #[test]
    fn test_missing_start_is_degraded_not_rejected() {
        let json = r#"[{"id": "x", "title": "No start"}]"#;
        let feed = decode_feed(json, anchor(), &Tz::UTC).unwrap();
        assert_eq!(feed.events.len(), 1);
        assert_eq!(feed.events[0].end_time, Some(feed.events[0].start_time));
        assert_eq!(feed.report.degraded, 1);
    }

    #[test]
    fn test_unreadable_end_collapses_to_start() {
        let json = r#"[{"id": "x", "title": "t", "start_time": "2025-06-02T09:00:00Z", "end_time": "??"}]"#;
        let feed = decode_feed(json, anchor(), &Tz::UTC).unwrap();
        assert_eq!(feed.events[0].end_time, Some(feed.events[0].start_time));
        assert_eq!(feed.report.degraded, 1);
    }

    #[test]
    fn test_only_non_object_records_are_rejected() {
        let json = r#"[
            {"id": "ok", "title": "Fine", "start_time": "2025-06-02T09:00:00Z"},
            {"id": "odd", "title": 42, "start_time": "2025-06-02T09:00:00Z", "location": ["x"]},
            "not a record",
            17
        ]"#;
        let feed = decode_feed(json, anchor(), &Tz::UTC).unwrap();

        assert_eq!(feed.report, FeedReport { total: 4, degraded: 1, rejected: 2 });
        assert_eq!(feed.events[1].title, "42");
        assert!(feed.events[1].location.is_none());
    }

    #[test]
    fn test_numeric_timestamps_degrade_instead_of_rejecting() {
        let json = r#"[
            {"id": "ok", "title": "Fine", "start_time": "2025-06-02T09:00:00Z", "end_time": "2025-06-02T10:00:00Z"},
            {"id": "epoch", "title": "Epoch start", "start_time": 1748854800},
            {"id": "zero", "title": "Zero end", "start_time": "2025-06-02T11:00:00Z", "end_time": 0}
        ]"#;
        let feed = decode_feed(json, anchor(), &Tz::UTC).unwrap();

        let ids: Vec<&str> = feed.events.iter().map(|event| event.id.as_str()).collect();
        assert_eq!(ids, vec!["ok", "epoch", "zero"]);
        assert_eq!(feed.report, FeedReport { total: 3, degraded: 2, rejected: 0 });

        let epoch = &feed.events[1];
        assert_eq!(epoch.start_time, Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap());
        assert_eq!(epoch.end_time, Some(epoch.start_time));

        let zero = &feed.events[2];
        assert_eq!(zero.start_time, Utc.with_ymd_and_hms(2025, 6, 2, 11, 0, 0).unwrap());
        assert_eq!(zero.end_time, Some(zero.start_time));
    }

    #[test]
    fn test_textual_all_day_flag_is_coerced() {
        let json = r#"[{"id": "h", "title": "Holiday", "start_time": "2025-06-02", "all_day": "true"}]"#;
        let feed = decode_feed(json, anchor(), &Tz::UTC).unwrap();
        assert!(feed.events[0].all_day);
        assert_eq!(feed.report.degraded, 1);
        assert_eq!(feed.report.rejected, 0);
    }

    #[test]
    fn test_synthesized_id_never_shadows_a_real_one() {
        let json = r#"[
            {"id": "feed-1", "title": "Real", "start_time": "2025-06-02T09:00:00Z", "end_time": "2025-06-02T10:00:00Z"},
            {"title": "Anon", "start_time": "2025-06-02T15:00:00Z", "end_time": "2025-06-02T16:00:00Z"}
        ]"#;
        let feed = decode_feed(json, anchor(), &Tz::UTC).unwrap();

        let ids: Vec<&str> = feed.events.iter().map(|event| event.id.as_str()).collect();
        assert_eq!(ids, vec!["feed-1", "feed-1-2"]);

        let layout = layout_day(&feed.events, 60.0, &Tz::UTC, OverlapStrategy::Pairwise);
        assert_eq!(layout.len(), 2);
        assert_eq!(layout["feed-1"].top, 540.0);
        assert_eq!(layout["feed-1-2"].top, 900.0);
    }

    #[test]
    fn test_duplicate_ids_are_made_unique() {
        let json = r#"[
            {"id": 7, "title": "Number", "start_time": "2025-06-02T09:00:00Z"},
            {"id": "7", "title": "String", "start_time": "2025-06-02T10:00:00Z"},
            {"id": "7-2", "title": "Taken suffix", "start_time": "2025-06-02T11:00:00Z"}
        ]"#;
        let feed = decode_feed(json, anchor(), &Tz::UTC).unwrap();

        let ids: Vec<&str> = feed.events.iter().map(|event| event.id.as_str()).collect();
        assert_eq!(ids, vec!["7", "7-3", "7-2"]);
        assert_eq!(feed.report.degraded, 1);
    }

    #[test]
    fn test_all_day_keeps_written_date_west_of_utc() {
        let tz: Tz = "America/Los_Angeles".parse().unwrap();
        let json = r#"[{"id": "h", "title": "Closing day", "start_time": "2025-06-03T00:00:00Z",
                        "end_time": "2025-06-04T00:00:00Z", "all_day": true}]"#;
        let feed = decode_feed(json, anchor(), &tz).unwrap();

        let event = &feed.events[0];
        assert_eq!(local_date(event.start_time, &tz), NaiveDate::from_ymd_opt(2025, 6, 3).unwrap());
        assert_eq!(event.start_time, Utc.with_ymd_and_hms(2025, 6, 3, 7, 0, 0).unwrap());
        assert_eq!(event.end_time, Some(Utc.with_ymd_and_hms(2025, 6, 4, 7, 0, 0).unwrap()));
    }

    #[test]
    fn test_missing_id_is_synthesized() {
        let json = r#"[{"title": "Anon", "start_time": "2025-06-02T09:00:00Z"}]"#;
        let feed = decode_feed(json, anchor(), &Tz::UTC).unwrap();
        assert_eq!(feed.events[0].id, "feed-0");
    }

    #[test]
    fn test_local_and_date_only_timestamps_use_zone() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let json = r#"[
            {"id": "a", "title": "Local", "start_time": "2025-06-02T09:00:00"},
            {"id": "b", "title": "Holiday", "start_time": "2025-06-02", "all_day": true}
        ]"#;
        let feed = decode_feed(json, anchor(), &tz).unwrap();
        assert_eq!(feed.events[0].start_time, Utc.with_ymd_and_hms(2025, 6, 2, 13, 0, 0).unwrap());
        assert_eq!(feed.events[1].start_time, Utc.with_ymd_and_hms(2025, 6, 2, 4, 0, 0).unwrap());
        assert!(feed.events[1].all_day);
    }

    #[test]
    fn test_document_level_errors() {
        assert!(matches!(decode_feed("{}", anchor(), &Tz::UTC), Err(FeedError::NotAnArray(_))));
        assert!(matches!(decode_feed("[", anchor(), &Tz::UTC), Err(FeedError::Json(_))));
    }

    #[test]
    fn test_load_feed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "a", "title": "t", "start_time": "2025-06-02T09:00:00Z"}}]"#).unwrap();

        let feed = load_feed_file(file.path(), anchor(), &Tz::UTC).unwrap();
        assert_eq!(feed.events.len(), 1);

        let missing = load_feed_file(Path::new("/nonexistent/feed.json"), anchor(), &Tz::UTC);
        assert!(missing.is_err());
    }
}
