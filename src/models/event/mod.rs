// Event module
// Calendar event record as delivered by the data layer

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Duration assumed for events that arrive without an end time.
pub const DEFAULT_EVENT_DURATION_MINUTES: i64 = 60;

/// Where an event came from. Only used to pick a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Synced from an external calendar (Google Calendar)
    Google,
    /// Created inside the back-office
    #[default]
    Native,
    #[serde(other)]
    Unknown,
}

/// Calendar event shown on the time grid.
///
/// Records are owned by the data layer; the layout engine only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub source: EventSource,
}

impl CalendarEvent {
    /// Create a timed event with an explicit end.
    ///
    /// # Examples
    /// ```
    /// use deal_calendar::models::event::CalendarEvent;
    /// use chrono::{Duration, Utc};
    ///
    /// let start = Utc::now();
    /// let event = CalendarEvent::new("evt-1", "Listing walkthrough", start, Some(start + Duration::hours(1)));
    /// assert_eq!(event.duration(), Duration::hours(1));
    /// ```
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_time,
            end_time,
            all_day: false,
            location: None,
            source: EventSource::Native,
        }
    }

    pub fn builder() -> CalendarEventBuilder {
        CalendarEventBuilder::new()
    }

    /// End instant used for layout: the recorded end, or the default duration
    /// after the start when no end was recorded.
    pub fn effective_end(&self) -> DateTime<Utc> {
        self.end_time
            .unwrap_or_else(|| self.start_time + Duration::minutes(DEFAULT_EVENT_DURATION_MINUTES))
    }

    /// Signed duration between start and effective end. Negative when the
    /// record's end precedes its start.
    pub fn duration(&self) -> Duration {
        self.effective_end() - self.start_time
    }

    /// True when the recorded end precedes or equals the start.
    pub fn has_inverted_range(&self) -> bool {
        self.end_time.is_some_and(|end| end <= self.start_time)
    }
}

/// Builder for creating events with optional fields
pub struct CalendarEventBuilder {
    id: Option<String>,
    title: Option<String>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    all_day: bool,
    location: Option<String>,
    source: EventSource,
}

impl CalendarEventBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            title: None,
            start_time: None,
            end_time: None,
            all_day: false,
            location: None,
            source: EventSource::Native,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end_time = Some(end);
        self
    }

    pub fn all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn source(mut self, source: EventSource) -> Self {
        self.source = source;
        self
    }

    /// Build the event.
    ///
    /// An end before the start is accepted; the grid renders it at the
    /// minimum slot height.
    pub fn build(self) -> Result<CalendarEvent, String> {
        let id = self.id.ok_or("Event id is required")?;
        let title = self.title.ok_or("Event title is required")?;
        let start_time = self.start_time.ok_or("Event start time is required")?;

        if id.trim().is_empty() {
            return Err("Event id cannot be empty".to_string());
        }

        Ok(CalendarEvent {
            id,
            title,
            start_time,
            end_time: self.end_time,
            all_day: self.all_day,
            location: self.location,
            source: self.source,
        })
    }
}

impl Default for CalendarEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_effective_end_defaults_to_one_hour() {
        let event = CalendarEvent::new("a", "Showing", sample_start(), None);
        assert_eq!(event.effective_end(), sample_start() + Duration::minutes(60));
        assert_eq!(event.duration(), Duration::hours(1));
    }

    #[test]
    fn test_effective_end_uses_recorded_end() {
        let end = sample_start() + Duration::minutes(45);
        let event = CalendarEvent::new("a", "Showing", sample_start(), Some(end));
        assert_eq!(event.effective_end(), end);
    }

    #[test]
    fn test_inverted_range_detected() {
        let end = sample_start() - Duration::minutes(10);
        let event = CalendarEvent::new("a", "Bad record", sample_start(), Some(end));
        assert!(event.has_inverted_range());
        assert!(event.duration() < Duration::zero());
    }

    #[test]
    fn test_open_ended_event_is_not_inverted() {
        let event = CalendarEvent::new("a", "Call", sample_start(), None);
        assert!(!event.has_inverted_range());
    }

    #[test]
    fn test_builder_with_optional_fields() {
        let event = CalendarEvent::builder()
            .id("evt-42")
            .title("Open house")
            .start(sample_start())
            .end(sample_start() + Duration::hours(2))
            .location("12 Harbour St")
            .source(EventSource::Google)
            .build()
            .unwrap();

        assert_eq!(event.id, "evt-42");
        assert_eq!(event.location.as_deref(), Some("12 Harbour St"));
        assert_eq!(event.source, EventSource::Google);
        assert!(!event.all_day);
    }

    #[test]
    fn test_builder_missing_title() {
        let result = CalendarEvent::builder().id("x").start(sample_start()).build();
        assert_eq!(result.unwrap_err(), "Event title is required");
    }

    #[test]
    fn test_builder_missing_start() {
        let result = CalendarEvent::builder().id("x").title("Call").build();
        assert_eq!(result.unwrap_err(), "Event start time is required");
    }

    #[test]
    fn test_builder_blank_id() {
        let result = CalendarEvent::builder()
            .id("  ")
            .title("Call")
            .start(sample_start())
            .build();
        assert_eq!(result.unwrap_err(), "Event id cannot be empty");
    }

    #[test]
    fn test_unknown_source_deserializes() {
        let json = r#"{"id":"1","title":"t","start_time":"2025-03-14T09:00:00Z","source":"outlook"}"#;
        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.source, EventSource::Unknown);
        assert!(event.end_time.is_none());
    }
}
