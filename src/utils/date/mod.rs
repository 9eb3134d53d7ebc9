// Date utility functions
// Time-of-day helpers shared by the layout engine and the grid view

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Minutes elapsed since local midnight, including the seconds fraction.
pub fn minutes_since_midnight(time: NaiveTime) -> f32 {
    time.num_seconds_from_midnight() as f32 / 60.0
}

/// Minutes since midnight of `instant` viewed in `tz`.
pub fn local_minutes_since_midnight(instant: DateTime<Utc>, tz: &Tz) -> f32 {
    minutes_since_midnight(instant.with_timezone(tz).time())
}

/// Calendar date of `instant` in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Signed minutes between two instants (fractional).
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f32 {
    (end - start).num_seconds() as f32 / 60.0
}

/// First instant of `date` in `tz`.
///
/// Falls back to the UTC midnight when the local midnight does not exist
/// (DST gap at 00:00).
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// "12 AM", "1 AM", ... "11 PM"
pub fn hour_label(hour: u32) -> String {
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{} {}", display, suffix)
}

/// "9:00 AM", "12:30 PM"
pub fn time_label(time: NaiveTime) -> String {
    let hour = time.hour();
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display, time.minute(), suffix)
}

/// Days from `start` for `count` consecutive dates.
pub fn date_range(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    (0..count as i64).map(|offset| start + Duration::days(offset)).collect()
}
