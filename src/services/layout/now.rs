use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::utils::date::{local_date, local_minutes_since_midnight, time_label};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Pixel offset of the current-time line from the top of a day column.
pub fn now_offset(now: DateTime<Utc>, tz: &Tz, hour_height: f32) -> f32 {
    local_minutes_since_midnight(now, tz) / 60.0 * hour_height
}

/// Column that should show the current-time line, if today is visible.
pub fn marker_day_index(days: &[NaiveDate], now: DateTime<Utc>, tz: &Tz) -> Option<usize> {
    let today = local_date(now, tz);
    days.iter().position(|day| *day == today)
}

/// Scroll position that puts the current hour near the top of the viewport,
/// `look_behind_hours` below the top edge. Never negative.
pub fn initial_scroll_offset(
    now: DateTime<Utc>,
    tz: &Tz,
    hour_height: f32,
    look_behind_hours: u32,
) -> f32 {
    let current_hour = now.with_timezone(tz).hour() as f32;
    ((current_hour - look_behind_hours as f32) * hour_height).max(0.0)
}

/// An empty grid slot the user clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub time: NaiveTime,
    pub label: String,
}

/// Slot containing vertical offset `y` (pixels from midnight), snapped down
/// to `slot_minutes`. Offsets outside the day clamp to its first/last slot.
pub fn slot_at_offset(y: f32, hour_height: f32, slot_minutes: u32) -> TimeSlot {
    let slot_minutes = slot_minutes.clamp(1, MINUTES_PER_DAY);

    let minutes = if hour_height > 0.0 && y.is_finite() {
        (y / hour_height * 60.0).clamp(0.0, (MINUTES_PER_DAY - 1) as f32) as u32
    } else {
        0
    };
    let snapped = minutes / slot_minutes * slot_minutes;

    let time = NaiveTime::from_num_seconds_from_midnight_opt(snapped * 60, 0)
        .unwrap_or(NaiveTime::MIN);
    TimeSlot {
        time,
        label: time_label(time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_now_offset_at_midnight_is_zero() {
        assert_eq!(now_offset(at(0, 0), &Tz::UTC, 60.0), 0.0);
    }

    #[test]
    fn test_now_offset_before_midnight_stays_in_grid() {
        let offset = now_offset(at(23, 59), &Tz::UTC, 60.0);
        assert!((offset - 1439.0).abs() < 1e-3);
        assert!(offset < 24.0 * 60.0);
    }

    #[test]
    fn test_now_offset_scales_with_hour_height() {
        assert_eq!(now_offset(at(6, 30), &Tz::UTC, 48.0), 6.5 * 48.0);
    }

    #[test_case(9, 1, 480.0 ; "one hour look-behind")]
    #[test_case(9, 2, 420.0 ; "two hour look-behind")]
    #[test_case(0, 1, 0.0 ; "clamped at midnight")]
    #[test_case(1, 2, 0.0 ; "clamped early morning")]
    fn test_initial_scroll_offset(hour: u32, look_behind: u32, expected: f32) {
        assert_eq!(initial_scroll_offset(at(hour, 20), &Tz::UTC, 60.0, look_behind), expected);
    }

    #[test]
    fn test_marker_only_when_today_visible() {
        let days: Vec<NaiveDate> = (1..=3)
            .map(|d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap())
            .collect();
        assert_eq!(marker_day_index(&days, at(12, 0), &Tz::UTC), Some(1));

        let later = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        assert_eq!(marker_day_index(&days, later, &Tz::UTC), None);
    }

    #[test_case(0.0, "12:00 AM")]
    #[test_case(545.0, "9:00 AM")]
    #[test_case(575.0, "9:30 AM")]
    #[test_case(-40.0, "12:00 AM")]
    #[test_case(99_999.0, "11:30 PM")]
    fn test_slot_at_offset(y: f32, expected: &str) {
        assert_eq!(slot_at_offset(y, 60.0, 30).label, expected);
    }

    #[test]
    fn test_slot_at_offset_degenerate_inputs() {
        assert_eq!(slot_at_offset(f32::NAN, 60.0, 30).time, NaiveTime::MIN);
        assert_eq!(slot_at_offset(300.0, 0.0, 30).time, NaiveTime::MIN);
        assert_eq!(slot_at_offset(61.0, 60.0, 0).label, "1:01 AM");
    }
}
