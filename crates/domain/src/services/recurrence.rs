//! Recurrence evaluation.
//!
//! Expands a schedule descriptor into the concrete UTC instants it fires
//! at inside a half-open calendar-date range `[from, to)`. All matching
//! happens on local dates in the schedule's timezone; the result is
//! converted to UTC at the end.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

use crate::models::schedule::{Schedule, ScheduleKind};

/// Number of days in the given month.
fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next.and_then(|d| d.pred_opt()) {
        Some(last) => last.day(),
        None => 28,
    }
}

/// Whether the schedule fires on the given local calendar date, ignoring
/// range bounds.
fn fires_on(schedule: &Schedule, date: NaiveDate) -> bool {
    if date < schedule.start_date {
        return false;
    }
    if schedule.end_date.is_some_and(|end| date >= end) {
        return false;
    }
    match schedule.kind {
        ScheduleKind::Once => date == schedule.start_date,
        ScheduleKind::Daily => true,
        ScheduleKind::Weekly => schedule
            .days_of_week
            .as_ref()
            .is_some_and(|days| days.iter().any(|d| d.to_chrono() == date.weekday())),
        ScheduleKind::Monthly => match schedule.day_of_month {
            // Months shorter than the requested day clamp to their last day.
            Some(day) => date.day() == day.min(days_in_month(date.year(), date.month())),
            None => false,
        },
    }
}

/// Expand the schedule into UTC instants for local dates in `[from, to)`.
///
/// Malformed descriptors (bad time or timezone) and local times erased by
/// a DST gap produce no occurrences rather than an error; validation at
/// write time is expected to catch the former.
pub fn occurrences_in_range(
    schedule: &Schedule,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<DateTime<Utc>> {
    if schedule.tz().is_none() || schedule.time_of_day().is_none() {
        return Vec::new();
    }

    let mut occurrences = Vec::new();
    let mut date = from.max(schedule.start_date);
    let stop = match schedule.end_date {
        Some(end) => to.min(end),
        None => to,
    };
    while date < stop {
        if fires_on(schedule, date) {
            if let Some(instant) = schedule.occurs_at_utc(date) {
                occurrences.push(instant);
            }
        }
        date = match date.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::DayOfWeek;

    fn schedule(kind: ScheduleKind) -> Schedule {
        Schedule {
            kind,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            time: "09:00".to_string(),
            timezone: "UTC".to_string(),
            days_of_week: None,
            day_of_month: None,
            end_date: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_once_fires_exactly_once_inside_range() {
        let s = schedule(ScheduleKind::Once);
        let hits = occurrences_in_range(&s, date(2025, 1, 1), date(2025, 2, 1));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].to_rfc3339(), "2025-01-01T09:00:00+00:00");

        // Range strictly after the start date: nothing.
        assert!(occurrences_in_range(&s, date(2025, 1, 2), date(2025, 2, 1)).is_empty());
    }

    #[test]
    fn test_range_upper_bound_is_exclusive() {
        let s = schedule(ScheduleKind::Daily);
        let hits = occurrences_in_range(&s, date(2025, 1, 1), date(2025, 1, 4));
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_daily_respects_start_and_end_date() {
        let mut s = schedule(ScheduleKind::Daily);
        s.start_date = date(2025, 1, 10);
        s.end_date = Some(date(2025, 1, 13));
        let hits = occurrences_in_range(&s, date(2025, 1, 1), date(2025, 2, 1));
        // 10th, 11th, 12th; the end date itself is excluded.
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].to_rfc3339(), "2025-01-10T09:00:00+00:00");
        assert_eq!(hits[2].to_rfc3339(), "2025-01-12T09:00:00+00:00");
    }

    #[test]
    fn test_weekly_matches_selected_weekdays() {
        let mut s = schedule(ScheduleKind::Weekly);
        s.days_of_week = Some(vec![DayOfWeek::Mon, DayOfWeek::Thu]);
        let hits = occurrences_in_range(&s, date(2025, 1, 1), date(2025, 1, 15));
        // Jan 2025: Thu 2, Mon 6, Thu 9, Mon 13.
        let days: Vec<u32> = hits.iter().map(|dt| dt.date_naive().day()).collect();
        assert_eq!(days, vec![2, 6, 9, 13]);
    }

    #[test]
    fn test_weekly_mon_thu_covers_full_january() {
        let mut s = schedule(ScheduleKind::Weekly);
        s.days_of_week = Some(vec![DayOfWeek::Mon, DayOfWeek::Thu]);
        let hits = occurrences_in_range(&s, date(2025, 1, 1), date(2025, 2, 1));

        let days: Vec<u32> = hits.iter().map(|dt| dt.date_naive().day()).collect();
        assert_eq!(days, vec![2, 6, 9, 13, 16, 20, 23, 27, 30]);
        for hit in &hits {
            assert!(hit.to_rfc3339().contains("T09:00:00"));
            assert_eq!(hit.date_naive().month(), 1);
        }
    }

    #[test]
    fn test_monthly_fires_on_requested_day() {
        let mut s = schedule(ScheduleKind::Monthly);
        s.day_of_month = Some(15);
        let hits = occurrences_in_range(&s, date(2025, 1, 1), date(2025, 4, 1));
        let dates: Vec<NaiveDate> = hits.iter().map(|dt| dt.date_naive()).collect();
        assert_eq!(
            dates,
            vec![date(2025, 1, 15), date(2025, 2, 15), date(2025, 3, 15)]
        );
    }

    #[test]
    fn test_monthly_day_31_clamps_to_short_months() {
        let mut s = schedule(ScheduleKind::Monthly);
        s.day_of_month = Some(31);
        let hits = occurrences_in_range(&s, date(2025, 1, 1), date(2025, 5, 1));
        let dates: Vec<NaiveDate> = hits.iter().map(|dt| dt.date_naive()).collect();
        assert_eq!(
            dates,
            vec![
                date(2025, 1, 31),
                date(2025, 2, 28),
                date(2025, 3, 31),
                date(2025, 4, 30),
            ]
        );
    }

    #[test]
    fn test_monthly_clamp_respects_leap_year() {
        let mut s = schedule(ScheduleKind::Monthly);
        s.start_date = date(2024, 1, 1);
        s.day_of_month = Some(30);
        let hits = occurrences_in_range(&s, date(2024, 2, 1), date(2024, 3, 1));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].date_naive(), date(2024, 2, 29));
    }

    #[test]
    fn test_timezone_offset_applied_to_occurrences() {
        let mut s = schedule(ScheduleKind::Daily);
        s.timezone = "America/New_York".to_string();
        let hits = occurrences_in_range(&s, date(2025, 1, 1), date(2025, 1, 2));
        assert_eq!(hits[0].to_rfc3339(), "2025-01-01T14:00:00+00:00");
    }

    #[test]
    fn test_malformed_descriptor_yields_no_occurrences() {
        let mut s = schedule(ScheduleKind::Daily);
        s.timezone = "Moon/Tranquility".to_string();
        assert!(occurrences_in_range(&s, date(2025, 1, 1), date(2025, 1, 10)).is_empty());

        let mut s = schedule(ScheduleKind::Daily);
        s.time = "9am".to_string();
        assert!(occurrences_in_range(&s, date(2025, 1, 1), date(2025, 1, 10)).is_empty());
    }

    #[test]
    fn test_empty_range_yields_no_occurrences() {
        let s = schedule(ScheduleKind::Daily);
        assert!(occurrences_in_range(&s, date(2025, 1, 10), date(2025, 1, 10)).is_empty());
        assert!(occurrences_in_range(&s, date(2025, 1, 10), date(2025, 1, 5)).is_empty());
    }
}
