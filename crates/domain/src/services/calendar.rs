//! Month calendar projection.
//!
//! Projects a set of scheduled-content items onto the days of one calendar
//! month by expanding each item's schedule. The projection is pure; the
//! caller fetches the candidate items.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::content::ScheduledContent;
use crate::models::platform::Platform;
use crate::models::status::ContentStatus;
use crate::services::recurrence::occurrences_in_range;

/// One projected occurrence of a content item on a calendar day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CalendarEntry {
    pub content_id: Uuid,
    pub title: Option<String>,
    pub platforms: Vec<Platform>,
    pub status: ContentStatus,
    /// UTC instant of this occurrence.
    pub occurs_at: DateTime<Utc>,
}

/// All occurrences falling on one local calendar day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub entries: Vec<CalendarEntry>,
}

/// Month view: days carrying at least one occurrence, in date order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CalendarView {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next))
}

/// Build the month view for `year`/`month` from the given items.
///
/// Recurring items appear on every matching day regardless of status;
/// the view shows the plan, not a delivery log. `once` items have a
/// single occurrence, so a published or failed one-shot stays on the
/// literal date it fired.
pub fn build_calendar(items: &[ScheduledContent], year: i32, month: u32) -> CalendarView {
    let Some((first, next_month)) = month_bounds(year, month) else {
        return CalendarView {
            year,
            month,
            days: Vec::new(),
        };
    };

    let mut entries: Vec<(NaiveDate, CalendarEntry)> = Vec::new();
    for item in items {
        for occurs_at in occurrences_in_range(&item.schedule, first, next_month) {
            let local_date = match item.schedule.tz() {
                Some(tz) => occurs_at.with_timezone(&tz).date_naive(),
                None => occurs_at.date_naive(),
            };
            entries.push((
                local_date,
                CalendarEntry {
                    content_id: item.id,
                    title: item.title.clone(),
                    platforms: item.platforms.clone(),
                    status: item.status,
                    occurs_at,
                },
            ));
        }
    }

    entries.sort_by(|a, b| (a.0, a.1.occurs_at).cmp(&(b.0, b.1.occurs_at)));

    let mut days: Vec<CalendarDay> = Vec::new();
    for (date, entry) in entries {
        match days.last_mut() {
            Some(day) if day.date == date => day.entries.push(entry),
            _ => days.push(CalendarDay {
                date,
                entries: vec![entry],
            }),
        }
    }

    CalendarView { year, month, days }
}
