//! Schedule descriptor value type.
//!
//! A schedule maps wall-clock intent ("every Monday at 09:00 in
//! Europe/Bratislava") to concrete UTC instants. The evaluation itself
//! lives in `services::recurrence`; this module owns the shape and
//! validation of the descriptor.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shared::validation::{validate_day_of_month, validate_time_of_day, validate_timezone};

use crate::error::EngineError;

/// Recurrence kind of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    Once,
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleKind::Once => write!(f, "once"),
            ScheduleKind::Daily => write!(f, "daily"),
            ScheduleKind::Weekly => write!(f, "weekly"),
            ScheduleKind::Monthly => write!(f, "monthly"),
        }
    }
}

/// Day of week for weekly schedules, serialized in the short English form
/// used by the calendar UI ("Mon", "Thu", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    /// Convert to the chrono weekday used during evaluation.
    pub fn to_chrono(self) -> Weekday {
        match self {
            DayOfWeek::Mon => Weekday::Mon,
            DayOfWeek::Tue => Weekday::Tue,
            DayOfWeek::Wed => Weekday::Wed,
            DayOfWeek::Thu => Weekday::Thu,
            DayOfWeek::Fri => Weekday::Fri,
            DayOfWeek::Sat => Weekday::Sat,
            DayOfWeek::Sun => Weekday::Sun,
        }
    }
}

/// Schedule descriptor, owned exclusively by a scheduled-content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Schedule {
    #[serde(rename = "type")]
    pub kind: ScheduleKind,

    /// First calendar day the schedule can fire on, in the local timezone.
    pub start_date: NaiveDate,

    /// Local clock time in 24-hour HH:MM format.
    pub time: String,

    /// IANA timezone identifier the schedule is evaluated in.
    pub timezone: String,

    /// Required iff `kind` is weekly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<DayOfWeek>>,

    /// Required iff `kind` is monthly. Months shorter than this value
    /// clamp to their last day at evaluation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,

    /// Exclusive upper bound on occurrence dates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Schedule {
    /// Validate the descriptor's internal consistency.
    ///
    /// Future-or-present checks for `once` schedules are the content
    /// manager's job since they need a clock; this only checks shape.
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_time_of_day(&self.time).map_err(|_| {
            EngineError::Validation(format!(
                "Schedule time '{}' is not a valid HH:MM clock time",
                self.time
            ))
        })?;
        validate_timezone(&self.timezone).map_err(|_| {
            EngineError::Validation(format!(
                "Schedule timezone '{}' is not a valid IANA identifier",
                self.timezone
            ))
        })?;
        if let Some(end) = self.end_date {
            if end <= self.start_date {
                return Err(EngineError::Validation(
                    "Schedule end_date must be after start_date".to_string(),
                ));
            }
        }
        match self.kind {
            ScheduleKind::Weekly => {
                if self.days_of_week.as_ref().is_none_or(|d| d.is_empty()) {
                    return Err(EngineError::Validation(
                        "Weekly schedules require a non-empty days_of_week".to_string(),
                    ));
                }
            }
            ScheduleKind::Monthly => match self.day_of_month {
                Some(day) => validate_day_of_month(day).map_err(|_| {
                    EngineError::Validation(format!(
                        "Monthly schedule day_of_month {} is out of range 1-31",
                        day
                    ))
                })?,
                None => {
                    return Err(EngineError::Validation(
                        "Monthly schedules require day_of_month".to_string(),
                    ));
                }
            },
            ScheduleKind::Once | ScheduleKind::Daily => {}
        }
        Ok(())
    }

    /// Parsed local clock time, if the HH:MM string is well formed.
    pub fn time_of_day(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.time, "%H:%M").ok()
    }

    /// Parsed timezone, if the identifier is known.
    pub fn tz(&self) -> Option<Tz> {
        self.timezone.parse::<Tz>().ok()
    }

    /// Resolve a local calendar date to the UTC instant the schedule fires
    /// at on that date.
    ///
    /// Returns `None` for malformed descriptors or local times that do not
    /// exist (spring-forward DST gap). Ambiguous times (fall-back overlap)
    /// resolve to the earlier instant.
    pub fn occurs_at_utc(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let tz = self.tz()?;
        let time = self.time_of_day()?;
        tz.from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// The single instant a `once` schedule fires at.
    pub fn once_instant(&self) -> Option<DateTime<Utc>> {
        match self.kind {
            ScheduleKind::Once => self.occurs_at_utc(self.start_date),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_schedule(kind: ScheduleKind) -> Schedule {
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

    #[test]
    fn test_once_and_daily_validate_without_extras() {
        assert!(base_schedule(ScheduleKind::Once).validate().is_ok());
        assert!(base_schedule(ScheduleKind::Daily).validate().is_ok());
    }

    #[test]
    fn test_weekly_requires_days_of_week() {
        let mut schedule = base_schedule(ScheduleKind::Weekly);
        assert!(schedule.validate().is_err());

        schedule.days_of_week = Some(vec![]);
        assert!(schedule.validate().is_err());

        schedule.days_of_week = Some(vec![DayOfWeek::Mon, DayOfWeek::Thu]);
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn test_monthly_requires_day_of_month_in_range() {
        let mut schedule = base_schedule(ScheduleKind::Monthly);
        assert!(schedule.validate().is_err());

        schedule.day_of_month = Some(0);
        assert!(schedule.validate().is_err());

        schedule.day_of_month = Some(32);
        assert!(schedule.validate().is_err());

        schedule.day_of_month = Some(31);
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn test_invalid_time_rejected() {
        let mut schedule = base_schedule(ScheduleKind::Once);
        schedule.time = "9am".to_string();
        let err = schedule.validate().unwrap_err();
        assert!(err.to_string().contains("clock time"));

        // Leading zero is required; the lenient %H:%M parse alone would
        // accept this.
        schedule.time = "9:00".to_string();
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let mut schedule = base_schedule(ScheduleKind::Once);
        schedule.timezone = "Moon/Tranquility".to_string();
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_end_date_must_follow_start_date() {
        let mut schedule = base_schedule(ScheduleKind::Daily);
        schedule.end_date = Some(schedule.start_date);
        assert!(schedule.validate().is_err());

        schedule.end_date = Some(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn test_occurs_at_utc_applies_timezone_offset() {
        let mut schedule = base_schedule(ScheduleKind::Once);
        schedule.timezone = "America/New_York".to_string();

        // 09:00 EST on 2025-01-01 is 14:00 UTC.
        let instant = schedule
            .occurs_at_utc(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .unwrap();
        assert_eq!(instant.to_rfc3339(), "2025-01-01T14:00:00+00:00");
    }

    #[test]
    fn test_once_instant_only_for_once_kind() {
        assert!(base_schedule(ScheduleKind::Once).once_instant().is_some());
        assert!(base_schedule(ScheduleKind::Daily).once_instant().is_none());
    }

    #[test]
    fn test_schedule_serde_uses_type_tag() {
        let schedule = base_schedule(ScheduleKind::Weekly);
        let json = serde_json::to_string(&schedule).unwrap();
        assert!(json.contains("\"type\":\"weekly\""));

        let parsed: Schedule = serde_json::from_str(
            r#"{"type":"weekly","start_date":"2025-01-01","time":"09:00",
                "timezone":"UTC","days_of_week":["Mon","Thu"]}"#,
        )
        .unwrap();
        assert_eq!(parsed.kind, ScheduleKind::Weekly);
        assert_eq!(
            parsed.days_of_week,
            Some(vec![DayOfWeek::Mon, DayOfWeek::Thu])
        );
    }
}
