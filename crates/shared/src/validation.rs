//! Common validation utilities for schedules and platform sets.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// 24-hour clock time, e.g. "09:00" or "23:45".
    static ref TIME_OF_DAY_RE: Regex = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap();
}

/// Validates a local clock time string in HH:MM 24-hour format.
pub fn validate_time_of_day(time: &str) -> Result<(), ValidationError> {
    if TIME_OF_DAY_RE.is_match(time) {
        Ok(())
    } else {
        let mut err = ValidationError::new("time_format");
        err.message = Some("Time must be in 24-hour HH:MM format".into());
        Err(err)
    }
}

/// Validates an IANA timezone identifier (e.g. "America/New_York").
pub fn validate_timezone(timezone: &str) -> Result<(), ValidationError> {
    if timezone.parse::<chrono_tz::Tz>().is_ok() {
        Ok(())
    } else {
        let mut err = ValidationError::new("timezone");
        err.message = Some("Timezone must be a valid IANA identifier".into());
        Err(err)
    }
}

/// Validates a day-of-month value (1 to 31).
///
/// Months shorter than the requested day clamp at evaluation time, so 31
/// is always accepted here.
pub fn validate_day_of_month(day: u32) -> Result<(), ValidationError> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        let mut err = ValidationError::new("day_of_month_range");
        err.message = Some("Day of month must be between 1 and 31".into());
        Err(err)
    }
}

/// Validates that a media reference is an absolute http(s) URL.
pub fn validate_media_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        let mut err = ValidationError::new("media_url");
        err.message = Some("Media references must be absolute http(s) URLs".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_time_of_day_valid() {
        assert!(validate_time_of_day("00:00").is_ok());
        assert!(validate_time_of_day("09:00").is_ok());
        assert!(validate_time_of_day("23:59").is_ok());
    }

    #[test]
    fn test_validate_time_of_day_invalid() {
        assert!(validate_time_of_day("24:00").is_err());
        assert!(validate_time_of_day("9:00").is_err());
        assert!(validate_time_of_day("09:60").is_err());
        assert!(validate_time_of_day("09:00:00").is_err());
        assert!(validate_time_of_day("morning").is_err());
    }

    #[test]
    fn test_validate_timezone_valid() {
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("America/New_York").is_ok());
        assert!(validate_timezone("Europe/Bratislava").is_ok());
    }

    #[test]
    fn test_validate_timezone_invalid() {
        assert!(validate_timezone("Mars/Olympus_Mons").is_err());
        assert!(validate_timezone("").is_err());
        assert!(validate_timezone("EST5EDT4").is_err());
    }

    #[test]
    fn test_validate_day_of_month_bounds() {
        assert!(validate_day_of_month(1).is_ok());
        assert!(validate_day_of_month(31).is_ok());
        assert!(validate_day_of_month(0).is_err());
        assert!(validate_day_of_month(32).is_err());
    }

    #[test]
    fn test_validate_media_url() {
        assert!(validate_media_url("https://cdn.example.com/img.png").is_ok());
        assert!(validate_media_url("http://cdn.example.com/img.png").is_ok());
        assert!(validate_media_url("ftp://cdn.example.com/img.png").is_err());
        assert!(validate_media_url("img.png").is_err());
    }
}
