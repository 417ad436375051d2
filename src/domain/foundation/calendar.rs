//! Business calendar: maps instants to the gym's local calendar date.
//!
//! "Today" for gating, expiry and attendance is always the date in the
//! configured fixed UTC offset, never the server's local zone.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};

use super::{Timestamp, ValidationError};

/// Maximum absolute offset accepted (±18h, the chrono limit).
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Fixed-offset calendar used to derive calendar dates from instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessCalendar {
    offset: FixedOffset,
}

impl BusinessCalendar {
    /// Calendar at UTC.
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Calendar at the given offset east of UTC, in minutes.
    pub fn with_offset_minutes(minutes: i32) -> Result<Self, ValidationError> {
        if minutes.abs() >= MAX_OFFSET_MINUTES {
            return Err(ValidationError::out_of_range(
                "utc_offset_minutes",
                -(MAX_OFFSET_MINUTES as i64) + 1,
                MAX_OFFSET_MINUTES as i64 - 1,
                minutes as i64,
            ));
        }
        FixedOffset::east_opt(minutes * 60)
            .map(|offset| Self { offset })
            .ok_or_else(|| ValidationError::invalid_format("utc_offset_minutes", "invalid offset"))
    }

    /// Calendar date of the given instant.
    pub fn date_of(&self, at: &Timestamp) -> NaiveDate {
        at.as_datetime().with_timezone(&self.offset).date_naive()
    }

    /// Calendar date of a raw UTC instant.
    pub fn date_of_utc(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

/// Adds a (possibly negative) number of days to a date, saturating at the
/// representable range.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let saturated = if days >= 0 { NaiveDate::MAX } else { NaiveDate::MIN };
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(saturated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn utc_calendar_uses_utc_date() {
        let at = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap());
        assert_eq!(BusinessCalendar::utc().date_of(&at), ymd(2024, 1, 1));
    }

    #[test]
    fn positive_offset_rolls_date_forward() {
        // 17:00 UTC is 01:00 the next day at +08:00
        let cal = BusinessCalendar::with_offset_minutes(8 * 60).unwrap();
        let at = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 0).unwrap());
        assert_eq!(cal.date_of(&at), ymd(2024, 1, 2));
    }

    #[test]
    fn offset_out_of_range_is_rejected() {
        assert!(BusinessCalendar::with_offset_minutes(18 * 60).is_err());
        assert!(BusinessCalendar::with_offset_minutes(-14 * 60).is_ok());
    }

    #[test]
    fn add_days_handles_month_boundaries() {
        assert_eq!(add_days(ymd(2024, 1, 30), 5), ymd(2024, 2, 4));
        assert_eq!(add_days(ymd(2024, 3, 1), -1), ymd(2024, 2, 29));
    }

    #[test]
    fn add_days_saturates_instead_of_panicking() {
        assert_eq!(add_days(ymd(2024, 1, 30), 1_000_000_000_000_000), NaiveDate::MAX);
        assert_eq!(add_days(ymd(2024, 1, 30), i64::MAX), NaiveDate::MAX);
        assert_eq!(add_days(ymd(2024, 1, 30), i64::MIN), NaiveDate::MIN);
    }
}
