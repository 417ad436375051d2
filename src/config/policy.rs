//! Business policy knobs.

use serde::Deserialize;

use crate::domain::attendance::{DwellPolicy, DEFAULT_MIN_DWELL_MINUTES};
use crate::domain::foundation::BusinessCalendar;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Minimum minutes between check-in and a scan check-out.
    #[serde(default = "default_min_dwell")]
    pub min_dwell_minutes: i64,

    /// Remind members this many days before the effective end date.
    #[serde(default = "default_expiring_soon_days")]
    pub expiring_soon_days: i64,

    /// Fixed offset the business day is computed in.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl PolicyConfig {
    pub fn dwell_policy(&self) -> DwellPolicy {
        DwellPolicy::from_minutes(self.min_dwell_minutes)
    }

    pub fn calendar(&self) -> Result<BusinessCalendar, ValidationError> {
        BusinessCalendar::with_offset_minutes(self.utc_offset_minutes)
            .map_err(|_| ValidationError::InvalidUtcOffset)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0..=1440).contains(&self.min_dwell_minutes) {
            return Err(ValidationError::InvalidDwell);
        }
        if !(0..=365).contains(&self.expiring_soon_days) {
            return Err(ValidationError::InvalidExpiringSoonWindow);
        }
        self.calendar().map(|_| ())
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_dwell_minutes: default_min_dwell(),
            expiring_soon_days: default_expiring_soon_days(),
            utc_offset_minutes: 0,
        }
    }
}

fn default_min_dwell() -> i64 {
    DEFAULT_MIN_DWELL_MINUTES
}

fn default_expiring_soon_days() -> i64 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn defaults() {
        let policy = PolicyConfig::default();
        assert_eq!(policy.min_dwell_minutes, 30);
        assert_eq!(policy.expiring_soon_days, 3);
        assert_eq!(policy.utc_offset_minutes, 0);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn offset_shifts_the_business_day() {
        let policy = PolicyConfig {
            utc_offset_minutes: 8 * 60,
            ..Default::default()
        };
        let calendar = policy.calendar().unwrap();
        let late_utc = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap());
        assert_eq!(
            calendar.date_of(&late_utc),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let policy = PolicyConfig {
            utc_offset_minutes: 19 * 60,
            ..Default::default()
        };
        assert!(matches!(policy.validate(), Err(ValidationError::InvalidUtcOffset)));
    }

    #[test]
    fn negative_dwell_is_rejected() {
        let policy = PolicyConfig {
            min_dwell_minutes: -1,
            ..Default::default()
        };
        assert!(matches!(policy.validate(), Err(ValidationError::InvalidDwell)));
    }
}
