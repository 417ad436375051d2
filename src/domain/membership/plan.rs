//! Plan catalog entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{add_days, PlanId, Timestamp, ValidationError};

/// A subscribable offering.
///
/// Plans are immutable once referenced; the only permitted change is soft
/// deactivation, which stops new applications but leaves memberships alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    /// Price in cents.
    pub price_cents: i64,
    /// Length of a membership on this plan, in whole days.
    pub duration_days: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl Plan {
    /// Creates a new active plan.
    ///
    /// # Errors
    ///
    /// - empty name
    /// - negative price
    /// - non-positive duration
    pub fn new(
        id: PlanId,
        name: impl Into<String>,
        price_cents: i64,
        duration_days: i32,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if price_cents < 0 {
            return Err(ValidationError::out_of_range("price_cents", 0, i64::MAX, price_cents));
        }
        if duration_days <= 0 {
            return Err(ValidationError::out_of_range(
                "duration_days",
                1,
                i32::MAX as i64,
                duration_days as i64,
            ));
        }

        Ok(Self {
            id,
            name,
            price_cents,
            duration_days,
            is_active: true,
            created_at: Timestamp::now(),
        })
    }

    /// Last valid day of a membership starting on `start_date`.
    ///
    /// A 30-day plan starting 2024-01-01 ends 2024-01-30 (both inclusive).
    pub fn end_date_for(&self, start_date: NaiveDate) -> NaiveDate {
        add_days(start_date, i64::from(self.duration_days) - 1)
    }

    /// Soft-deactivates the plan.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn thirty_day_plan_ends_on_day_thirty() {
        let plan = Plan::new(PlanId::new(), "Monthly", 50_000, 30).unwrap();
        assert_eq!(plan.end_date_for(ymd(2024, 1, 1)), ymd(2024, 1, 30));
    }

    #[test]
    fn one_day_plan_ends_on_start_date() {
        let plan = Plan::new(PlanId::new(), "Day pass", 10_000, 1).unwrap();
        assert_eq!(plan.end_date_for(ymd(2024, 2, 29)), ymd(2024, 2, 29));
    }

    #[test]
    fn rejects_zero_duration() {
        assert!(Plan::new(PlanId::new(), "Broken", 100, 0).is_err());
    }

    #[test]
    fn rejects_negative_price_and_blank_name() {
        assert!(Plan::new(PlanId::new(), "Monthly", -1, 30).is_err());
        assert!(Plan::new(PlanId::new(), "  ", 100, 30).is_err());
    }

    #[test]
    fn deactivate_clears_active_flag() {
        let mut plan = Plan::new(PlanId::new(), "Monthly", 50_000, 30).unwrap();
        plan.deactivate();
        assert!(!plan.is_active);
    }
}
