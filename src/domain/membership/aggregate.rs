//! Membership aggregate entity.
//!
//! A membership is a member's time-bounded grant of access to one plan.
//!
//! # Design Decisions
//!
//! - **Dates, not instants**: `start_date` and `end_date` are calendar days,
//!   both inclusive, in the business calendar.
//! - **Effective end**: `end_date` plus applied compensation grant days. The
//!   bonus is passed in by the caller, which owns the compensation rows.
//! - **One-way expiry**: `active -> expired` happens only through
//!   [`Membership::expire`], which the expiry sweep drives.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    add_days, ApplicationId, DomainError, MembershipId, PlanId, StateMachine, Timestamp, UserId,
};

use super::compensation::{validate_days, MAX_COMPENSATION_DAYS};
use super::{Plan, PlanStatus};

/// Membership aggregate.
///
/// # Invariants
///
/// - `start_date <= end_date`
/// - `end_date` only moves forward, and only through [`Membership::extend`]
/// - `status == Active` implies `start_date <= today <= effective_end` at
///   the moment the sweep last evaluated it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub member_id: UserId,
    pub plan_id: PlanId,

    /// Application this membership was created from (absent for imports).
    pub application_id: Option<ApplicationId>,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PlanStatus,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Membership {
    /// Creates the active membership for an accepted application.
    ///
    /// `end_date = start_date + plan.duration_days - 1`.
    pub fn from_accepted_application(
        member_id: UserId,
        plan: &Plan,
        application_id: ApplicationId,
        start_date: NaiveDate,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: MembershipId::new(),
            member_id,
            plan_id: plan.id,
            application_id: Some(application_id),
            start_date,
            end_date: plan.end_date_for(start_date),
            status: PlanStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// End date including applied compensation grant days.
    pub fn effective_end_date(&self, bonus_days: i64) -> NaiveDate {
        add_days(self.end_date, bonus_days.max(0))
    }

    /// True if this membership grants access on `date`.
    pub fn is_active_on(&self, date: NaiveDate, bonus_days: i64) -> bool {
        self.status == PlanStatus::Active
            && self.start_date <= date
            && date <= self.effective_end_date(bonus_days)
    }

    /// True if the sweep should move this membership to expired on `today`.
    pub fn is_due_for_expiry(&self, today: NaiveDate, bonus_days: i64) -> bool {
        self.status == PlanStatus::Active && self.effective_end_date(bonus_days) < today
    }

    /// Days left including `today`, or 0 once past the effective end.
    pub fn days_remaining(&self, today: NaiveDate, bonus_days: i64) -> i64 {
        let end = self.effective_end_date(bonus_days);
        if end < today {
            return 0;
        }
        (end - today).num_days() + 1
    }

    /// Moves `end_date` forward by `extra_days` and returns the new end date.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless `extra_days` is within `1..=MAX_COMPENSATION_DAYS`.
    pub fn extend(&mut self, extra_days: i64) -> Result<NaiveDate, DomainError> {
        validate_days(extra_days).map_err(|_| {
            DomainError::invalid_argument("extra_days", format!("extra_days must be between 1 and {}", MAX_COMPENSATION_DAYS))
        })?;
        self.end_date = add_days(self.end_date, extra_days);
        self.updated_at = Timestamp::now();
        Ok(self.end_date)
    }

    /// Marks the membership expired.
    ///
    /// Returns `Ok(false)` without changes when already expired, so repeated
    /// sweeps are harmless.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the membership is not active or its effective end
    /// date has not passed yet.
    pub fn expire(&mut self, today: NaiveDate, bonus_days: i64) -> Result<bool, DomainError> {
        if self.status == PlanStatus::Expired {
            return Ok(false);
        }
        if self.status != PlanStatus::Active {
            return Err(DomainError::invalid_state(format!(
                "Cannot expire membership in {} state",
                self.status
            )));
        }
        let effective_end = self.effective_end_date(bonus_days);
        if effective_end >= today {
            return Err(DomainError::invalid_state(format!(
                "Membership is valid through {}",
                effective_end
            )));
        }

        self.status = self.status.transition_to(PlanStatus::Expired)?;
        self.updated_at = Timestamp::now();
        Ok(true)
    }
}
