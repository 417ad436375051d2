//! PlanApplication aggregate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ApplicationId, DomainError, PlanId, StateMachine, Timestamp, UserId,
};

use super::{ApplicationStatus, Payment};

/// A member's request to subscribe to a plan.
///
/// # Invariants
///
/// - `payment` is set if and only if `status == Accepted`
/// - at most one pending-or-accepted application per (member, plan); this
///   is enforced by the store, not by the aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanApplication {
    pub id: ApplicationId,
    pub member_id: UserId,
    pub plan_id: PlanId,
    pub preferred_start_date: NaiveDate,
    pub status: ApplicationStatus,
    pub payment: Option<Payment>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PlanApplication {
    /// Creates a new pending application.
    pub fn submit(member_id: UserId, plan_id: PlanId, preferred_start_date: NaiveDate) -> Self {
        let now = Timestamp::now();
        Self {
            id: ApplicationId::new(),
            member_id,
            plan_id,
            preferred_start_date,
            status: ApplicationStatus::Pending,
            payment: None,
            decided_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Accepts the application with the recorded payment.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless pending.
    pub fn accept(&mut self, payment: Payment) -> Result<(), DomainError> {
        self.transition_to(ApplicationStatus::Accepted)?;
        self.payment = Some(payment);
        Ok(())
    }

    /// Declines the application.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless pending.
    pub fn decline(&mut self) -> Result<(), DomainError> {
        self.transition_to(ApplicationStatus::Declined)
    }

    /// True if still pending after the preferred start date passed.
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.status == ApplicationStatus::Pending && self.preferred_start_date < today
    }

    /// Expires a stale pending application.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless pending with a preferred start date before `today`.
    pub fn expire(&mut self, today: NaiveDate) -> Result<(), DomainError> {
        if self.status == ApplicationStatus::Pending && !self.is_stale(today) {
            return Err(DomainError::invalid_state(format!(
                "Application starts on {} and is not stale yet",
                self.preferred_start_date
            )));
        }
        self.transition_to(ApplicationStatus::Expired)
    }

    fn transition_to(&mut self, target: ApplicationStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::invalid_state(format!(
                "Cannot move application from {} to {}",
                self.status, target
            ))
            .with_detail("current", self.status.as_str())
            .with_detail("attempted", target.as_str())
        })?;
        let now = Timestamp::now();
        self.decided_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}
