//! MembershipLedger - Effective-end-date arithmetic and lifecycle queries.
//!
//! The ledger is the single place that combines a membership row with its
//! applied grants. Attendance gating, compensation and the expiry sweep all
//! go through it rather than reading `end_date` directly.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, MembershipId, UserId};
use crate::domain::membership::{Membership, PlanStatus};
use crate::ports::{CompensationRepository, MembershipRepository};

/// A membership together with its derived dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipView {
    pub membership: Membership,
    pub bonus_days: i64,
    pub effective_end_date: NaiveDate,
    pub days_remaining: i64,
}

#[derive(Clone)]
pub struct MembershipLedger {
    memberships: Arc<dyn MembershipRepository>,
    compensations: Arc<dyn CompensationRepository>,
}

impl MembershipLedger {
    pub fn new(
        memberships: Arc<dyn MembershipRepository>,
        compensations: Arc<dyn CompensationRepository>,
    ) -> Self {
        Self {
            memberships,
            compensations,
        }
    }

    /// `end_date` plus all applied grant days.
    pub async fn effective_end_date(&self, membership: &Membership) -> Result<NaiveDate, DomainError> {
        let bonus = self.compensations.applied_bonus_days(&membership.id).await?;
        Ok(membership.effective_end_date(bonus))
    }

    /// The member's membership that is active and covers `as_of`.
    ///
    /// If several qualify the most recently created wins.
    pub async fn get_active_membership(
        &self,
        member_id: &UserId,
        as_of: NaiveDate,
    ) -> Result<Option<Membership>, DomainError> {
        let candidates = self.memberships.find_by_member(member_id).await?;
        for membership in candidates {
            if membership.status != PlanStatus::Active || membership.start_date > as_of {
                continue;
            }
            let bonus = self.compensations.applied_bonus_days(&membership.id).await?;
            if membership.is_active_on(as_of, bonus) {
                return Ok(Some(membership));
            }
        }
        Ok(None)
    }

    /// # Errors
    ///
    /// `NotFound` if the membership does not exist.
    pub async fn get_membership(
        &self,
        id: &MembershipId,
        today: NaiveDate,
    ) -> Result<MembershipView, DomainError> {
        let membership = self
            .memberships
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("membership", id))?;
        let bonus_days = self.compensations.applied_bonus_days(id).await?;

        Ok(MembershipView {
            effective_end_date: membership.effective_end_date(bonus_days),
            days_remaining: membership.days_remaining(today, bonus_days),
            bonus_days,
            membership,
        })
    }

    /// Moves an active membership whose effective end date is before `today`
    /// to expired.
    ///
    /// Returns `true` if this call made the transition, `false` if it was
    /// already expired (including by a concurrent sweep).
    ///
    /// # Errors
    ///
    /// - `NotFound` if the membership does not exist
    /// - `InvalidState` if it is not due yet, or is still pending
    pub async fn transition_expired(
        &self,
        id: &MembershipId,
        today: NaiveDate,
    ) -> Result<bool, DomainError> {
        let mut membership = self
            .memberships
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("membership", id))?;
        let bonus = self.compensations.applied_bonus_days(id).await?;

        if !membership.expire(today, bonus)? {
            return Ok(false);
        }
        let transitioned = self.memberships.mark_expired(id, today).await?;
        if !transitioned {
            return self.explain_skipped_expiry(id, today).await;
        }
        tracing::info!(
            membership_id = %id,
            member_id = %membership.member_id,
            effective_end = %membership.effective_end_date(bonus),
            "Membership expired"
        );
        Ok(true)
    }

    /// The store declined the expiry: either an overlapping sweep got there
    /// first, or days were added after our read.
    async fn explain_skipped_expiry(
        &self,
        id: &MembershipId,
        today: NaiveDate,
    ) -> Result<bool, DomainError> {
        let mut current = self
            .memberships
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("membership", id))?;
        let bonus = self.compensations.applied_bonus_days(id).await?;
        current.expire(today, bonus)?;
        Ok(false)
    }
}
