//! BulkGrantCompensationHandler - Grants the same days to many memberships.
//!
//! Typical use is a facility closure affecting everyone. Every membership is
//! checked before anything is written, and the rows are saved in one
//! transaction: either all members get the days or none do.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, MembershipId, UserId};
use crate::domain::membership::{validate_days, Compensation, PlanStatus};
use crate::ports::{CompensationRepository, MembershipRepository};

#[derive(Debug, Clone)]
pub struct BulkGrantCompensationCommand {
    pub membership_ids: Vec<MembershipId>,
    pub days: i64,
    pub reason: String,
    pub compensation_date: NaiveDate,
    pub actor: UserId,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BulkGrantCompensationResult {
    pub compensations: Vec<Compensation>,
}

pub struct BulkGrantCompensationHandler {
    memberships: Arc<dyn MembershipRepository>,
    compensations: Arc<dyn CompensationRepository>,
}

impl BulkGrantCompensationHandler {
    pub fn new(
        memberships: Arc<dyn MembershipRepository>,
        compensations: Arc<dyn CompensationRepository>,
    ) -> Self {
        Self {
            memberships,
            compensations,
        }
    }

    pub async fn handle(
        &self,
        cmd: BulkGrantCompensationCommand,
    ) -> Result<BulkGrantCompensationResult, DomainError> {
        validate_days(cmd.days)?;
        if cmd.membership_ids.is_empty() {
            return Err(DomainError::invalid_argument(
                "membership_ids",
                "At least one membership is required",
            ));
        }

        // Same membership listed twice gets one grant.
        let mut seen = HashSet::new();
        let ids: Vec<MembershipId> = cmd
            .membership_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        let mut memberships = Vec::with_capacity(ids.len());
        let mut inactive = Vec::new();
        for id in &ids {
            let membership = self
                .memberships
                .find_by_id(id)
                .await?
                .ok_or_else(|| DomainError::not_found("membership", id))?;
            if membership.status != PlanStatus::Active {
                inactive.push(id.to_string());
            }
            memberships.push(membership);
        }
        if !inactive.is_empty() {
            return Err(DomainError::conflict(format!(
                "{} membership(s) are not active; nothing was granted",
                inactive.len()
            ))
            .with_detail("inactive", inactive.join(",")));
        }

        let compensations = memberships
            .iter()
            .map(|m| {
                Compensation::grant(
                    m,
                    cmd.days,
                    cmd.reason.clone(),
                    cmd.compensation_date,
                    cmd.actor.clone(),
                    cmd.notes.clone(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.compensations.save_grants(&compensations).await?;

        tracing::info!(
            count = compensations.len(),
            days = cmd.days,
            actor = %cmd.actor,
            "Bulk compensation granted"
        );

        Ok(BulkGrantCompensationResult { compensations })
    }
}
