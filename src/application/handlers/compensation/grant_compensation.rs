//! GrantCompensationHandler - Command handler for single compensation grants.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, MembershipId, UserId};
use crate::domain::membership::{validate_days, Compensation, PlanStatus};
use crate::ports::{CompensationRepository, MembershipRepository};

#[derive(Debug, Clone)]
pub struct GrantCompensationCommand {
    pub membership_id: MembershipId,
    pub days: i64,
    pub reason: String,
    pub compensation_date: NaiveDate,
    pub actor: UserId,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GrantCompensationResult {
    pub compensation: Compensation,
}

pub struct GrantCompensationHandler {
    memberships: Arc<dyn MembershipRepository>,
    compensations: Arc<dyn CompensationRepository>,
}

impl GrantCompensationHandler {
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
        cmd: GrantCompensationCommand,
    ) -> Result<GrantCompensationResult, DomainError> {
        validate_days(cmd.days)?;

        let membership = self
            .memberships
            .find_by_id(&cmd.membership_id)
            .await?
            .ok_or_else(|| DomainError::not_found("membership", cmd.membership_id))?;
        if membership.status != PlanStatus::Active {
            return Err(DomainError::conflict(format!(
                "Membership is {}; compensation requires an active membership",
                membership.status
            )));
        }

        let compensation = Compensation::grant(
            &membership,
            cmd.days,
            cmd.reason,
            cmd.compensation_date,
            cmd.actor,
            cmd.notes,
        )?;
        self.compensations
            .save_grants(std::slice::from_ref(&compensation))
            .await?;

        tracing::info!(
            membership_id = %membership.id,
            days = compensation.days,
            actor = %compensation.granted_by,
            "Compensation granted"
        );

        Ok(GrantCompensationResult { compensation })
    }
}
