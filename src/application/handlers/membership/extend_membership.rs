//! ExtendMembershipHandler - Command handler for membership extensions.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::foundation::{BusinessCalendar, DomainError, MembershipId, UserId};
use crate::domain::membership::{validate_days, Compensation, Membership, MAX_COMPENSATION_DAYS};
use crate::ports::{Clock, MembershipRepository};

#[derive(Debug, Clone)]
pub struct ExtendMembershipCommand {
    pub membership_id: MembershipId,
    pub extra_days: i64,
    pub reason: String,
    pub actor: UserId,
}

#[derive(Debug, Clone)]
pub struct ExtendMembershipResult {
    pub membership: Membership,
    pub new_end_date: NaiveDate,
    /// Audit row written with the extension.
    pub audit: Compensation,
}

/// Pushes `end_date` out and records an audit row, in one transaction.
///
/// The audit row has kind `extension`; its days are already in `end_date`
/// and do not count again toward the effective end date.
pub struct ExtendMembershipHandler {
    memberships: Arc<dyn MembershipRepository>,
    clock: Arc<dyn Clock>,
    calendar: BusinessCalendar,
}

impl ExtendMembershipHandler {
    pub fn new(
        memberships: Arc<dyn MembershipRepository>,
        clock: Arc<dyn Clock>,
        calendar: BusinessCalendar,
    ) -> Self {
        Self {
            memberships,
            clock,
            calendar,
        }
    }

    pub async fn handle(
        &self,
        cmd: ExtendMembershipCommand,
    ) -> Result<ExtendMembershipResult, DomainError> {
        validate_days(cmd.extra_days).map_err(|_| {
            DomainError::invalid_argument("extra_days", format!("extra_days must be between 1 and {}", MAX_COMPENSATION_DAYS))
        })?;

        let membership = self
            .memberships
            .find_by_id(&cmd.membership_id)
            .await?
            .ok_or_else(|| DomainError::not_found("membership", cmd.membership_id))?;

        let today = self.calendar.date_of(&self.clock.now());
        let audit =
            Compensation::extension_audit(&membership, cmd.extra_days, cmd.reason, today, cmd.actor)?;
        let membership = self.memberships.apply_extension(&audit).await?;

        tracing::info!(
            membership_id = %membership.id,
            extra_days = cmd.extra_days,
            new_end_date = %membership.end_date,
            actor = %audit.granted_by,
            "Membership extended"
        );

        Ok(ExtendMembershipResult {
            new_end_date: membership.end_date,
            membership,
            audit,
        })
    }
}
