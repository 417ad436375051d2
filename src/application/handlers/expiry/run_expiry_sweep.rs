//! RunExpirySweepHandler - One pass of the daily expiry scheduler.
//!
//! Three independent passes over store state:
//!
//! 1. **Expiring soon**: active memberships whose effective end date falls
//!    within `[today, today + window]` get one reminder per effective end
//!    date, guarded by a claimed [`NotificationMarker`].
//! 2. **Expired**: active memberships whose effective end date is before
//!    `today` are moved to expired and notified. The guarded status write
//!    means only the sweep that performs the transition notifies.
//! 3. **Stale applications**: pending applications whose preferred start
//!    date has passed are expired and notified, again behind a guarded write.
//!
//! Every selection predicate excludes entities already handled, so running
//! the sweep twice, or two sweeps at once, converges on the same state with
//! no duplicate notices. A failure on one entity is logged and counted; the
//! rest of the sweep carries on.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::handlers::membership::MembershipLedger;
use crate::application::Notifier;
use crate::domain::foundation::{add_days, DomainError, ErrorCode, PlanId};
use crate::domain::membership::Membership;
use crate::domain::notification::{Notice, NotificationMarker};
use crate::domain::plan_application::{ApplicationStatus, PlanApplication};
use crate::ports::{
    ApplicationRepository, CompensationRepository, MembershipRepository, NotificationMarkers,
    PlanCatalog,
};

/// Default reminder window, in days after today.
pub const DEFAULT_EXPIRING_SOON_DAYS: i64 = 3;

#[derive(Debug, Clone)]
pub struct RunExpirySweepCommand {
    /// Business-calendar date the sweep runs for.
    pub today: NaiveDate,
}

/// Counts from one sweep, for the runner's log line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub reminded: usize,
    pub expired: usize,
    pub applications_expired: usize,
    pub notification_failures: usize,
    pub failures: usize,
}

pub struct RunExpirySweepHandler {
    ledger: MembershipLedger,
    memberships: Arc<dyn MembershipRepository>,
    compensations: Arc<dyn CompensationRepository>,
    applications: Arc<dyn ApplicationRepository>,
    plans: Arc<dyn PlanCatalog>,
    markers: Arc<dyn NotificationMarkers>,
    notifier: Notifier,
    expiring_soon_days: i64,
}

impl RunExpirySweepHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ledger: MembershipLedger,
        memberships: Arc<dyn MembershipRepository>,
        compensations: Arc<dyn CompensationRepository>,
        applications: Arc<dyn ApplicationRepository>,
        plans: Arc<dyn PlanCatalog>,
        markers: Arc<dyn NotificationMarkers>,
        notifier: Notifier,
        expiring_soon_days: i64,
    ) -> Self {
        Self {
            ledger,
            memberships,
            compensations,
            applications,
            plans,
            markers,
            notifier,
            expiring_soon_days: expiring_soon_days.max(0),
        }
    }

    /// # Errors
    ///
    /// Only if an entity selection query fails; per-entity failures are
    /// counted in the report instead.
    pub async fn handle(&self, cmd: RunExpirySweepCommand) -> Result<SweepReport, DomainError> {
        let today = cmd.today;
        let mut report = SweepReport::default();
        let mut plan_names = PlanNames::new(self.plans.clone());

        let active = self.memberships.find_active().await?;
        let mut due = Vec::new();
        for membership in active {
            let effective_end = match self.compensations.applied_bonus_days(&membership.id).await {
                Ok(bonus) => membership.effective_end_date(bonus),
                Err(e) => {
                    tracing::error!(membership_id = %membership.id, error = %e, "Sweep could not compute effective end date");
                    report.failures += 1;
                    continue;
                }
            };
            if effective_end < today {
                due.push((membership, effective_end));
            } else if effective_end <= add_days(today, self.expiring_soon_days) {
                self.remind(&membership, effective_end, today, &mut plan_names, &mut report)
                    .await;
            }
        }

        for (membership, effective_end) in due {
            self.expire_membership(&membership, effective_end, today, &mut plan_names, &mut report)
                .await;
        }

        match self.applications.find_stale_pending(today).await {
            Ok(stale) => {
                for application in stale {
                    self.expire_application(application, today, &mut plan_names, &mut report)
                        .await;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Sweep could not load stale applications");
                report.failures += 1;
            }
        }

        tracing::info!(
            today = %today,
            reminded = report.reminded,
            expired = report.expired,
            applications_expired = report.applications_expired,
            notification_failures = report.notification_failures,
            failures = report.failures,
            "Expiry sweep finished"
        );

        Ok(report)
    }

    async fn remind(
        &self,
        membership: &Membership,
        effective_end: NaiveDate,
        today: NaiveDate,
        plan_names: &mut PlanNames,
        report: &mut SweepReport,
    ) {
        let marker = NotificationMarker::expiring_soon(membership.id, effective_end);
        match self.markers.claim(&marker).await {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                tracing::error!(membership_id = %membership.id, error = %e, "Could not claim reminder marker");
                report.failures += 1;
                return;
            }
        }

        let plan_name = plan_names.get(&membership.plan_id).await;
        let days_left = (effective_end - today).num_days();
        let notice = Notice::membership_expiring_soon(&plan_name, effective_end, days_left);

        if self.notifier.notify(&membership.member_id, &notice).await {
            report.reminded += 1;
        } else {
            report.notification_failures += 1;
            // Let the next sweep retry the reminder.
            if let Err(e) = self.markers.release(&marker).await {
                tracing::warn!(membership_id = %membership.id, error = %e, "Could not release reminder marker");
            }
        }
    }

    async fn expire_membership(
        &self,
        membership: &Membership,
        effective_end: NaiveDate,
        today: NaiveDate,
        plan_names: &mut PlanNames,
        report: &mut SweepReport,
    ) {
        match self.ledger.transition_expired(&membership.id, today).await {
            Ok(true) => {
                report.expired += 1;
                let plan_name = plan_names.get(&membership.plan_id).await;
                let notice = Notice::membership_expired(&plan_name, effective_end);
                if !self.notifier.notify(&membership.member_id, &notice).await {
                    report.notification_failures += 1;
                }
            }
            Ok(false) => {}
            // A grant landed between selection and transition.
            Err(e) if e.is(ErrorCode::InvalidState) => {
                tracing::debug!(membership_id = %membership.id, reason = %e, "Membership no longer due");
            }
            Err(e) => {
                tracing::error!(membership_id = %membership.id, error = %e, "Failed to expire membership");
                report.failures += 1;
            }
        }
    }

    async fn expire_application(
        &self,
        mut application: PlanApplication,
        today: NaiveDate,
        plan_names: &mut PlanNames,
        report: &mut SweepReport,
    ) {
        let written = match application.expire(today) {
            Ok(()) => {
                self.applications
                    .update_status(&application, ApplicationStatus::Pending)
                    .await
            }
            Err(e) => Err(e),
        };

        match written {
            Ok(()) => {
                report.applications_expired += 1;
                tracing::info!(application_id = %application.id, member_id = %application.member_id, "Stale application expired");
                let plan_name = plan_names.get(&application.plan_id).await;
                let notice = Notice::application_expired(&plan_name, application.preferred_start_date);
                if !self.notifier.notify(&application.member_id, &notice).await {
                    report.notification_failures += 1;
                }
            }
            // Decided or expired by someone else since selection.
            Err(e) if e.is(ErrorCode::InvalidState) => {
                tracing::debug!(application_id = %application.id, reason = %e, "Application no longer pending");
            }
            Err(e) => {
                tracing::error!(application_id = %application.id, error = %e, "Failed to expire application");
                report.failures += 1;
            }
        }
    }
}

/// Per-sweep plan name cache. A missing plan or lookup failure falls back
/// to a generic name rather than skipping the notice.
struct PlanNames {
    plans: Arc<dyn PlanCatalog>,
    cache: HashMap<PlanId, String>,
}

impl PlanNames {
    fn new(plans: Arc<dyn PlanCatalog>) -> Self {
        Self {
            plans,
            cache: HashMap::new(),
        }
    }

    async fn get(&mut self, plan_id: &PlanId) -> String {
        if let Some(name) = self.cache.get(plan_id) {
            return name.clone();
        }
        let name = match self.plans.find_by_id(plan_id).await {
            Ok(Some(plan)) => plan.name,
            Ok(None) => "your plan".to_string(),
            Err(e) => {
                tracing::warn!(plan_id = %plan_id, error = %e, "Plan lookup failed");
                "your plan".to_string()
            }
        };
        self.cache.insert(*plan_id, name.clone());
        name
    }
}
