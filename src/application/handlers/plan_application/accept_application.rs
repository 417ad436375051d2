//! AcceptApplicationHandler - Command handler for accepting applications.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::application::Notifier;
use crate::domain::foundation::{ApplicationId, DomainError};
use crate::domain::membership::{Membership, Receipt};
use crate::domain::notification::Notice;
use crate::domain::plan_application::{
    ApplicationStatus, Payment, PaymentMethod, PlanApplication,
};
use crate::ports::{AcceptedApplication, ApplicationRepository, PlanCatalog};

#[derive(Debug, Clone)]
pub struct AcceptApplicationCommand {
    pub application_id: ApplicationId,
    /// Amount paid, in cents.
    pub payment_amount: i64,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AcceptApplicationResult {
    pub application: PlanApplication,
    pub membership: Membership,
    pub receipt: Receipt,
}

/// Accepts a pending application.
///
/// Membership, receipt and the status change are committed as one unit; the
/// notice goes out only after the commit and cannot undo it.
pub struct AcceptApplicationHandler {
    applications: Arc<dyn ApplicationRepository>,
    plans: Arc<dyn PlanCatalog>,
    notifier: Notifier,
}

impl AcceptApplicationHandler {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        plans: Arc<dyn PlanCatalog>,
        notifier: Notifier,
    ) -> Self {
        Self {
            applications,
            plans,
            notifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: AcceptApplicationCommand,
    ) -> Result<AcceptApplicationResult, DomainError> {
        let payment = Payment::new(
            cmd.payment_amount,
            cmd.payment_date,
            cmd.payment_method,
            cmd.reference_number,
        )?;

        let mut application = self
            .applications
            .find_by_id(&cmd.application_id)
            .await?
            .ok_or_else(|| DomainError::not_found("application", cmd.application_id))?;
        if application.status != ApplicationStatus::Pending {
            return Err(DomainError::invalid_state(format!(
                "Application is already {}",
                application.status
            )));
        }

        let plan = self
            .plans
            .find_by_id(&application.plan_id)
            .await?
            .ok_or_else(|| DomainError::not_found("plan", application.plan_id))?;

        application.accept(payment.clone())?;
        let membership = Membership::from_accepted_application(
            application.member_id.clone(),
            &plan,
            application.id,
            application.preferred_start_date,
        );
        let receipt = Receipt::issue(application.id, &membership, &payment);

        let accepted = AcceptedApplication {
            application,
            membership,
            receipt,
        };
        self.applications.record_acceptance(&accepted).await?;

        let AcceptedApplication {
            application,
            membership,
            receipt,
        } = accepted;

        tracing::info!(
            application_id = %application.id,
            membership_id = %membership.id,
            member_id = %membership.member_id,
            end_date = %membership.end_date,
            "Plan application accepted"
        );

        self.notifier
            .notify(
                &membership.member_id,
                &Notice::application_accepted(&plan.name, membership.start_date, membership.end_date),
            )
            .await;

        Ok(AcceptApplicationResult {
            application,
            membership,
            receipt,
        })
    }
}
