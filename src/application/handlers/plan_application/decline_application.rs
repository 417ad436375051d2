//! DeclineApplicationHandler - Command handler for declining applications.

use std::sync::Arc;

use crate::application::Notifier;
use crate::domain::foundation::{ApplicationId, DomainError};
use crate::domain::notification::Notice;
use crate::domain::plan_application::{ApplicationStatus, PlanApplication};
use crate::ports::{ApplicationRepository, PlanCatalog};

#[derive(Debug, Clone)]
pub struct DeclineApplicationCommand {
    pub application_id: ApplicationId,
}

#[derive(Debug, Clone)]
pub struct DeclineApplicationResult {
    pub application: PlanApplication,
}

pub struct DeclineApplicationHandler {
    applications: Arc<dyn ApplicationRepository>,
    plans: Arc<dyn PlanCatalog>,
    notifier: Notifier,
}

impl DeclineApplicationHandler {
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
        cmd: DeclineApplicationCommand,
    ) -> Result<DeclineApplicationResult, DomainError> {
        let mut application = self
            .applications
            .find_by_id(&cmd.application_id)
            .await?
            .ok_or_else(|| DomainError::not_found("application", cmd.application_id))?;

        application.decline()?;
        self.applications
            .update_status(&application, ApplicationStatus::Pending)
            .await?;

        tracing::info!(
            application_id = %application.id,
            member_id = %application.member_id,
            "Plan application declined"
        );

        let plan_name = match self.plans.find_by_id(&application.plan_id).await {
            Ok(Some(plan)) => plan.name,
            _ => "your selected plan".to_string(),
        };
        self.notifier
            .notify(&application.member_id, &Notice::application_declined(&plan_name))
            .await;

        Ok(DeclineApplicationResult { application })
    }
}
