//! SubmitApplicationHandler - Command handler for plan applications.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, PlanId, UserId};
use crate::domain::plan_application::PlanApplication;
use crate::ports::{ApplicationRepository, PlanCatalog, UserDirectory};

#[derive(Debug, Clone)]
pub struct SubmitApplicationCommand {
    pub member_id: UserId,
    pub plan_id: PlanId,
    pub preferred_start_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct SubmitApplicationResult {
    pub application: PlanApplication,
}

/// Creates a pending application.
///
/// A member may hold at most one pending or accepted application per plan.
/// The pre-check gives a clean error in the common case; the store's
/// uniqueness guarantee settles races.
pub struct SubmitApplicationHandler {
    applications: Arc<dyn ApplicationRepository>,
    plans: Arc<dyn PlanCatalog>,
    directory: Arc<dyn UserDirectory>,
}

impl SubmitApplicationHandler {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        plans: Arc<dyn PlanCatalog>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            applications,
            plans,
            directory,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitApplicationCommand,
    ) -> Result<SubmitApplicationResult, DomainError> {
        self.directory
            .lookup(&cmd.member_id)
            .await?
            .ok_or_else(|| DomainError::not_found("member", &cmd.member_id))?;

        let plan = self
            .plans
            .find_by_id(&cmd.plan_id)
            .await?
            .ok_or_else(|| DomainError::not_found("plan", cmd.plan_id))?;
        if !plan.is_active {
            return Err(DomainError::conflict("Plan is not currently offered"));
        }

        if let Some(existing) = self.applications.find_open(&cmd.member_id, &cmd.plan_id).await? {
            return Err(DomainError::conflict(format!(
                "An application for {} is already {}",
                plan.name, existing.status
            ))
            .with_detail("application_id", existing.id.to_string()));
        }

        let application =
            PlanApplication::submit(cmd.member_id, cmd.plan_id, cmd.preferred_start_date);
        self.applications.save(&application).await?;

        tracing::info!(
            application_id = %application.id,
            member_id = %application.member_id,
            plan_id = %application.plan_id,
            "Plan application submitted"
        );

        Ok(SubmitApplicationResult { application })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{member, ymd, Fixture};
    use crate::domain::foundation::ErrorCode;
    use crate::domain::membership::Plan;
    use crate::domain::plan_application::ApplicationStatus;

    fn handler(fx: &Fixture) -> SubmitApplicationHandler {
        SubmitApplicationHandler::new(
            Arc::new(fx.store.clone()),
            Arc::new(fx.plans.clone()),
            Arc::new(fx.directory.clone()),
        )
    }

    fn command(fx: &Fixture) -> SubmitApplicationCommand {
        SubmitApplicationCommand {
            member_id: member(),
            plan_id: fx.plan.id,
            preferred_start_date: ymd(2024, 1, 1),
        }
    }

    #[tokio::test]
    async fn creates_pending_application() {
        let fx = Fixture::new().await;
        let result = handler(&fx).handle(command(&fx)).await.unwrap();

        assert_eq!(result.application.status, ApplicationStatus::Pending);
        assert_eq!(fx.store.applications().await.len(), 1);
    }

    #[tokio::test]
    async fn second_open_application_for_same_plan_conflicts() {
        let fx = Fixture::new().await;
        handler(&fx).handle(command(&fx)).await.unwrap();

        let err = handler(&fx).handle(command(&fx)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(fx.store.applications().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_plan_is_not_found() {
        let fx = Fixture::new().await;
        let mut cmd = command(&fx);
        cmd.plan_id = PlanId::new();

        let err = handler(&fx).handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn unknown_member_is_not_found() {
        let fx = Fixture::new().await;
        let mut cmd = command(&fx);
        cmd.member_id = UserId::new("ghost").unwrap();

        let err = handler(&fx).handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn deactivated_plan_is_not_offered() {
        let fx = Fixture::new().await;
        let mut retired = Plan::new(PlanId::new(), "Annual", 500_000, 365).unwrap();
        retired.deactivate();
        fx.plans.insert(retired.clone()).await;

        let mut cmd = command(&fx);
        cmd.plan_id = retired.id;
        let err = handler(&fx).handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }
}
