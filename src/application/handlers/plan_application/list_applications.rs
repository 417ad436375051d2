//! ListApplicationsHandler - Query handler for plan applications.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::plan_application::{ApplicationStatus, PlanApplication};
use crate::ports::{ApplicationFilter, ApplicationRepository};

/// Who may see which applications is decided by the caller; a member-facing
/// boundary sets `member_id`, staff views leave it empty.
#[derive(Debug, Clone, Default)]
pub struct ListApplicationsQuery {
    pub status: Option<ApplicationStatus>,
    pub member_id: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct ListApplicationsResult {
    pub applications: Vec<PlanApplication>,
}

pub struct ListApplicationsHandler {
    applications: Arc<dyn ApplicationRepository>,
}

impl ListApplicationsHandler {
    pub fn new(applications: Arc<dyn ApplicationRepository>) -> Self {
        Self { applications }
    }

    pub async fn handle(
        &self,
        query: ListApplicationsQuery,
    ) -> Result<ListApplicationsResult, DomainError> {
        let filter = ApplicationFilter {
            status: query.status,
            member_id: query.member_id,
        };
        let applications = self.applications.list(&filter).await?;
        Ok(ListApplicationsResult { applications })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{member, ymd, Fixture};
    use crate::domain::foundation::PlanId;

    #[tokio::test]
    async fn filters_by_status_newest_first() {
        let fx = Fixture::new().await;
        let first = PlanApplication::submit(member(), fx.plan.id, ymd(2024, 1, 1));
        let mut second = PlanApplication::submit(member(), PlanId::new(), ymd(2024, 1, 5));
        second.created_at = first.created_at.plus_minutes(1);
        let mut declined = PlanApplication::submit(member(), PlanId::new(), ymd(2024, 1, 9));
        declined.decline().unwrap();
        for app in [&first, &second, &declined] {
            fx.store.save(app).await.unwrap();
        }

        let handler = ListApplicationsHandler::new(Arc::new(fx.store.clone()));
        let result = handler
            .handle(ListApplicationsQuery {
                status: Some(ApplicationStatus::Pending),
                member_id: None,
            })
            .await
            .unwrap();

        let ids: Vec<_> = result.applications.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn member_scope_hides_other_members() {
        let fx = Fixture::new().await;
        let mine = PlanApplication::submit(member(), fx.plan.id, ymd(2024, 1, 1));
        let theirs =
            PlanApplication::submit(UserId::new("member-2").unwrap(), fx.plan.id, ymd(2024, 1, 1));
        fx.store.save(&mine).await.unwrap();
        fx.store.save(&theirs).await.unwrap();

        let handler = ListApplicationsHandler::new(Arc::new(fx.store.clone()));
        let result = handler
            .handle(ListApplicationsQuery {
                status: None,
                member_id: Some(member()),
            })
            .await
            .unwrap();

        assert_eq!(result.applications.len(), 1);
        assert_eq!(result.applications[0].id, mine.id);
    }
}
