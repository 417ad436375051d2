//! CompensationHistoryHandler - Query handler for a membership's grants.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, MembershipId, UserId};
use crate::domain::membership::Compensation;
use crate::ports::{CompensationRepository, MembershipRepository, UserDirectory};

#[derive(Debug, Clone)]
pub struct CompensationHistoryQuery {
    pub membership_id: MembershipId,
}

/// A compensation row with its granting actor resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationEntry {
    pub compensation: Compensation,
    /// Display name, else email, else the raw user ID.
    pub granted_by_name: String,
}

#[derive(Debug, Clone)]
pub struct CompensationHistoryResult {
    pub entries: Vec<CompensationEntry>,
}

pub struct CompensationHistoryHandler {
    memberships: Arc<dyn MembershipRepository>,
    compensations: Arc<dyn CompensationRepository>,
    directory: Arc<dyn UserDirectory>,
}

impl CompensationHistoryHandler {
    pub fn new(
        memberships: Arc<dyn MembershipRepository>,
        compensations: Arc<dyn CompensationRepository>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            memberships,
            compensations,
            directory,
        }
    }

    pub async fn handle(
        &self,
        query: CompensationHistoryQuery,
    ) -> Result<CompensationHistoryResult, DomainError> {
        if self.memberships.find_by_id(&query.membership_id).await?.is_none() {
            return Err(DomainError::not_found("membership", query.membership_id));
        }

        let rows = self.compensations.history(&query.membership_id).await?;
        let mut names: HashMap<UserId, String> = HashMap::new();
        let mut entries = Vec::with_capacity(rows.len());
        for compensation in rows {
            let granted_by_name = match names.get(&compensation.granted_by) {
                Some(name) => name.clone(),
                None => {
                    let name = self.actor_name(&compensation.granted_by).await;
                    names.insert(compensation.granted_by.clone(), name.clone());
                    name
                }
            };
            entries.push(CompensationEntry {
                compensation,
                granted_by_name,
            });
        }

        Ok(CompensationHistoryResult { entries })
    }

    async fn actor_name(&self, user_id: &UserId) -> String {
        match self.directory.lookup(user_id).await {
            Ok(Some(entry)) => entry.display_name.unwrap_or(entry.email),
            Ok(None) => user_id.to_string(),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Actor lookup failed");
                user_id.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{admin, ymd, Fixture};
    use crate::domain::foundation::ErrorCode;

    fn handler(fx: &Fixture) -> CompensationHistoryHandler {
        CompensationHistoryHandler::new(
            Arc::new(fx.store.clone()),
            Arc::new(fx.store.clone()),
            Arc::new(fx.directory.clone()),
        )
    }

    #[tokio::test]
    async fn resolves_actor_names_newest_first() {
        let fx = Fixture::new().await;
        let m = fx.active_membership(ymd(2024, 1, 1)).await;
        let first = Compensation::grant(&m, 1, "First", ymd(2024, 1, 5), admin(), None).unwrap();
        let mut second =
            Compensation::grant(&m, 2, "Second", ymd(2024, 1, 6), UserId::new("gone").unwrap(), None)
                .unwrap();
        second.created_at = first.created_at.plus_minutes(1);
        fx.store.save_grants(&[first, second]).await.unwrap();

        let result = handler(&fx)
            .handle(CompensationHistoryQuery { membership_id: m.id })
            .await
            .unwrap();

        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].compensation.reason, "Second");
        assert_eq!(result.entries[0].granted_by_name, "gone");
        assert_eq!(result.entries[1].granted_by_name, "Front Desk");
    }

    #[tokio::test]
    async fn unknown_membership_is_not_found() {
        let fx = Fixture::new().await;
        let err = handler(&fx)
            .handle(CompensationHistoryQuery { membership_id: MembershipId::new() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
