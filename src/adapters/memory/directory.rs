//! In-memory plan catalog and user directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, PlanId, UserId};
use crate::domain::membership::Plan;
use crate::ports::{DirectoryEntry, PlanCatalog, UserDirectory};

#[derive(Debug, Clone, Default)]
pub struct InMemoryPlanCatalog {
    plans: Arc<RwLock<HashMap<PlanId, Plan>>>,
}

impl InMemoryPlanCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, plan: Plan) {
        self.plans.write().await.insert(plan.id, plan);
    }
}

#[async_trait]
impl PlanCatalog for InMemoryPlanCatalog {
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        Ok(self.plans.read().await.get(id).cloned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, DirectoryEntry>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, entry: DirectoryEntry) {
        self.users.write().await.insert(entry.user_id.clone(), entry);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn lookup(&self, user_id: &UserId) -> Result<Option<DirectoryEntry>, DomainError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_by_member_code(&self, code: &str) -> Result<Option<DirectoryEntry>, DomainError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|e| e.member_code.as_deref() == Some(code))
            .cloned())
    }
}
