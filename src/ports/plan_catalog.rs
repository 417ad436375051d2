//! Plan catalog port.
//!
//! Plan CRUD lives outside this crate; the membership engine only reads.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::membership::Plan;

#[async_trait]
pub trait PlanCatalog: Send + Sync {
    /// Find a plan by ID, active or not.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError>;
}
