//! Compensation repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MembershipId};
use crate::domain::membership::Compensation;

#[async_trait]
pub trait CompensationRepository: Send + Sync {
    /// Insert grant rows in one transaction.
    ///
    /// Each row is only written while its membership is still active; if any
    /// membership stopped being active the whole batch is rolled back.
    ///
    /// # Errors
    ///
    /// - `Conflict` if a membership is no longer active
    /// - `Internal` on persistence failure
    async fn save_grants(&self, grants: &[Compensation]) -> Result<(), DomainError>;

    /// Sum of days counting toward the effective end date
    /// (applied grants only).
    async fn applied_bonus_days(&self, membership_id: &MembershipId) -> Result<i64, DomainError>;

    /// All rows for a membership, newest first.
    async fn history(&self, membership_id: &MembershipId) -> Result<Vec<Compensation>, DomainError>;
}
