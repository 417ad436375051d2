//! Membership repository port.
//!
//! Memberships are created only through
//! [`ApplicationRepository::record_acceptance`](super::ApplicationRepository::record_acceptance);
//! this port covers reads and the two mutations the ledger owns.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, MembershipId, UserId};
use crate::domain::membership::{Compensation, Membership};

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn find_by_id(&self, id: &MembershipId) -> Result<Option<Membership>, DomainError>;

    /// All memberships of a member, most recently created first.
    async fn find_by_member(&self, member_id: &UserId) -> Result<Vec<Membership>, DomainError>;

    /// All memberships currently in `active` status.
    async fn find_active(&self) -> Result<Vec<Membership>, DomainError>;

    /// Atomically move `end_date` forward by `audit.days` and insert the
    /// audit row. Returns the updated membership.
    ///
    /// The increment is applied by the store, so concurrent extensions
    /// both take effect.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the membership vanished (nothing is written)
    /// - `Internal` on persistence failure (nothing is written)
    async fn apply_extension(&self, audit: &Compensation) -> Result<Membership, DomainError>;

    /// Set status to `expired` if it is still `active` and its effective
    /// end date (`end_date` plus applied grant days) is before `today`.
    ///
    /// The check and the write are one atomic step, so a grant or extension
    /// committed after the caller's last read is never overridden.
    ///
    /// Returns `false` when either condition no longer holds.
    async fn mark_expired(&self, id: &MembershipId, today: NaiveDate) -> Result<bool, DomainError>;
}
