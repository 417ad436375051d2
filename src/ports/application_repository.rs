//! Plan application repository port.
//!
//! # Design
//!
//! - **Store-level uniqueness**: at most one pending-or-accepted application
//!   per (member, plan). `save` must enforce this atomically (e.g. a partial
//!   unique index) and report `Conflict`, not rely on a prior read.
//! - **Acceptance is one unit**: membership, receipt and the application
//!   status change commit together or not at all.
//! - **Guarded status writes**: updates carry the expected current status so
//!   two admins racing on the same application cannot both win.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{ApplicationId, DomainError, PlanId, UserId};
use crate::domain::membership::{Membership, Receipt};
use crate::domain::plan_application::{ApplicationStatus, PlanApplication};

/// Everything written when an application is accepted.
#[derive(Debug, Clone)]
pub struct AcceptedApplication {
    pub application: PlanApplication,
    pub membership: Membership,
    pub receipt: Receipt,
}

/// Listing filter. `member_id` scopes the list to one member's own
/// applications; the boundary layer decides who may omit it.
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub member_id: Option<UserId>,
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Save a new application.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the member already has a pending or accepted
    ///   application for the plan
    /// - `Internal` on persistence failure
    async fn save(&self, application: &PlanApplication) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<PlanApplication>, DomainError>;

    /// The pending or accepted application for (member, plan), if any.
    async fn find_open(
        &self,
        member_id: &UserId,
        plan_id: &PlanId,
    ) -> Result<Option<PlanApplication>, DomainError>;

    /// Atomically insert the membership and receipt and mark the
    /// application accepted.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the stored application is no longer pending
    ///   (nothing is written)
    /// - `Internal` on persistence failure (nothing is written)
    async fn record_acceptance(&self, accepted: &AcceptedApplication) -> Result<(), DomainError>;

    /// Persist a status change made on `application`, provided the stored
    /// status is still `expected`.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the stored status differs from `expected`
    async fn update_status(
        &self,
        application: &PlanApplication,
        expected: ApplicationStatus,
    ) -> Result<(), DomainError>;

    /// Applications matching `filter`, newest first.
    async fn list(&self, filter: &ApplicationFilter) -> Result<Vec<PlanApplication>, DomainError>;

    /// Pending applications whose preferred start date is before `today`.
    async fn find_stale_pending(&self, today: NaiveDate) -> Result<Vec<PlanApplication>, DomainError>;
}
