//! In-memory store implementing every persistence port.
//!
//! All tables live behind one lock, so each port method is trivially
//! atomic: a multi-row write either completes or returns before touching
//! anything. Fault injection lets tests exercise the rollback paths.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::attendance::Attendance;
use crate::domain::foundation::{
    add_days, ApplicationId, AttendanceId, DomainError, MembershipId, PlanId, Timestamp, UserId,
};
use crate::domain::membership::{applied_bonus_days, Compensation, Membership, PlanStatus, Receipt};
use crate::domain::notification::NotificationMarker;
use crate::domain::plan_application::{ApplicationStatus, PlanApplication};
use crate::ports::{
    AcceptedApplication, ApplicationFilter, ApplicationRepository, AttendanceRepository,
    CompensationRepository, MembershipRepository, NotificationMarkers,
};

/// Write paths that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    RecordAcceptance,
    ApplyExtension,
    SaveGrants,
    UpdateApplicationStatus,
    MarkExpired,
}

#[derive(Debug, Default)]
struct Tables {
    applications: Vec<PlanApplication>,
    memberships: Vec<Membership>,
    receipts: Vec<Receipt>,
    compensations: Vec<Compensation>,
    attendance: Vec<Attendance>,
    markers: HashSet<NotificationMarker>,
    faults: HashSet<FaultPoint>,
}

impl Tables {
    fn check_fault(&self, point: FaultPoint) -> Result<(), DomainError> {
        if self.faults.contains(&point) {
            return Err(DomainError::internal(format!("Injected failure at {:?}", point)));
        }
        Ok(())
    }
}

/// Shared in-process store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call through `point` fail with `Internal`.
    pub async fn inject_fault(&self, point: FaultPoint) {
        self.tables.lock().await.faults.insert(point);
    }

    pub async fn clear_faults(&self) {
        self.tables.lock().await.faults.clear();
    }

    /// Seed a membership directly, bypassing acceptance.
    pub async fn insert_membership(&self, membership: Membership) {
        self.tables.lock().await.memberships.push(membership);
    }

    pub async fn memberships(&self) -> Vec<Membership> {
        self.tables.lock().await.memberships.clone()
    }

    pub async fn receipts(&self) -> Vec<Receipt> {
        self.tables.lock().await.receipts.clone()
    }

    pub async fn applications(&self) -> Vec<PlanApplication> {
        self.tables.lock().await.applications.clone()
    }

    pub async fn attendance(&self) -> Vec<Attendance> {
        self.tables.lock().await.attendance.clone()
    }

    pub async fn marker_count(&self) -> usize {
        self.tables.lock().await.markers.len()
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryStore {
    async fn save(&self, application: &PlanApplication) -> Result<(), DomainError> {
        let mut tables = self.tables.lock().await;
        let duplicate = tables.applications.iter().any(|a| {
            a.member_id == application.member_id
                && a.plan_id == application.plan_id
                && a.status.blocks_resubmission()
        });
        if duplicate {
            return Err(DomainError::conflict(
                "An application for this plan is already pending or accepted",
            ));
        }
        tables.applications.push(application.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<PlanApplication>, DomainError> {
        let tables = self.tables.lock().await;
        Ok(tables.applications.iter().find(|a| &a.id == id).cloned())
    }

    async fn find_open(
        &self,
        member_id: &UserId,
        plan_id: &PlanId,
    ) -> Result<Option<PlanApplication>, DomainError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .applications
            .iter()
            .find(|a| {
                &a.member_id == member_id && &a.plan_id == plan_id && a.status.blocks_resubmission()
            })
            .cloned())
    }

    async fn record_acceptance(&self, accepted: &AcceptedApplication) -> Result<(), DomainError> {
        let mut tables = self.tables.lock().await;
        let id = accepted.application.id;
        let index = tables
            .applications
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| DomainError::not_found("application", id))?;

        let current = tables.applications[index].status;
        if current != ApplicationStatus::Pending {
            return Err(DomainError::invalid_state(format!(
                "Application is {}, not pending",
                current
            )));
        }
        tables.check_fault(FaultPoint::RecordAcceptance)?;

        tables.applications[index] = accepted.application.clone();
        tables.memberships.push(accepted.membership.clone());
        tables.receipts.push(accepted.receipt.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        application: &PlanApplication,
        expected: ApplicationStatus,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.lock().await;
        tables.check_fault(FaultPoint::UpdateApplicationStatus)?;
        let stored = tables
            .applications
            .iter_mut()
            .find(|a| a.id == application.id)
            .ok_or_else(|| DomainError::not_found("application", application.id))?;

        if stored.status != expected {
            return Err(DomainError::invalid_state(format!(
                "Application is {}, expected {}",
                stored.status, expected
            )));
        }
        *stored = application.clone();
        Ok(())
    }

    async fn list(&self, filter: &ApplicationFilter) -> Result<Vec<PlanApplication>, DomainError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<PlanApplication> = tables
            .applications
            .iter()
            .rev()
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .filter(|a| filter.member_id.as_ref().map_or(true, |m| &a.member_id == m))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_stale_pending(&self, today: NaiveDate) -> Result<Vec<PlanApplication>, DomainError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .applications
            .iter()
            .filter(|a| a.is_stale(today))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn find_by_id(&self, id: &MembershipId) -> Result<Option<Membership>, DomainError> {
        let tables = self.tables.lock().await;
        Ok(tables.memberships.iter().find(|m| &m.id == id).cloned())
    }

    async fn find_by_member(&self, member_id: &UserId) -> Result<Vec<Membership>, DomainError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Membership> = tables
            .memberships
            .iter()
            .rev()
            .filter(|m| &m.member_id == member_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_active(&self) -> Result<Vec<Membership>, DomainError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .memberships
            .iter()
            .filter(|m| m.status == PlanStatus::Active)
            .cloned()
            .collect())
    }

    async fn apply_extension(&self, audit: &Compensation) -> Result<Membership, DomainError> {
        let mut tables = self.tables.lock().await;
        tables.check_fault(FaultPoint::ApplyExtension)?;
        let membership = tables
            .memberships
            .iter_mut()
            .find(|m| m.id == audit.membership_id)
            .ok_or_else(|| DomainError::not_found("membership", audit.membership_id))?;

        membership.end_date = add_days(membership.end_date, audit.days);
        membership.updated_at = Timestamp::now();
        let updated = membership.clone();
        tables.compensations.push(audit.clone());
        Ok(updated)
    }

    async fn mark_expired(&self, id: &MembershipId, today: NaiveDate) -> Result<bool, DomainError> {
        let mut tables = self.tables.lock().await;
        tables.check_fault(FaultPoint::MarkExpired)?;
        let bonus = applied_bonus_days(tables.compensations.iter().filter(|c| &c.membership_id == id));
        match tables.memberships.iter_mut().find(|m| &m.id == id) {
            Some(m) if m.status == PlanStatus::Active && m.effective_end_date(bonus) < today => {
                m.status = PlanStatus::Expired;
                m.updated_at = Timestamp::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl CompensationRepository for InMemoryStore {
    async fn save_grants(&self, grants: &[Compensation]) -> Result<(), DomainError> {
        let mut tables = self.tables.lock().await;
        tables.check_fault(FaultPoint::SaveGrants)?;
        for grant in grants {
            let active = tables
                .memberships
                .iter()
                .any(|m| m.id == grant.membership_id && m.status == PlanStatus::Active);
            if !active {
                return Err(DomainError::conflict(format!(
                    "Membership {} is not active",
                    grant.membership_id
                )));
            }
        }
        tables.compensations.extend(grants.iter().cloned());
        Ok(())
    }

    async fn applied_bonus_days(&self, membership_id: &MembershipId) -> Result<i64, DomainError> {
        let tables = self.tables.lock().await;
        Ok(applied_bonus_days(
            tables
                .compensations
                .iter()
                .filter(|c| &c.membership_id == membership_id),
        ))
    }

    async fn history(&self, membership_id: &MembershipId) -> Result<Vec<Compensation>, DomainError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Compensation> = tables
            .compensations
            .iter()
            .rev()
            .filter(|c| &c.membership_id == membership_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[async_trait]
impl AttendanceRepository for InMemoryStore {
    async fn insert_check_in(&self, attendance: &Attendance) -> Result<(), DomainError> {
        let mut tables = self.tables.lock().await;
        let exists = tables
            .attendance
            .iter()
            .any(|a| a.member_id == attendance.member_id && a.date == attendance.date);
        if exists {
            return Err(DomainError::conflict("Attendance already recorded today"));
        }
        tables.attendance.push(attendance.clone());
        Ok(())
    }

    async fn find_for_date(
        &self,
        member_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, DomainError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .attendance
            .iter()
            .find(|a| &a.member_id == member_id && a.date == date)
            .cloned())
    }

    async fn record_check_out(
        &self,
        id: &AttendanceId,
        at: Timestamp,
    ) -> Result<Option<Attendance>, DomainError> {
        let mut tables = self.tables.lock().await;
        match tables.attendance.iter_mut().find(|a| &a.id == id) {
            Some(row) if row.is_open() => {
                row.time_out = Some(at);
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_for_member(
        &self,
        member_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Attendance>, DomainError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Attendance> = tables
            .attendance
            .iter()
            .filter(|a| &a.member_id == member_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[async_trait]
impl NotificationMarkers for InMemoryStore {
    async fn claim(&self, marker: &NotificationMarker) -> Result<bool, DomainError> {
        Ok(self.tables.lock().await.markers.insert(marker.clone()))
    }

    async fn release(&self, marker: &NotificationMarker) -> Result<(), DomainError> {
        self.tables.lock().await.markers.remove(marker);
        Ok(())
    }
}
