//! PostgreSQL implementation of MembershipRepository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    ApplicationId, DomainError, MembershipId, PlanId, Timestamp, UserId,
};
use crate::domain::membership::{Compensation, CompensationKind, Membership};
use crate::ports::MembershipRepository;

use super::{db_error, parse_column, parse_user_id};

const SELECT_COLUMNS: &str = r#"
    SELECT id, member_id, plan_id, application_id, start_date, end_date,
           status, created_at, updated_at
    FROM memberships
"#;

pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    id: Uuid,
    member_id: String,
    plan_id: Uuid,
    application_id: Option<Uuid>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Membership {
            id: MembershipId::from_uuid(row.id),
            member_id: parse_user_id("member_id", row.member_id)?,
            plan_id: PlanId::from_uuid(row.plan_id),
            application_id: row.application_id.map(ApplicationId::from_uuid),
            start_date: row.start_date,
            end_date: row.end_date,
            status: parse_column("status", &row.status)?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn find_by_id(&self, id: &MembershipId) -> Result<Option<Membership>, DomainError> {
        let row: Option<MembershipRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load membership", e))?;

        row.map(Membership::try_from).transpose()
    }

    async fn find_by_member(&self, member_id: &UserId) -> Result<Vec<Membership>, DomainError> {
        let rows: Vec<MembershipRow> = sqlx::query_as(&format!(
            "{} WHERE member_id = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(member_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load member's memberships", e))?;

        rows.into_iter().map(Membership::try_from).collect()
    }

    async fn find_active(&self) -> Result<Vec<Membership>, DomainError> {
        let rows: Vec<MembershipRow> =
            sqlx::query_as(&format!("{} WHERE status = 'active'", SELECT_COLUMNS))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_error("Failed to load active memberships", e))?;

        rows.into_iter().map(Membership::try_from).collect()
    }

    async fn apply_extension(&self, audit: &Compensation) -> Result<Membership, DomainError> {
        if audit.kind != CompensationKind::Extension {
            return Err(DomainError::internal("apply_extension requires an extension audit row"));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        // Increment in SQL so concurrent extensions both land.
        let row: Option<MembershipRow> = sqlx::query_as(
            r#"
            UPDATE memberships SET
                end_date = end_date + $2::integer,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, member_id, plan_id, application_id, start_date, end_date,
                      status, created_at, updated_at
            "#,
        )
        .bind(audit.membership_id.as_uuid())
        .bind(i32::try_from(audit.days).map_err(|_| {
            DomainError::invalid_argument("extra_days", "extra_days is too large")
        })?)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to extend membership", e))?;

        let membership = row
            .ok_or_else(|| DomainError::not_found("membership", audit.membership_id))?
            .try_into()?;

        sqlx::query(
            r#"
            INSERT INTO compensations (
                id, membership_id, member_id, days, reason, compensation_date,
                status, kind, granted_by, notes, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(audit.id.as_uuid())
        .bind(audit.membership_id.as_uuid())
        .bind(audit.member_id.as_str())
        .bind(audit.days)
        .bind(&audit.reason)
        .bind(audit.compensation_date)
        .bind(audit.status.as_str())
        .bind(audit.kind.as_str())
        .bind(audit.granted_by.as_str())
        .bind(&audit.notes)
        .bind(audit.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to insert extension audit row", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit extension", e))?;

        Ok(membership)
    }

    async fn mark_expired(&self, id: &MembershipId, today: NaiveDate) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        // Grants and extensions lock the same row, so once we hold it the
        // next statement's snapshot includes everything they committed.
        let locked: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM memberships WHERE id = $1 AND status = 'active' FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock membership", e))?;

        if locked.is_none() {
            return Ok(false);
        }

        let result = sqlx::query(
            r#"
            UPDATE memberships m SET status = 'expired', updated_at = NOW()
            WHERE m.id = $1
              AND m.status = 'active'
              AND m.end_date + COALESCE((
                    SELECT SUM(c.days) FROM compensations c
                    WHERE c.membership_id = m.id
                      AND c.kind = 'grant'
                      AND c.status = 'applied'
                  ), 0)::integer < $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(today)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to expire membership", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit expiry", e))?;

        Ok(result.rows_affected() == 1)
    }
}
