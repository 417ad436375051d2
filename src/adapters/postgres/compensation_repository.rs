//! PostgreSQL implementation of CompensationRepository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{CompensationId, DomainError, MembershipId, Timestamp};
use crate::domain::membership::Compensation;
use crate::ports::CompensationRepository;

use super::{db_error, parse_column, parse_user_id};

pub struct PostgresCompensationRepository {
    pool: PgPool,
}

impl PostgresCompensationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CompensationRow {
    id: Uuid,
    membership_id: Uuid,
    member_id: String,
    days: i64,
    reason: String,
    compensation_date: NaiveDate,
    status: String,
    kind: String,
    granted_by: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CompensationRow> for Compensation {
    type Error = DomainError;

    fn try_from(row: CompensationRow) -> Result<Self, Self::Error> {
        Ok(Compensation {
            id: CompensationId::from_uuid(row.id),
            membership_id: MembershipId::from_uuid(row.membership_id),
            member_id: parse_user_id("member_id", row.member_id)?,
            days: row.days,
            reason: row.reason,
            compensation_date: row.compensation_date,
            status: parse_column("status", &row.status)?,
            kind: parse_column("kind", &row.kind)?,
            granted_by: parse_user_id("granted_by", row.granted_by)?,
            notes: row.notes,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl CompensationRepository for PostgresCompensationRepository {
    async fn save_grants(&self, grants: &[Compensation]) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        for grant in grants {
            // Insert only while the membership is active; the row lock taken
            // by the subquery holds off a concurrent expiry until commit.
            let result = sqlx::query(
                r#"
                INSERT INTO compensations (
                    id, membership_id, member_id, days, reason, compensation_date,
                    status, kind, granted_by, notes, created_at
                )
                SELECT $1, m.id, $3, $4, $5, $6, $7, $8, $9, $10, $11
                FROM (
                    SELECT id FROM memberships
                    WHERE id = $2 AND status = 'active'
                    FOR UPDATE
                ) m
                "#,
            )
            .bind(grant.id.as_uuid())
            .bind(grant.membership_id.as_uuid())
            .bind(grant.member_id.as_str())
            .bind(grant.days)
            .bind(&grant.reason)
            .bind(grant.compensation_date)
            .bind(grant.status.as_str())
            .bind(grant.kind.as_str())
            .bind(grant.granted_by.as_str())
            .bind(&grant.notes)
            .bind(grant.created_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert compensation", e))?;

            if result.rows_affected() == 0 {
                return Err(DomainError::conflict(format!(
                    "Membership {} is not active",
                    grant.membership_id
                )));
            }
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit compensation", e))?;

        Ok(())
    }

    async fn applied_bonus_days(&self, membership_id: &MembershipId) -> Result<i64, DomainError> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(days)::bigint FROM compensations
            WHERE membership_id = $1 AND status = 'applied' AND kind = 'grant'
            "#,
        )
        .bind(membership_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to sum compensation days", e))?;

        Ok(total.unwrap_or(0))
    }

    async fn history(&self, membership_id: &MembershipId) -> Result<Vec<Compensation>, DomainError> {
        let rows: Vec<CompensationRow> = sqlx::query_as(
            r#"
            SELECT id, membership_id, member_id, days, reason, compensation_date,
                   status, kind, granted_by, notes, created_at
            FROM compensations
            WHERE membership_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(membership_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load compensation history", e))?;

        rows.into_iter().map(Compensation::try_from).collect()
    }
}
