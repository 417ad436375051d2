//! PostgreSQL implementation of ApplicationRepository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{ApplicationId, DomainError, PlanId, Timestamp, UserId};
use crate::domain::membership::{Membership, Receipt};
use crate::domain::plan_application::{ApplicationStatus, Payment, PlanApplication};
use crate::ports::{AcceptedApplication, ApplicationFilter, ApplicationRepository};

use super::{db_error, parse_column, parse_user_id, violates};

const OPEN_APPLICATION_KEY: &str = "plan_applications_open_member_plan_key";

const SELECT_COLUMNS: &str = r#"
    SELECT id, member_id, plan_id, preferred_start_date, status,
           payment_amount_cents, payment_date, payment_method, reference_number,
           decided_at, created_at, updated_at
    FROM plan_applications
"#;

pub struct PostgresApplicationRepository {
    pool: PgPool,
}

impl PostgresApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    member_id: String,
    plan_id: Uuid,
    preferred_start_date: NaiveDate,
    status: String,
    payment_amount_cents: Option<i64>,
    payment_date: Option<NaiveDate>,
    payment_method: Option<String>,
    reference_number: Option<String>,
    decided_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for PlanApplication {
    type Error = DomainError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        let payment = match (row.payment_amount_cents, row.payment_date, row.payment_method) {
            (Some(amount_cents), Some(payment_date), Some(method)) => Some(Payment {
                amount_cents,
                payment_date,
                method: parse_column("payment_method", &method)?,
                reference_number: row.reference_number,
            }),
            _ => None,
        };

        Ok(PlanApplication {
            id: ApplicationId::from_uuid(row.id),
            member_id: parse_user_id("member_id", row.member_id)?,
            plan_id: PlanId::from_uuid(row.plan_id),
            preferred_start_date: row.preferred_start_date,
            status: parse_column("status", &row.status)?,
            payment,
            decided_at: row.decided_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn into_applications(rows: Vec<ApplicationRow>) -> Result<Vec<PlanApplication>, DomainError> {
    rows.into_iter().map(PlanApplication::try_from).collect()
}

async fn insert_membership(
    tx: &mut Transaction<'_, Postgres>,
    membership: &Membership,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO memberships (
            id, member_id, plan_id, application_id, start_date, end_date,
            status, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(membership.id.as_uuid())
    .bind(membership.member_id.as_str())
    .bind(membership.plan_id.as_uuid())
    .bind(membership.application_id.map(|id| *id.as_uuid()))
    .bind(membership.start_date)
    .bind(membership.end_date)
    .bind(membership.status.as_str())
    .bind(membership.created_at.as_datetime())
    .bind(membership.updated_at.as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to insert membership", e))?;
    Ok(())
}

async fn insert_receipt(
    tx: &mut Transaction<'_, Postgres>,
    receipt: &Receipt,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO receipts (
            id, application_id, membership_id, member_id, plan_id, amount_cents,
            payment_date, payment_method, reference_number, issued_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(receipt.id.as_uuid())
    .bind(receipt.application_id.as_uuid())
    .bind(receipt.membership_id.as_uuid())
    .bind(receipt.member_id.as_str())
    .bind(receipt.plan_id.as_uuid())
    .bind(receipt.amount_cents)
    .bind(receipt.payment_date)
    .bind(receipt.payment_method.as_str())
    .bind(&receipt.reference_number)
    .bind(receipt.issued_at.as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to insert receipt", e))?;
    Ok(())
}

#[async_trait]
impl ApplicationRepository for PostgresApplicationRepository {
    async fn save(&self, application: &PlanApplication) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO plan_applications (
                id, member_id, plan_id, preferred_start_date, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(application.id.as_uuid())
        .bind(application.member_id.as_str())
        .bind(application.plan_id.as_uuid())
        .bind(application.preferred_start_date)
        .bind(application.status.as_str())
        .bind(application.created_at.as_datetime())
        .bind(application.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, OPEN_APPLICATION_KEY) {
                return DomainError::conflict(
                    "An application for this plan is already pending or accepted",
                );
            }
            db_error("Failed to save application", e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<PlanApplication>, DomainError> {
        let row: Option<ApplicationRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load application", e))?;

        row.map(PlanApplication::try_from).transpose()
    }

    async fn find_open(
        &self,
        member_id: &UserId,
        plan_id: &PlanId,
    ) -> Result<Option<PlanApplication>, DomainError> {
        let row: Option<ApplicationRow> = sqlx::query_as(&format!(
            "{} WHERE member_id = $1 AND plan_id = $2 AND status IN ('pending', 'accepted')",
            SELECT_COLUMNS
        ))
        .bind(member_id.as_str())
        .bind(plan_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load open application", e))?;

        row.map(PlanApplication::try_from).transpose()
    }

    async fn record_acceptance(&self, accepted: &AcceptedApplication) -> Result<(), DomainError> {
        let application = &accepted.application;
        let payment = application
            .payment
            .as_ref()
            .ok_or_else(|| DomainError::internal("Accepted application has no payment"))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE plan_applications SET
                status = $2,
                payment_amount_cents = $3,
                payment_date = $4,
                payment_method = $5,
                reference_number = $6,
                decided_at = $7,
                updated_at = $8
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(application.id.as_uuid())
        .bind(application.status.as_str())
        .bind(payment.amount_cents)
        .bind(payment.payment_date)
        .bind(payment.method.as_str())
        .bind(&payment.reference_number)
        .bind(application.decided_at.as_ref().map(|t| *t.as_datetime()))
        .bind(application.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to update application", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::invalid_state("Application is no longer pending"));
        }

        insert_membership(&mut tx, &accepted.membership).await?;
        insert_receipt(&mut tx, &accepted.receipt).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit acceptance", e))?;

        Ok(())
    }

    async fn update_status(
        &self,
        application: &PlanApplication,
        expected: ApplicationStatus,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE plan_applications SET
                status = $2,
                decided_at = $3,
                updated_at = $4
            WHERE id = $1 AND status = $5
            "#,
        )
        .bind(application.id.as_uuid())
        .bind(application.status.as_str())
        .bind(application.decided_at.as_ref().map(|t| *t.as_datetime()))
        .bind(application.updated_at.as_datetime())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update application status", e))?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(&application.id).await? {
                Some(stored) => Err(DomainError::invalid_state(format!(
                    "Application is {}, expected {}",
                    stored.status, expected
                ))),
                None => Err(DomainError::not_found("application", application.id)),
            };
        }

        Ok(())
    }

    async fn list(&self, filter: &ApplicationFilter) -> Result<Vec<PlanApplication>, DomainError> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
            r#"{}
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR member_id = $2)
            ORDER BY created_at DESC"#,
            SELECT_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.member_id.as_ref().map(|m| m.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list applications", e))?;

        into_applications(rows)
    }

    async fn find_stale_pending(&self, today: NaiveDate) -> Result<Vec<PlanApplication>, DomainError> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
            "{} WHERE status = 'pending' AND preferred_start_date < $1 ORDER BY preferred_start_date",
            SELECT_COLUMNS
        ))
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load stale applications", e))?;

        into_applications(rows)
    }
}
