//! Read-only lookups against tables owned by other systems.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, PlanId, Timestamp, UserId};
use crate::domain::membership::Plan;
use crate::ports::{DirectoryEntry, PlanCatalog, UserDirectory};

use super::{db_error, parse_column, parse_user_id};

pub struct PostgresPlanCatalog {
    pool: PgPool,
}

impl PostgresPlanCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    name: String,
    price_cents: i64,
    duration_days: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<PlanRow> for Plan {
    fn from(row: PlanRow) -> Self {
        Plan {
            id: PlanId::from_uuid(row.id),
            name: row.name,
            price_cents: row.price_cents,
            duration_days: row.duration_days,
            is_active: row.is_active,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[async_trait]
impl PlanCatalog for PostgresPlanCatalog {
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(
            r#"
            SELECT id, name, price_cents, duration_days, is_active, created_at
            FROM plans
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load plan", e))?;

        Ok(row.map(Plan::from))
    }
}

pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    role: String,
    display_name: Option<String>,
    member_code: Option<String>,
}

impl TryFrom<UserRow> for DirectoryEntry {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(DirectoryEntry {
            user_id: parse_user_id("id", row.id)?,
            email: row.email,
            role: parse_column("role", &row.role)?,
            display_name: row.display_name,
            member_code: row.member_code,
        })
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn lookup(&self, user_id: &UserId) -> Result<Option<DirectoryEntry>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, role, display_name, member_code FROM users WHERE id = $1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to look up user", e))?;

        row.map(DirectoryEntry::try_from).transpose()
    }

    async fn find_by_member_code(&self, code: &str) -> Result<Option<DirectoryEntry>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, role, display_name, member_code FROM users WHERE member_code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to look up member code", e))?;

        row.map(DirectoryEntry::try_from).transpose()
    }
}
