//! PostgreSQL implementation of AttendanceRepository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::attendance::Attendance;
use crate::domain::foundation::{AttendanceId, DomainError, Timestamp, UserId};
use crate::ports::AttendanceRepository;

use super::{db_error, parse_column, parse_user_id, violates};

const MEMBER_DATE_KEY: &str = "attendance_member_date_key";

pub struct PostgresAttendanceRepository {
    pool: PgPool,
}

impl PostgresAttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AttendanceRow {
    id: Uuid,
    member_id: String,
    date: NaiveDate,
    time_in: DateTime<Utc>,
    time_out: Option<DateTime<Utc>>,
    status: String,
}

impl TryFrom<AttendanceRow> for Attendance {
    type Error = DomainError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(Attendance {
            id: AttendanceId::from_uuid(row.id),
            member_id: parse_user_id("member_id", row.member_id)?,
            date: row.date,
            time_in: Timestamp::from_datetime(row.time_in),
            time_out: row.time_out.map(Timestamp::from_datetime),
            status: parse_column("status", &row.status)?,
        })
    }
}

#[async_trait]
impl AttendanceRepository for PostgresAttendanceRepository {
    async fn insert_check_in(&self, attendance: &Attendance) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO attendance (id, member_id, date, time_in, time_out, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(attendance.id.as_uuid())
        .bind(attendance.member_id.as_str())
        .bind(attendance.date)
        .bind(attendance.time_in.as_datetime())
        .bind(attendance.time_out.as_ref().map(|t| *t.as_datetime()))
        .bind(attendance.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, MEMBER_DATE_KEY) {
                DomainError::conflict("Already checked in today")
            } else {
                db_error("Failed to insert attendance", e)
            }
        })?;

        Ok(())
    }

    async fn find_for_date(
        &self,
        member_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, DomainError> {
        let row: Option<AttendanceRow> = sqlx::query_as(
            r#"
            SELECT id, member_id, date, time_in, time_out, status
            FROM attendance
            WHERE member_id = $1 AND date = $2
            "#,
        )
        .bind(member_id.as_str())
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load attendance", e))?;

        row.map(Attendance::try_from).transpose()
    }

    async fn record_check_out(
        &self,
        id: &AttendanceId,
        at: Timestamp,
    ) -> Result<Option<Attendance>, DomainError> {
        let row: Option<AttendanceRow> = sqlx::query_as(
            r#"
            UPDATE attendance SET time_out = $2
            WHERE id = $1 AND time_out IS NULL
            RETURNING id, member_id, date, time_in, time_out, status
            "#,
        )
        .bind(id.as_uuid())
        .bind(at.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to record check-out", e))?;

        row.map(Attendance::try_from).transpose()
    }

    async fn list_for_member(
        &self,
        member_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Attendance>, DomainError> {
        let rows: Vec<AttendanceRow> = sqlx::query_as(
            r#"
            SELECT id, member_id, date, time_in, time_out, status
            FROM attendance
            WHERE member_id = $1
            ORDER BY date DESC
            LIMIT $2
            "#,
        )
        .bind(member_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list attendance", e))?;

        rows.into_iter().map(Attendance::try_from).collect()
    }
}
