//! PostgreSQL implementation of NotificationMarkers.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::domain::notification::NotificationMarker;
use crate::ports::NotificationMarkers;

use super::db_error;

pub struct PostgresNotificationMarkers {
    pool: PgPool,
}

impl PostgresNotificationMarkers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationMarkers for PostgresNotificationMarkers {
    async fn claim(&self, marker: &NotificationMarker) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO notification_markers (entity_id, kind, discriminator)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(marker.entity_id)
        .bind(marker.kind.as_str())
        .bind(&marker.discriminator)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to claim notification marker", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn release(&self, marker: &NotificationMarker) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            DELETE FROM notification_markers
            WHERE entity_id = $1 AND kind = $2 AND discriminator = $3
            "#,
        )
        .bind(marker.entity_id)
        .bind(marker.kind.as_str())
        .bind(&marker.discriminator)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to release notification marker", e))?;

        Ok(())
    }
}
