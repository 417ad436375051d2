//! In-app notification inbox, with an optional email copy.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::adapters::email::ResendEmailSender;
use crate::domain::foundation::{DomainError, UserId};
use crate::domain::notification::Notice;
use crate::ports::{NotificationChannel, UserDirectory};

use super::db_error;

pub struct PostgresNotificationChannel {
    pool: PgPool,
    email: Option<EmailCopy>,
}

struct EmailCopy {
    sender: Arc<ResendEmailSender>,
    directory: Arc<dyn UserDirectory>,
}

impl PostgresNotificationChannel {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, email: None }
    }

    /// Also mail each notice to the member's directory address.
    pub fn with_email(
        mut self,
        sender: Arc<ResendEmailSender>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        self.email = Some(EmailCopy { sender, directory });
        self
    }

    async fn send_email_copy(&self, copy: &EmailCopy, user_id: &UserId, notice: &Notice) {
        let address = match copy.directory.lookup(user_id).await {
            Ok(Some(entry)) => entry.email,
            Ok(None) => {
                tracing::warn!(user_id = %user_id, "No directory entry; skipping email copy");
                return;
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Directory lookup failed; skipping email copy");
                return;
            }
        };

        if let Err(e) = copy.sender.send(&address, &notice.title, &notice.message).await {
            tracing::warn!(
                user_id = %user_id,
                kind = %notice.kind,
                error = %e,
                "Email copy of notification failed"
            );
        }
    }
}

#[async_trait]
impl NotificationChannel for PostgresNotificationChannel {
    async fn send(&self, user_id: &UserId, notice: &Notice) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, message)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id.as_str())
        .bind(notice.kind.as_str())
        .bind(&notice.title)
        .bind(&notice.message)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to store notification", e))?;

        if let Some(copy) = &self.email {
            self.send_email_copy(copy, user_id, notice).await;
        }

        Ok(())
    }
}
