//! Notification delivery port.
//!
//! Persists an in-app notification for a user and may fan out to other
//! channels (email). Callers treat failures as non-fatal.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::notification::Notice;

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Deliver `notice` to `user_id`.
    async fn send(&self, user_id: &UserId, notice: &Notice) -> Result<(), DomainError>;
}
