//! Recording notification channel and realtime bus.
//!
//! Both keep everything they are given so tests can assert on deliveries,
//! and can be told to fail for specific users or wholesale.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::notification::{Notice, NotificationKind};
use crate::ports::{NotificationChannel, RealtimeBus};

#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationChannel {
    sent: Arc<Mutex<Vec<(UserId, Notice)>>>,
    failing_users: Arc<Mutex<HashSet<UserId>>>,
}

impl RecordingNotificationChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_for(&self, user_id: UserId) {
        self.failing_users.lock().await.insert(user_id);
    }

    pub async fn sent(&self) -> Vec<(UserId, Notice)> {
        self.sent.lock().await.clone()
    }

    pub async fn count_of(&self, kind: NotificationKind) -> usize {
        self.sent.lock().await.iter().filter(|(_, n)| n.kind == kind).count()
    }
}

#[async_trait]
impl NotificationChannel for RecordingNotificationChannel {
    async fn send(&self, user_id: &UserId, notice: &Notice) -> Result<(), DomainError> {
        if self.failing_users.lock().await.contains(user_id) {
            return Err(DomainError::internal(format!(
                "Delivery to {} failed",
                user_id
            )));
        }
        self.sent.lock().await.push((user_id.clone(), notice.clone()));
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingRealtimeBus {
    published: Arc<Mutex<Vec<(String, Value)>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingRealtimeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }

    pub async fn published(&self) -> Vec<(String, Value)> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl RealtimeBus for RecordingRealtimeBus {
    async fn publish(&self, event: &str, payload: Value) -> Result<(), DomainError> {
        if *self.failing.lock().await {
            return Err(DomainError::internal("Realtime bus unavailable"));
        }
        self.published.lock().await.push((event.to_string(), payload));
        Ok(())
    }
}
