//! Realtime push port.
//!
//! Fire-and-forget fan-out to connected dashboards. No delivery guarantee;
//! subscribers that are offline simply miss the event.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::DomainError;

/// Event names published on the bus.
pub mod events {
    /// Payload: `{user_id, kind, title, message}`.
    pub const NOTIFICATION: &str = "notification";
}

#[async_trait]
pub trait RealtimeBus: Send + Sync {
    async fn publish(&self, event: &str, payload: Value) -> Result<(), DomainError>;
}
