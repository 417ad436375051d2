use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde_json::Value;

use crate::config::RedisConfig;
use crate::domain::foundation::DomainError;
use crate::ports::RealtimeBus;

/// Publishes each event to `{prefix}:{event}`.
#[derive(Clone)]
pub struct RedisRealtimeBus {
    conn: MultiplexedConnection,
    channel_prefix: String,
}

impl RedisRealtimeBus {
    pub fn new(conn: MultiplexedConnection, channel_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            channel_prefix: channel_prefix.into(),
        }
    }

    /// Open a multiplexed connection, bounded by the configured timeout.
    pub async fn connect(config: &RedisConfig) -> Result<Self, DomainError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| DomainError::internal(format!("Invalid Redis URL: {}", e)))?;

        let conn = tokio::time::timeout(config.timeout(), client.get_multiplexed_tokio_connection())
            .await
            .map_err(|_| DomainError::internal("Timed out connecting to Redis"))?
            .map_err(|e| DomainError::internal(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self::new(conn, config.channel_prefix.clone()))
    }

    fn channel_for(&self, event: &str) -> String {
        channel_name(&self.channel_prefix, event)
    }
}

fn channel_name(prefix: &str, event: &str) -> String {
    if prefix.is_empty() {
        event.to_string()
    } else {
        format!("{}:{}", prefix, event)
    }
}

#[async_trait]
impl RealtimeBus for RedisRealtimeBus {
    async fn publish(&self, event: &str, payload: Value) -> Result<(), DomainError> {
        let channel = self.channel_for(event);
        let mut conn = self.conn.clone();

        let receivers: i64 = conn
            .publish(&channel, payload.to_string())
            .await
            .map_err(|e| DomainError::internal(format!("Redis publish failed: {}", e)))?;

        tracing::debug!(channel = %channel, receivers, "Published realtime event");
        Ok(())
    }
}

/// Stand-in bus that only logs.
#[derive(Debug, Clone, Default)]
pub struct LoggingRealtimeBus;

#[async_trait]
impl RealtimeBus for LoggingRealtimeBus {
    async fn publish(&self, event: &str, payload: Value) -> Result<(), DomainError> {
        tracing::debug!(event, payload = %payload, "Realtime event (no bus configured)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_is_prefixed() {
        assert_eq!(channel_name("gymdesk", "notification"), "gymdesk:notification");
    }

    #[test]
    fn empty_prefix_uses_bare_event_name() {
        assert_eq!(channel_name("", "notification"), "notification");
    }

    #[tokio::test]
    async fn logging_bus_accepts_events() {
        let bus = LoggingRealtimeBus;
        bus.publish("notification", serde_json::json!({"user_id": "member-1"}))
            .await
            .unwrap();
    }
}
