//! Best-effort notifier.
//!
//! Delivers a [`Notice`] through the notification channel and mirrors it on
//! the realtime bus. Failures are logged and reported as `false`; they never
//! surface as the caller's error.

use serde_json::json;
use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::notification::Notice;
use crate::ports::{events, NotificationChannel, RealtimeBus};

#[derive(Clone)]
pub struct Notifier {
    channel: Arc<dyn NotificationChannel>,
    bus: Arc<dyn RealtimeBus>,
}

impl Notifier {
    pub fn new(channel: Arc<dyn NotificationChannel>, bus: Arc<dyn RealtimeBus>) -> Self {
        Self { channel, bus }
    }

    /// Returns whether the channel accepted the notice. The realtime push
    /// does not affect the result.
    pub async fn notify(&self, user_id: &UserId, notice: &Notice) -> bool {
        let delivered = match self.channel.send(user_id, notice).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    kind = %notice.kind,
                    error = %e,
                    "Notification delivery failed"
                );
                false
            }
        };

        let payload = json!({
            "user_id": user_id.as_str(),
            "kind": notice.kind.as_str(),
            "title": notice.title,
            "message": notice.message,
        });
        if let Err(e) = self.bus.publish(events::NOTIFICATION, payload).await {
            tracing::warn!(user_id = %user_id, error = %e, "Realtime publish failed");
        }

        delivered
    }
}
