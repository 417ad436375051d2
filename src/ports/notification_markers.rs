//! Notification dedupe markers.
//!
//! The sweep claims a marker before sending a reminder. `claim` must be an
//! atomic insert-if-absent so two overlapping sweeps cannot both win.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::notification::NotificationMarker;

#[async_trait]
pub trait NotificationMarkers: Send + Sync {
    /// Returns `true` if the marker was newly recorded, `false` if it
    /// already existed.
    async fn claim(&self, marker: &NotificationMarker) -> Result<bool, DomainError>;

    /// Remove a claimed marker so a later sweep can retry.
    async fn release(&self, marker: &NotificationMarker) -> Result<(), DomainError>;
}
