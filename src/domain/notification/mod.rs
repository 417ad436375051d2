//! User-facing notices and their dedupe markers.
//!
//! A [`Notice`] is what the member sees (title + message). A
//! [`NotificationMarker`] records that a notice of a given kind was already
//! sent for an entity, so repeated or overlapping sweeps send it once.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::MembershipId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ApplicationAccepted,
    ApplicationDeclined,
    ApplicationExpired,
    MembershipExpiringSoon,
    MembershipExpired,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ApplicationAccepted => "application_accepted",
            NotificationKind::ApplicationDeclined => "application_declined",
            NotificationKind::ApplicationExpired => "application_expired",
            NotificationKind::MembershipExpiringSoon => "membership_expiring_soon",
            NotificationKind::MembershipExpired => "membership_expired",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notice addressed to one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn application_accepted(plan_name: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            kind: NotificationKind::ApplicationAccepted,
            title: "Application Accepted".to_string(),
            message: format!(
                "Your application for {} has been accepted. Your membership runs from {} to {}.",
                plan_name, start, end
            ),
        }
    }

    pub fn application_declined(plan_name: &str) -> Self {
        Self {
            kind: NotificationKind::ApplicationDeclined,
            title: "Application Declined".to_string(),
            message: format!("Your application for {} has been declined.", plan_name),
        }
    }

    pub fn application_expired(plan_name: &str, preferred_start: NaiveDate) -> Self {
        Self {
            kind: NotificationKind::ApplicationExpired,
            title: "Application Expired".to_string(),
            message: format!(
                "Your application for {} expired because its start date ({}) passed before it was processed.",
                plan_name, preferred_start
            ),
        }
    }

    pub fn membership_expiring_soon(plan_name: &str, effective_end: NaiveDate, days_left: i64) -> Self {
        let when = match days_left {
            d if d <= 0 => "today".to_string(),
            1 => "tomorrow".to_string(),
            d => format!("in {} days", d),
        };
        Self {
            kind: NotificationKind::MembershipExpiringSoon,
            title: "Membership Expiring Soon".to_string(),
            message: format!(
                "Your {} membership ends {} (last day {}).",
                plan_name, when, effective_end
            ),
        }
    }

    pub fn membership_expired(plan_name: &str, effective_end: NaiveDate) -> Self {
        Self {
            kind: NotificationKind::MembershipExpired,
            title: "Membership Expired".to_string(),
            message: format!(
                "Your {} membership expired after {}. Apply again to renew.",
                plan_name, effective_end
            ),
        }
    }
}

/// Key recording that a notice was sent for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationMarker {
    pub entity_id: Uuid,
    pub kind: NotificationKind,
    /// Distinguishes repeat notices for the same entity and kind.
    pub discriminator: String,
}

impl NotificationMarker {
    /// Keyed by effective end date: an extension earns a fresh reminder.
    pub fn expiring_soon(membership_id: MembershipId, effective_end: NaiveDate) -> Self {
        Self {
            entity_id: *membership_id.as_uuid(),
            kind: NotificationKind::MembershipExpiringSoon,
            discriminator: effective_end.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expired_notice_has_expected_title() {
        let notice = Notice::membership_expired("Monthly", ymd(2024, 2, 4));
        assert_eq!(notice.title, "Membership Expired");
        assert_eq!(notice.kind, NotificationKind::MembershipExpired);
        assert!(notice.message.contains("2024-02-04"));
    }

    #[test]
    fn expiring_soon_wording_depends_on_days_left() {
        assert!(Notice::membership_expiring_soon("Monthly", ymd(2024, 1, 30), 0)
            .message
            .contains("today"));
        assert!(Notice::membership_expiring_soon("Monthly", ymd(2024, 1, 30), 1)
            .message
            .contains("tomorrow"));
        assert!(Notice::membership_expiring_soon("Monthly", ymd(2024, 1, 30), 3)
            .message
            .contains("in 3 days"));
    }

    #[test]
    fn expiring_soon_marker_changes_with_end_date() {
        let id = MembershipId::new();
        assert_ne!(
            NotificationMarker::expiring_soon(id, ymd(2024, 1, 30)),
            NotificationMarker::expiring_soon(id, ymd(2024, 2, 4))
        );
        assert_eq!(
            NotificationMarker::expiring_soon(id, ymd(2024, 1, 30)),
            NotificationMarker::expiring_soon(id, ymd(2024, 1, 30))
        );
    }

    #[test]
    fn kinds_render_as_snake_case() {
        assert_eq!(NotificationKind::MembershipExpiringSoon.to_string(), "membership_expiring_soon");
    }
}
