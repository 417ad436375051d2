//! Plan application status state machine.

use crate::domain::foundation::{DomainError, StateMachine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a member's request to subscribe to a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Awaiting an admin decision.
    Pending,

    /// Paid and turned into a membership.
    Accepted,

    /// Rejected by an admin.
    Declined,

    /// Preferred start date passed while still pending.
    Expired,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Declined => "declined",
            ApplicationStatus::Expired => "expired",
        }
    }

    /// Pending and accepted applications block a new submission for the
    /// same (member, plan).
    pub fn blocks_resubmission(&self) -> bool {
        matches!(self, ApplicationStatus::Pending | ApplicationStatus::Accepted)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "declined" => Ok(ApplicationStatus::Declined),
            "expired" => Ok(ApplicationStatus::Expired),
            other => Err(DomainError::invalid_argument(
                "status",
                format!("Unknown application status: {}", other),
            )),
        }
    }
}

impl StateMachine for ApplicationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, target),
            (Pending, Accepted) | (Pending, Declined) | (Pending, Expired)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ApplicationStatus::*;
        match self {
            Pending => vec![Accepted, Declined, Expired],
            Accepted | Declined | Expired => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_is_the_only_non_terminal_state() {
        assert!(!ApplicationStatus::Pending.is_terminal());
        assert!(ApplicationStatus::Accepted.is_terminal());
        assert!(ApplicationStatus::Declined.is_terminal());
        assert!(ApplicationStatus::Expired.is_terminal());
    }

    #[test]
    fn accepted_cannot_be_declined() {
        assert!(ApplicationStatus::Accepted
            .transition_to(ApplicationStatus::Declined)
            .is_err());
    }

    #[test]
    fn only_pending_and_accepted_block_resubmission() {
        assert!(ApplicationStatus::Pending.blocks_resubmission());
        assert!(ApplicationStatus::Accepted.blocks_resubmission());
        assert!(!ApplicationStatus::Declined.blocks_resubmission());
        assert!(!ApplicationStatus::Expired.blocks_resubmission());
    }

    #[test]
    fn unknown_filter_value_is_invalid_argument() {
        let err = "archived".parse::<ApplicationStatus>().unwrap_err();
        assert_eq!(err.code, crate::domain::foundation::ErrorCode::InvalidArgument);
    }
}
