//! Membership plan status state machine.

use crate::domain::foundation::{DomainError, StateMachine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Created but not yet granting access.
    Pending,

    /// Grants access between start date and effective end date.
    Active,

    /// Past its effective end date. Terminal.
    Expired,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Pending => "pending",
            PlanStatus::Active => "active",
            PlanStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PlanStatus::Pending),
            "active" => Ok(PlanStatus::Active),
            "expired" => Ok(PlanStatus::Expired),
            other => Err(DomainError::internal(format!("Invalid plan status value: {}", other))),
        }
    }
}

impl StateMachine for PlanStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PlanStatus::*;
        matches!(
            (self, target),
            (Pending, Active) | (Pending, Expired) | (Active, Expired)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PlanStatus::*;
        match self {
            Pending => vec![Active, Expired],
            Active => vec![Expired],
            Expired => vec![],
        }
    }
}
