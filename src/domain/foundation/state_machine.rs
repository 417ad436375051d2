//! State machine trait for lifecycle status enums.
//!
//! Application, membership and attendance statuses implement this trait so
//! every transition is checked against one table of allowed moves.

use super::DomainError;

/// Trait for status enums that represent state machines.
///
/// Implementors define valid state transitions and get validated
/// transition methods for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for ApplicationStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Pending, Accepted) | (Pending, Declined))
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Pending => vec![Accepted, Declined],
///             _ => vec![],
///         }
///     }
/// }
///
/// let next = current.transition_to(ApplicationStatus::Accepted)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the move is not in the transition table.
    fn transition_to(&self, target: Self) -> Result<Self, DomainError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(DomainError::invalid_state(format!(
                "Cannot transition from {:?} to {:?}",
                self, target
            ))
            .with_detail("current", format!("{:?}", self))
            .with_detail("attempted", format!("{:?}", target)))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum DoorState {
        Closed,
        Open,
        Locked,
    }

    impl StateMachine for DoorState {
        fn can_transition_to(&self, target: &Self) -> bool {
            use DoorState::*;
            matches!((self, target), (Closed, Open) | (Open, Closed) | (Closed, Locked))
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use DoorState::*;
            match self {
                Closed => vec![Open, Locked],
                Open => vec![Closed],
                Locked => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert_eq!(DoorState::Closed.transition_to(DoorState::Open).unwrap(), DoorState::Open);
    }

    #[test]
    fn transition_to_fails_with_invalid_state() {
        let err = DoorState::Open.transition_to(DoorState::Locked).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(err.details.get("current"), Some(&"Open".to_string()));
    }

    #[test]
    fn is_terminal_reflects_transition_table() {
        assert!(DoorState::Locked.is_terminal());
        assert!(!DoorState::Closed.is_terminal());
    }
}
