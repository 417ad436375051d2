//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the state machine trait and error
//! types that form the vocabulary of the membership domain.

mod calendar;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use calendar::{add_days, BusinessCalendar};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    ApplicationId, AttendanceId, CompensationId, MembershipId, PlanId, ReceiptId, UserId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
