//! Membership domain module.
//!
//! Handles the plan catalog, membership lifecycle, compensation grants and
//! receipts.
//!
//! # Module Structure
//!
//! - `plan` - Plan catalog entry
//! - `status` - PlanStatus state machine
//! - `aggregate` - Membership aggregate and effective-end-date arithmetic
//! - `compensation` - Extra-day grants and extension audit rows
//! - `receipt` - Payment receipt

mod aggregate;
mod compensation;
mod plan;
mod receipt;
mod status;

pub use aggregate::Membership;
pub use compensation::{
    applied_bonus_days, validate_days, Compensation, CompensationKind, CompensationStatus,
    MAX_COMPENSATION_DAYS,
};
pub use plan::Plan;
pub use receipt::Receipt;
pub use status::PlanStatus;
