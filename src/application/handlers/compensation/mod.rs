//! Compensation handlers.
//!
//! ## Commands
//! - Granting bonus days to one membership
//! - Granting the same bonus days to many memberships, all or nothing
//!
//! ## Queries
//! - Grant history for a membership, with actors resolved

mod bulk_grant_compensation;
mod compensation_history;
mod grant_compensation;

// Commands
pub use bulk_grant_compensation::{
    BulkGrantCompensationCommand, BulkGrantCompensationHandler, BulkGrantCompensationResult,
};
pub use grant_compensation::{
    GrantCompensationCommand, GrantCompensationHandler, GrantCompensationResult,
};

// Queries
pub use compensation_history::{
    CompensationEntry, CompensationHistoryHandler, CompensationHistoryQuery,
    CompensationHistoryResult,
};
