//! Membership handlers.
//!
//! [`MembershipLedger`] owns effective-end-date computation, the active
//! membership lookup and the expiry transition. Extension is a command of
//! its own because it writes.

mod extend_membership;
mod get_membership;
mod ledger;

pub use ledger::{MembershipLedger, MembershipView};

// Commands
pub use extend_membership::{
    ExtendMembershipCommand, ExtendMembershipHandler, ExtendMembershipResult,
};

// Queries
pub use get_membership::{GetMembershipHandler, GetMembershipQuery, GetMembershipResult};
