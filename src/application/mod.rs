//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers write; query handlers and the [`MembershipLedger`]
//! read. Notifications are sent after the owning write commits and never
//! fail it.

pub mod handlers;
mod notifier;

pub use handlers::expiry::{RunExpirySweepCommand, RunExpirySweepHandler, SweepReport};
pub use handlers::membership::{MembershipLedger, MembershipView};
pub use notifier::Notifier;
