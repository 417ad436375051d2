//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, grouped
//! by component.

pub mod attendance;
pub mod compensation;
pub mod expiry;
pub mod membership;
pub mod plan_application;

#[cfg(test)]
pub(crate) mod testing;
