//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, calendar, state machine)
//! - `membership` - Plans, memberships, compensation and receipts
//! - `plan_application` - Subscription requests and payment capture
//! - `attendance` - Check-in/out rows and the scan state machine
//! - `notification` - Member-facing notices and dedupe markers

pub mod attendance;
pub mod foundation;
pub mod membership;
pub mod notification;
pub mod plan_application;
