//! gymdesk - Gym membership lifecycle and attendance gating
//!
//! Members apply for plans, admins accept with payment details, and the
//! resulting memberships gate door scans. Admins can grant compensation days
//! or extend a membership outright. A periodic sweep reminds members before
//! their effective end date, expires lapsed memberships and closes stale
//! applications.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
