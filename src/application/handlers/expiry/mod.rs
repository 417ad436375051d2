//! Expiry scheduler handler.
//!
//! The sweep is an explicitly invoked function; scheduling it (cron, a
//! timer, a manual run) is the caller's concern.

mod run_expiry_sweep;

pub use run_expiry_sweep::{
    RunExpirySweepCommand, RunExpirySweepHandler, SweepReport, DEFAULT_EXPIRING_SOON_DAYS,
};
