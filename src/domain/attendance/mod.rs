//! Attendance domain module.
//!
//! - `record` - Attendance row and its status
//! - `gate` - Door state machine, dwell policy and scan decision

mod gate;
mod record;

pub use gate::{
    decide_scan, AttendanceState, DwellPolicy, ScanAction, DEFAULT_MIN_DWELL_MINUTES,
};
pub use record::{Attendance, AttendanceStatus};
