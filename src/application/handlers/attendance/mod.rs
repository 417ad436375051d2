//! Attendance handlers.
//!
//! ## Commands
//! - Plain check-in and check-out by member ID
//! - Door scan by member code (check-in or check-out)
//!
//! ## Queries
//! - Attendance history for a member

mod check_in;
mod check_out;
mod list_attendance;
mod scan;

// Commands
pub use check_in::{CheckInCommand, CheckInHandler, CheckInResult};
pub use check_out::{CheckOutCommand, CheckOutHandler, CheckOutResult};
pub use scan::{ScanCommand, ScanHandler, ScanResult};

// Queries
pub use list_attendance::{ListAttendanceHandler, ListAttendanceQuery, ListAttendanceResult};
