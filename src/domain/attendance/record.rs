//! Attendance row: one per (member, calendar date).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{AttendanceId, DomainError, Timestamp, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Invalid,
    Expired,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Invalid => "invalid",
            AttendanceStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "invalid" => Ok(AttendanceStatus::Invalid),
            "expired" => Ok(AttendanceStatus::Expired),
            other => Err(DomainError::internal(format!(
                "Invalid attendance status value: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: AttendanceId,
    pub member_id: UserId,
    /// Business-calendar date of the check-in.
    pub date: NaiveDate,
    pub time_in: Timestamp,
    pub time_out: Option<Timestamp>,
    pub status: AttendanceStatus,
}

impl Attendance {
    /// Opens today's record.
    pub fn check_in(member_id: UserId, date: NaiveDate, at: Timestamp) -> Self {
        Self {
            id: AttendanceId::new(),
            member_id,
            date,
            time_in: at,
            time_out: None,
            status: AttendanceStatus::Present,
        }
    }

    pub fn is_open(&self) -> bool {
        self.time_out.is_none()
    }

    /// Closes the record.
    ///
    /// # Errors
    ///
    /// `Conflict` if already checked out, `InvalidArgument` if `at` is
    /// before the check-in time.
    pub fn check_out(&mut self, at: Timestamp) -> Result<(), DomainError> {
        if !self.is_open() {
            return Err(DomainError::conflict("Already checked out today"));
        }
        if at.is_before(&self.time_in) {
            return Err(DomainError::invalid_argument(
                "time_out",
                "Check-out cannot precede check-in",
            ));
        }
        self.time_out = Some(at);
        Ok(())
    }
}
