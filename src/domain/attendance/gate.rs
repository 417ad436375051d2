//! Scan state machine for the door.
//!
//! Per (member, date): `no-record -> checked-in -> checked-out`.
//!
//! A scan on a checked-in record only closes it once the minimum dwell
//! interval has elapsed since check-in (boundary inclusive), so an accidental
//! double scan at the door cannot toggle state.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, StateMachine, Timestamp};

use super::Attendance;

/// Default minimum dwell between check-in and a scan check-out.
pub const DEFAULT_MIN_DWELL_MINUTES: i64 = 30;

/// Door state derived from today's attendance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    NoRecord,
    CheckedIn,
    CheckedOut,
}

impl AttendanceState {
    pub fn of(record: Option<&Attendance>) -> Self {
        match record {
            None => AttendanceState::NoRecord,
            Some(r) if r.is_open() => AttendanceState::CheckedIn,
            Some(_) => AttendanceState::CheckedOut,
        }
    }
}

impl StateMachine for AttendanceState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use AttendanceState::*;
        matches!((self, target), (NoRecord, CheckedIn) | (CheckedIn, CheckedOut))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use AttendanceState::*;
        match self {
            NoRecord => vec![CheckedIn],
            CheckedIn => vec![CheckedOut],
            CheckedOut => vec![],
        }
    }
}

/// Minimum dwell interval policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellPolicy {
    min_dwell: Duration,
}

impl DwellPolicy {
    pub fn from_minutes(minutes: i64) -> Self {
        Self {
            min_dwell: Duration::minutes(minutes.max(0)),
        }
    }

    pub fn min_dwell(&self) -> Duration {
        self.min_dwell
    }

    /// Earliest instant a scan may check out a record opened at `time_in`.
    pub fn earliest_check_out(&self, time_in: &Timestamp) -> Timestamp {
        Timestamp::from_datetime(*time_in.as_datetime() + self.min_dwell)
    }

    /// # Errors
    ///
    /// `RateLimited` with the remaining wait when `now` is before the
    /// earliest check-out instant.
    pub fn ensure_dwell_elapsed(&self, time_in: &Timestamp, now: &Timestamp) -> Result<(), DomainError> {
        let earliest = self.earliest_check_out(time_in);
        if !now.is_before(&earliest) {
            return Ok(());
        }

        let remaining = earliest.duration_since(now);
        let secs = remaining.num_seconds() + i64::from(remaining.num_milliseconds() % 1000 != 0);
        let minutes = (secs + 59) / 60;
        Err(DomainError::rate_limited(
            format!(
                "Checked in less than {} minutes ago; wait {} more minute(s) before checking out",
                self.min_dwell.num_minutes(),
                minutes
            ),
            secs,
        )
        .with_detail("earliest_at", earliest.as_datetime().to_rfc3339()))
    }
}

impl Default for DwellPolicy {
    fn default() -> Self {
        Self::from_minutes(DEFAULT_MIN_DWELL_MINUTES)
    }
}

/// What a scan should do given today's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanAction {
    /// No row yet: check in (subject to an active membership).
    CheckIn,
    /// Open row whose dwell interval has elapsed: check out.
    CheckOut,
}

/// Decides a scan against today's row.
///
/// # Errors
///
/// - `RateLimited` if checked in and the dwell interval has not elapsed
/// - `Conflict` if already checked out today
pub fn decide_scan(
    today: Option<&Attendance>,
    policy: &DwellPolicy,
    now: &Timestamp,
) -> Result<ScanAction, DomainError> {
    match (AttendanceState::of(today), today) {
        (AttendanceState::NoRecord, _) => Ok(ScanAction::CheckIn),
        (AttendanceState::CheckedIn, Some(record)) => {
            policy.ensure_dwell_elapsed(&record.time_in, now)?;
            Ok(ScanAction::CheckOut)
        }
        _ => Err(DomainError::conflict("Already checked out today")),
    }
}
