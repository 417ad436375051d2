//! Attendance repository port.
//!
//! `insert_check_in` is an atomic insert-or-fail on (member, date). Two
//! concurrent scans for the same member cannot both create a row; the loser
//! gets `Conflict`.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::attendance::Attendance;
use crate::domain::foundation::{AttendanceId, DomainError, Timestamp, UserId};

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// # Errors
    ///
    /// - `Conflict` if a row already exists for (member, date)
    async fn insert_check_in(&self, attendance: &Attendance) -> Result<(), DomainError>;

    async fn find_for_date(
        &self,
        member_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, DomainError>;

    /// Set `time_out` if still null. Returns the closed row, or `None` if it
    /// was already closed (or does not exist).
    async fn record_check_out(
        &self,
        id: &AttendanceId,
        at: Timestamp,
    ) -> Result<Option<Attendance>, DomainError>;

    /// A member's rows, newest date first.
    async fn list_for_member(
        &self,
        member_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Attendance>, DomainError>;
}
