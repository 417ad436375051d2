//! CheckInHandler - Plain member check-in.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::application::handlers::membership::MembershipLedger;
use crate::domain::attendance::Attendance;
use crate::domain::foundation::{BusinessCalendar, DomainError, UserId};
use crate::domain::membership::Membership;
use crate::ports::{AttendanceRepository, Clock};

#[derive(Debug, Clone)]
pub struct CheckInCommand {
    pub member_id: UserId,
}

#[derive(Debug, Clone)]
pub struct CheckInResult {
    pub attendance: Attendance,
}

pub struct CheckInHandler {
    ledger: MembershipLedger,
    attendance: Arc<dyn AttendanceRepository>,
    clock: Arc<dyn Clock>,
    calendar: BusinessCalendar,
}

impl CheckInHandler {
    pub fn new(
        ledger: MembershipLedger,
        attendance: Arc<dyn AttendanceRepository>,
        clock: Arc<dyn Clock>,
        calendar: BusinessCalendar,
    ) -> Self {
        Self {
            ledger,
            attendance,
            clock,
            calendar,
        }
    }

    /// # Errors
    ///
    /// - `Forbidden` without a membership active today
    /// - `Conflict` if today's row already exists
    pub async fn handle(&self, cmd: CheckInCommand) -> Result<CheckInResult, DomainError> {
        let now = self.clock.now();
        let today = self.calendar.date_of(&now);

        require_active_membership(&self.ledger, &cmd.member_id, today).await?;

        if self.attendance.find_for_date(&cmd.member_id, today).await?.is_some() {
            return Err(DomainError::conflict("Already checked in today"));
        }

        let attendance = Attendance::check_in(cmd.member_id, today, now);
        self.attendance.insert_check_in(&attendance).await?;

        tracing::info!(
            attendance_id = %attendance.id,
            member_id = %attendance.member_id,
            date = %today,
            "Member checked in"
        );

        Ok(CheckInResult { attendance })
    }
}

pub(super) async fn require_active_membership(
    ledger: &MembershipLedger,
    member_id: &UserId,
    today: NaiveDate,
) -> Result<Membership, DomainError> {
    ledger
        .get_active_membership(member_id, today)
        .await?
        .ok_or_else(|| {
            DomainError::forbidden("No active membership").with_detail("member_id", member_id.as_str())
        })
}
