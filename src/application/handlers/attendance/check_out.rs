//! CheckOutHandler - Plain member check-out.

use std::sync::Arc;

use crate::domain::attendance::Attendance;
use crate::domain::foundation::{BusinessCalendar, DomainError, UserId};
use crate::ports::{AttendanceRepository, Clock};

#[derive(Debug, Clone)]
pub struct CheckOutCommand {
    pub member_id: UserId,
}

#[derive(Debug, Clone)]
pub struct CheckOutResult {
    pub attendance: Attendance,
}

/// Closes today's open row. The dwell interval applies only to door scans.
pub struct CheckOutHandler {
    attendance: Arc<dyn AttendanceRepository>,
    clock: Arc<dyn Clock>,
    calendar: BusinessCalendar,
}

impl CheckOutHandler {
    pub fn new(
        attendance: Arc<dyn AttendanceRepository>,
        clock: Arc<dyn Clock>,
        calendar: BusinessCalendar,
    ) -> Self {
        Self {
            attendance,
            clock,
            calendar,
        }
    }

    /// # Errors
    ///
    /// `Conflict` if there is no open row for today.
    pub async fn handle(&self, cmd: CheckOutCommand) -> Result<CheckOutResult, DomainError> {
        let now = self.clock.now();
        let today = self.calendar.date_of(&now);

        let mut record = self
            .attendance
            .find_for_date(&cmd.member_id, today)
            .await?
            .ok_or_else(|| DomainError::conflict("Not checked in today"))?;
        record.check_out(now)?;

        let attendance = self
            .attendance
            .record_check_out(&record.id, now)
            .await?
            .ok_or_else(|| DomainError::conflict("Already checked out today"))?;

        tracing::info!(
            attendance_id = %attendance.id,
            member_id = %attendance.member_id,
            "Member checked out"
        );

        Ok(CheckOutResult { attendance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{at, member, ymd, Fixture};
    use crate::domain::foundation::ErrorCode;

    fn handler(fx: &Fixture) -> CheckOutHandler {
        CheckOutHandler::new(Arc::new(fx.store.clone()), Arc::new(fx.clock.clone()), fx.calendar)
    }

    #[tokio::test]
    async fn closes_open_record() {
        let fx = Fixture::new().await;
        let row = Attendance::check_in(member(), ymd(2024, 1, 1), at(2024, 1, 1, 8, 0));
        fx.store.insert_check_in(&row).await.unwrap();

        let result = handler(&fx)
            .handle(CheckOutCommand { member_id: member() })
            .await
            .unwrap();
        assert_eq!(result.attendance.time_out, Some(at(2024, 1, 1, 9, 0)));
    }

    #[tokio::test]
    async fn without_record_conflicts() {
        let fx = Fixture::new().await;
        let err = handler(&fx)
            .handle(CheckOutCommand { member_id: member() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn twice_conflicts() {
        let fx = Fixture::new().await;
        let row = Attendance::check_in(member(), ymd(2024, 1, 1), at(2024, 1, 1, 8, 0));
        fx.store.insert_check_in(&row).await.unwrap();
        let cmd = CheckOutCommand { member_id: member() };

        handler(&fx).handle(cmd.clone()).await.unwrap();
        let err = handler(&fx).handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }
}
