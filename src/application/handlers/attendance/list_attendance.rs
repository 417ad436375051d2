//! ListAttendanceHandler - Query handler for a member's attendance history.

use std::sync::Arc;

use crate::domain::attendance::Attendance;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::AttendanceRepository;

const DEFAULT_LIMIT: u32 = 30;
const MAX_LIMIT: u32 = 366;

#[derive(Debug, Clone)]
pub struct ListAttendanceQuery {
    pub member_id: UserId,
    /// Defaults to 30, capped at 366.
    pub limit: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ListAttendanceResult {
    pub records: Vec<Attendance>,
}

pub struct ListAttendanceHandler {
    attendance: Arc<dyn AttendanceRepository>,
}

impl ListAttendanceHandler {
    pub fn new(attendance: Arc<dyn AttendanceRepository>) -> Self {
        Self { attendance }
    }

    pub async fn handle(&self, query: ListAttendanceQuery) -> Result<ListAttendanceResult, DomainError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let records = self.attendance.list_for_member(&query.member_id, limit).await?;
        Ok(ListAttendanceResult { records })
    }
}
