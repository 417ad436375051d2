//! ScanHandler - Staff-operated door scan by member code.
//!
//! One entrypoint that checks in or out depending on today's row:
//!
//! | today's row  | outcome                                          |
//! |--------------|--------------------------------------------------|
//! | none         | check in (needs an active membership)            |
//! | open         | check out once the dwell interval has elapsed    |
//! | closed       | `Conflict`                                       |
//!
//! Two scans racing on an empty day both try to insert; the loser re-reads
//! the row and is treated as a scan on an open record, which inside the
//! dwell interval yields `RateLimited`.

use std::sync::Arc;

use crate::application::handlers::membership::MembershipLedger;
use crate::domain::attendance::{decide_scan, Attendance, DwellPolicy, ScanAction};
use crate::domain::foundation::{BusinessCalendar, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::{AttendanceRepository, Clock, UserDirectory};

use super::check_in::require_active_membership;

#[derive(Debug, Clone)]
pub struct ScanCommand {
    pub member_code: String,
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub member_id: UserId,
    pub action: ScanAction,
    pub attendance: Attendance,
}

pub struct ScanHandler {
    ledger: MembershipLedger,
    attendance: Arc<dyn AttendanceRepository>,
    directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
    calendar: BusinessCalendar,
    policy: DwellPolicy,
}

impl ScanHandler {
    pub fn new(
        ledger: MembershipLedger,
        attendance: Arc<dyn AttendanceRepository>,
        directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
        calendar: BusinessCalendar,
        policy: DwellPolicy,
    ) -> Self {
        Self {
            ledger,
            attendance,
            directory,
            clock,
            calendar,
            policy,
        }
    }

    /// # Errors
    ///
    /// - `InvalidArgument` for a blank code
    /// - `NotFound` if no member carries the code
    /// - `Forbidden` "No active membership" on check-in
    /// - `RateLimited` if scanned again within the dwell interval
    /// - `Conflict` if already checked out today
    pub async fn handle(&self, cmd: ScanCommand) -> Result<ScanResult, DomainError> {
        let code = cmd.member_code.trim();
        if code.is_empty() {
            return Err(DomainError::invalid_argument("member_code", "member_code is required"));
        }
        let member_id = self
            .directory
            .find_by_member_code(code)
            .await?
            .ok_or_else(|| DomainError::not_found("member code", code))?
            .user_id;

        let now = self.clock.now();
        let today = self.calendar.date_of(&now);
        let existing = self.attendance.find_for_date(&member_id, today).await?;

        let (action, attendance) = match decide_scan(existing.as_ref(), &self.policy, &now)? {
            ScanAction::CheckIn => {
                require_active_membership(&self.ledger, &member_id, today).await?;
                let attendance = Attendance::check_in(member_id.clone(), today, now);
                match self.attendance.insert_check_in(&attendance).await {
                    Ok(()) => (ScanAction::CheckIn, attendance),
                    Err(e) if e.is(ErrorCode::Conflict) => {
                        let winner = self
                            .attendance
                            .find_for_date(&member_id, today)
                            .await?
                            .ok_or_else(|| {
                                DomainError::internal("Attendance row vanished after conflict")
                            })?;
                        match decide_scan(Some(&winner), &self.policy, &now)? {
                            ScanAction::CheckOut => {
                                (ScanAction::CheckOut, self.close(&winner, now).await?)
                            }
                            ScanAction::CheckIn => return Err(e),
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
            ScanAction::CheckOut => {
                let open = existing.ok_or_else(|| {
                    DomainError::internal("Scan decided check-out without a record")
                })?;
                (ScanAction::CheckOut, self.close(&open, now).await?)
            }
        };

        tracing::info!(
            attendance_id = %attendance.id,
            member_id = %member_id,
            action = ?action,
            "Door scan recorded"
        );

        Ok(ScanResult {
            member_id,
            action,
            attendance,
        })
    }

    async fn close(&self, open: &Attendance, now: Timestamp) -> Result<Attendance, DomainError> {
        let mut record = open.clone();
        record.check_out(now)?;
        self.attendance
            .record_check_out(&record.id, now)
            .await?
            .ok_or_else(|| DomainError::conflict("Already checked out today"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::handlers::testing::{at, ymd, Fixture, MEMBER_CODE};
    use crate::domain::foundation::AttendanceId;
    use crate::ports::MembershipRepository;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Answers the first `find_for_date` as if the day were still empty,
    /// the way a scan that lost the insert race sees it.
    struct StaleFirstRead {
        inner: InMemoryStore,
        served: AtomicBool,
    }

    #[async_trait]
    impl AttendanceRepository for StaleFirstRead {
        async fn insert_check_in(&self, attendance: &Attendance) -> Result<(), DomainError> {
            self.inner.insert_check_in(attendance).await
        }

        async fn find_for_date(
            &self,
            member_id: &UserId,
            date: NaiveDate,
        ) -> Result<Option<Attendance>, DomainError> {
            if !self.served.swap(true, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_for_date(member_id, date).await
        }

        async fn record_check_out(
            &self,
            id: &AttendanceId,
            at: Timestamp,
        ) -> Result<Option<Attendance>, DomainError> {
            self.inner.record_check_out(id, at).await
        }

        async fn list_for_member(
            &self,
            member_id: &UserId,
            limit: u32,
        ) -> Result<Vec<Attendance>, DomainError> {
            self.inner.list_for_member(member_id, limit).await
        }
    }

    fn handler(fx: &Fixture) -> ScanHandler {
        ScanHandler::new(
            fx.ledger(),
            Arc::new(fx.store.clone()),
            Arc::new(fx.directory.clone()),
            Arc::new(fx.clock.clone()),
            fx.calendar,
            DwellPolicy::default(),
        )
    }

    fn scan() -> ScanCommand {
        ScanCommand {
            member_code: MEMBER_CODE.to_string(),
        }
    }

    #[tokio::test]
    async fn first_scan_checks_in() {
        let fx = Fixture::new().await;
        fx.active_membership(ymd(2024, 1, 1)).await;

        let result = handler(&fx).handle(scan()).await.unwrap();
        assert_eq!(result.action, ScanAction::CheckIn);
        assert_eq!(result.attendance.time_in, at(2024, 1, 1, 9, 0));
    }

    #[tokio::test]
    async fn rescan_inside_dwell_interval_is_rate_limited() {
        let fx = Fixture::new().await;
        fx.active_membership(ymd(2024, 1, 1)).await;
        handler(&fx).handle(scan()).await.unwrap();

        fx.clock.set(at(2024, 1, 1, 9, 10));
        let err = handler(&fx).handle(scan()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::RateLimited);
        assert_eq!(err.details.get("retry_after_secs").map(String::as_str), Some("1200"));
        assert!(err.message.contains("20"));
    }

    #[tokio::test]
    async fn scan_at_exact_boundary_checks_out() {
        let fx = Fixture::new().await;
        fx.active_membership(ymd(2024, 1, 1)).await;
        handler(&fx).handle(scan()).await.unwrap();

        fx.clock.set(at(2024, 1, 1, 9, 30));
        let result = handler(&fx).handle(scan()).await.unwrap();

        assert_eq!(result.action, ScanAction::CheckOut);
        assert_eq!(result.attendance.time_out, Some(at(2024, 1, 1, 9, 30)));
    }

    #[tokio::test]
    async fn scan_after_check_out_conflicts() {
        let fx = Fixture::new().await;
        fx.active_membership(ymd(2024, 1, 1)).await;
        handler(&fx).handle(scan()).await.unwrap();
        fx.clock.set(at(2024, 1, 1, 10, 0));
        handler(&fx).handle(scan()).await.unwrap();

        fx.clock.set(at(2024, 1, 1, 11, 0));
        let err = handler(&fx).handle(scan()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn no_membership_is_forbidden() {
        let fx = Fixture::new().await;
        let err = handler(&fx).handle(scan()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(err.message, "No active membership");
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let fx = Fixture::new().await;
        let err = handler(&fx)
            .handle(ScanCommand {
                member_code: "NOPE".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn check_out_does_not_require_membership_still_active() {
        let fx = Fixture::new().await;
        let m = fx.active_membership(ymd(2024, 1, 1)).await;
        handler(&fx).handle(scan()).await.unwrap();
        fx.store.mark_expired(&m.id, ymd(2024, 3, 1)).await.unwrap();

        fx.clock.set(at(2024, 1, 1, 10, 0));
        let result = handler(&fx).handle(scan()).await.unwrap();
        assert_eq!(result.action, ScanAction::CheckOut);
    }

    #[tokio::test]
    async fn losing_the_insert_race_inside_dwell_is_rate_limited() {
        let fx = Fixture::new().await;
        fx.active_membership(ymd(2024, 1, 1)).await;
        handler(&fx).handle(scan()).await.unwrap();

        fx.clock.set(at(2024, 1, 1, 9, 10));
        let racing = ScanHandler::new(
            fx.ledger(),
            Arc::new(StaleFirstRead {
                inner: fx.store.clone(),
                served: AtomicBool::new(false),
            }),
            Arc::new(fx.directory.clone()),
            Arc::new(fx.clock.clone()),
            fx.calendar,
            DwellPolicy::default(),
        );
        let err = racing.handle(scan()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::RateLimited);
        let rows = fx.store.attendance().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].time_out, None);
    }
}
