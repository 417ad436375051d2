//! End-to-end flows through the handlers with in-memory adapters.
//!
//! Covers the full member journey: apply, accept, scan at the door, receive
//! compensation, and finally expire in the daily sweep.

use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::Arc;

use gymdesk::adapters::memory::{
    InMemoryPlanCatalog, InMemoryStore, InMemoryUserDirectory, RecordingNotificationChannel,
    RecordingRealtimeBus,
};
use gymdesk::adapters::FixedClock;
use gymdesk::application::handlers::attendance::{ScanCommand, ScanHandler};
use gymdesk::application::handlers::compensation::{
    GrantCompensationCommand, GrantCompensationHandler,
};
use gymdesk::application::handlers::membership::{GetMembershipHandler, GetMembershipQuery};
use gymdesk::application::handlers::plan_application::{
    AcceptApplicationCommand, AcceptApplicationHandler, SubmitApplicationCommand,
    SubmitApplicationHandler,
};
use gymdesk::application::{
    MembershipLedger, Notifier, RunExpirySweepCommand, RunExpirySweepHandler,
};
use gymdesk::domain::attendance::{DwellPolicy, ScanAction};
use gymdesk::domain::foundation::{BusinessCalendar, ErrorCode, PlanId, Timestamp, UserId};
use gymdesk::domain::membership::{Membership, Plan, PlanStatus};
use gymdesk::domain::notification::NotificationKind;
use gymdesk::domain::plan_application::{ApplicationStatus, PaymentMethod};
use gymdesk::ports::{events, DirectoryEntry, Role};

// =============================================================================
// Test Infrastructure
// =============================================================================

const MEMBER_CODE: &str = "GYM-0042";

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
    Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
}

fn member() -> UserId {
    UserId::new("member-42").unwrap()
}

fn admin() -> UserId {
    UserId::new("admin-7").unwrap()
}

/// Every adapter a front desk deployment needs, in memory.
struct Gym {
    store: InMemoryStore,
    plans: InMemoryPlanCatalog,
    directory: InMemoryUserDirectory,
    channel: RecordingNotificationChannel,
    bus: RecordingRealtimeBus,
    clock: FixedClock,
    calendar: BusinessCalendar,
    plan: Plan,
}

impl Gym {
    async fn open() -> Self {
        let plans = InMemoryPlanCatalog::new();
        let plan = Plan::new(PlanId::new(), "Monthly", 50_000, 30).unwrap();
        plans.insert(plan.clone()).await;

        let directory = InMemoryUserDirectory::new();
        directory
            .insert(DirectoryEntry {
                user_id: member(),
                email: "jo@example.com".to_string(),
                role: Role::Member,
                display_name: Some("Jo Reyes".to_string()),
                member_code: Some(MEMBER_CODE.to_string()),
            })
            .await;

        Self {
            store: InMemoryStore::new(),
            plans,
            directory,
            channel: RecordingNotificationChannel::new(),
            bus: RecordingRealtimeBus::new(),
            clock: FixedClock::new(at(2024, 1, 1, 8, 0)),
            calendar: BusinessCalendar::utc(),
            plan,
        }
    }

    fn notifier(&self) -> Notifier {
        Notifier::new(Arc::new(self.channel.clone()), Arc::new(self.bus.clone()))
    }

    fn ledger(&self) -> MembershipLedger {
        MembershipLedger::new(Arc::new(self.store.clone()), Arc::new(self.store.clone()))
    }

    fn submit(&self) -> SubmitApplicationHandler {
        SubmitApplicationHandler::new(
            Arc::new(self.store.clone()),
            Arc::new(self.plans.clone()),
            Arc::new(self.directory.clone()),
        )
    }

    fn accept(&self) -> AcceptApplicationHandler {
        AcceptApplicationHandler::new(
            Arc::new(self.store.clone()),
            Arc::new(self.plans.clone()),
            self.notifier(),
        )
    }

    fn scan(&self) -> ScanHandler {
        ScanHandler::new(
            self.ledger(),
            Arc::new(self.store.clone()),
            Arc::new(self.directory.clone()),
            Arc::new(self.clock.clone()),
            self.calendar,
            DwellPolicy::from_minutes(30),
        )
    }

    fn grant(&self) -> GrantCompensationHandler {
        GrantCompensationHandler::new(Arc::new(self.store.clone()), Arc::new(self.store.clone()))
    }

    fn get_membership(&self) -> GetMembershipHandler {
        GetMembershipHandler::new(self.ledger(), Arc::new(self.clock.clone()), self.calendar)
    }

    fn sweep(&self) -> RunExpirySweepHandler {
        RunExpirySweepHandler::new(
            self.ledger(),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.plans.clone()),
            Arc::new(self.store.clone()),
            self.notifier(),
            3,
        )
    }

    /// Apply for the plan from 2024-01-01 and have it accepted for 500.00.
    async fn enroll(&self) -> Membership {
        let submitted = self
            .submit()
            .handle(SubmitApplicationCommand {
                member_id: member(),
                plan_id: self.plan.id,
                preferred_start_date: ymd(2024, 1, 1),
            })
            .await
            .unwrap();

        self.accept()
            .handle(AcceptApplicationCommand {
                application_id: submitted.application.id,
                payment_amount: 50_000,
                payment_date: ymd(2024, 1, 1),
                payment_method: PaymentMethod::Cash,
                reference_number: None,
            })
            .await
            .unwrap()
            .membership
    }

    async fn scan_at(&self, h: u32, min: u32) -> Result<ScanAction, ErrorCode> {
        self.clock.set(at(2024, 1, 1, h, min));
        self.scan()
            .handle(ScanCommand {
                member_code: MEMBER_CODE.to_string(),
            })
            .await
            .map(|result| result.action)
            .map_err(|e| e.code)
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn accepted_application_yields_membership_and_receipt() {
    let gym = Gym::open().await;

    let membership = gym.enroll().await;

    assert_eq!(membership.start_date, ymd(2024, 1, 1));
    assert_eq!(membership.end_date, ymd(2024, 1, 30));
    assert_eq!(membership.status, PlanStatus::Active);

    let receipts = gym.store.receipts().await;
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].amount_cents, 50_000);
    assert_eq!(receipts[0].membership_id, membership.id);

    let applications = gym.store.applications().await;
    assert_eq!(applications[0].status, ApplicationStatus::Accepted);
    assert_eq!(gym.channel.count_of(NotificationKind::ApplicationAccepted).await, 1);
}

#[tokio::test]
async fn door_scans_toggle_with_dwell_interval() {
    let gym = Gym::open().await;
    gym.enroll().await;

    assert_eq!(gym.scan_at(9, 0).await, Ok(ScanAction::CheckIn));
    assert_eq!(gym.scan_at(9, 10).await, Err(ErrorCode::RateLimited));
    assert_eq!(gym.scan_at(9, 31).await, Ok(ScanAction::CheckOut));

    let rows = gym.store.attendance().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].time_out, Some(at(2024, 1, 1, 9, 31)));

    // Visit already complete for the day.
    assert_eq!(gym.scan_at(18, 0).await, Err(ErrorCode::Conflict));
}

#[tokio::test]
async fn compensation_pushes_out_effective_end_date() {
    let gym = Gym::open().await;
    let membership = gym.enroll().await;

    gym.grant()
        .handle(GrantCompensationCommand {
            membership_id: membership.id,
            days: 5,
            reason: "Pool closed for maintenance".to_string(),
            compensation_date: ymd(2024, 1, 15),
            actor: admin(),
            notes: None,
        })
        .await
        .unwrap();

    gym.clock.set(at(2024, 1, 15, 12, 0));
    let view = gym
        .get_membership()
        .handle(GetMembershipQuery {
            membership_id: membership.id,
        })
        .await
        .unwrap();

    assert_eq!(view.membership.end_date, ymd(2024, 1, 30));
    assert_eq!(view.effective_end_date, ymd(2024, 2, 4));
    assert_eq!(view.days_remaining, 21);
}

#[tokio::test]
async fn sweep_expires_after_effective_end_and_notifies_once() {
    let gym = Gym::open().await;
    let membership = gym.enroll().await;
    gym.grant()
        .handle(GrantCompensationCommand {
            membership_id: membership.id,
            days: 5,
            reason: "Pool closed for maintenance".to_string(),
            compensation_date: ymd(2024, 1, 15),
            actor: admin(),
            notes: None,
        })
        .await
        .unwrap();

    // Last covered day: still active.
    let report = gym
        .sweep()
        .handle(RunExpirySweepCommand {
            today: ymd(2024, 2, 4),
        })
        .await
        .unwrap();
    assert_eq!(report.expired, 0);

    let report = gym
        .sweep()
        .handle(RunExpirySweepCommand {
            today: ymd(2024, 2, 5),
        })
        .await
        .unwrap();
    assert_eq!(report.expired, 1);
    assert_eq!(report.failures, 0);

    let stored = gym.store.memberships().await;
    assert_eq!(stored[0].status, PlanStatus::Expired);

    let expired_notices: Vec<_> = gym
        .channel
        .sent()
        .await
        .into_iter()
        .filter(|(_, notice)| notice.kind == NotificationKind::MembershipExpired)
        .collect();
    assert_eq!(expired_notices.len(), 1);
    assert_eq!(expired_notices[0].0, member());
    assert_eq!(expired_notices[0].1.title, "Membership Expired");

    let published = gym.bus.published().await;
    assert!(published.iter().any(|(event, payload)| {
        event == events::NOTIFICATION && payload["kind"] == "membership_expired"
    }));
}

#[tokio::test]
async fn second_pending_application_for_same_plan_conflicts() {
    let gym = Gym::open().await;
    let cmd = SubmitApplicationCommand {
        member_id: member(),
        plan_id: gym.plan.id,
        preferred_start_date: ymd(2024, 1, 1),
    };

    gym.submit().handle(cmd.clone()).await.unwrap();
    let err = gym.submit().handle(cmd).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::Conflict);
    assert_eq!(gym.store.applications().await.len(), 1);
}

#[tokio::test]
async fn repeated_sweeps_do_not_repeat_notices() {
    let gym = Gym::open().await;
    gym.enroll().await;

    // 2024-01-28 is within three days of the 01-30 end date.
    for _ in 0..3 {
        gym.sweep()
            .handle(RunExpirySweepCommand {
                today: ymd(2024, 1, 28),
            })
            .await
            .unwrap();
    }
    assert_eq!(
        gym.channel.count_of(NotificationKind::MembershipExpiringSoon).await,
        1
    );

    for _ in 0..3 {
        gym.sweep()
            .handle(RunExpirySweepCommand {
                today: ymd(2024, 2, 1),
            })
            .await
            .unwrap();
    }
    assert_eq!(gym.channel.count_of(NotificationKind::MembershipExpired).await, 1);
}

#[tokio::test]
async fn expired_membership_blocks_door_check_in() {
    let gym = Gym::open().await;
    gym.enroll().await;
    gym.sweep()
        .handle(RunExpirySweepCommand {
            today: ymd(2024, 2, 1),
        })
        .await
        .unwrap();

    gym.clock.set(at(2024, 2, 1, 9, 0));
    let err = gym
        .scan()
        .handle(ScanCommand {
            member_code: MEMBER_CODE.to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Forbidden);
    assert!(gym.store.attendance().await.is_empty());
}
