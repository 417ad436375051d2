//! Shared fixture for handler tests.

use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::Arc;

use crate::adapters::clock::FixedClock;
use crate::adapters::memory::{
    InMemoryPlanCatalog, InMemoryStore, InMemoryUserDirectory, RecordingNotificationChannel,
    RecordingRealtimeBus,
};
use crate::application::handlers::membership::MembershipLedger;
use crate::application::Notifier;
use crate::domain::foundation::{ApplicationId, BusinessCalendar, PlanId, Timestamp, UserId};
use crate::domain::membership::{Membership, Plan};
use crate::ports::{DirectoryEntry, Role};

pub const MEMBER_CODE: &str = "GYM-0001";

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
    Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
}

pub fn member() -> UserId {
    UserId::new("member-1").unwrap()
}

pub fn admin() -> UserId {
    UserId::new("admin-1").unwrap()
}

pub struct Fixture {
    pub store: InMemoryStore,
    pub plans: InMemoryPlanCatalog,
    pub directory: InMemoryUserDirectory,
    pub channel: RecordingNotificationChannel,
    pub bus: RecordingRealtimeBus,
    pub clock: FixedClock,
    pub calendar: BusinessCalendar,
    pub plan: Plan,
}

impl Fixture {
    /// One member with a card code, one admin, one 30-day plan; the clock
    /// reads 2024-01-01 09:00 UTC.
    pub async fn new() -> Self {
        let plans = InMemoryPlanCatalog::new();
        let plan = Plan::new(PlanId::new(), "Monthly", 50_000, 30).unwrap();
        plans.insert(plan.clone()).await;

        let directory = InMemoryUserDirectory::new();
        directory
            .insert(DirectoryEntry {
                user_id: member(),
                email: "member@example.com".to_string(),
                role: Role::Member,
                display_name: Some("Maria Santos".to_string()),
                member_code: Some(MEMBER_CODE.to_string()),
            })
            .await;
        directory
            .insert(DirectoryEntry {
                user_id: admin(),
                email: "admin@example.com".to_string(),
                role: Role::Admin,
                display_name: Some("Front Desk".to_string()),
                member_code: None,
            })
            .await;

        Self {
            store: InMemoryStore::new(),
            plans,
            directory,
            channel: RecordingNotificationChannel::new(),
            bus: RecordingRealtimeBus::new(),
            clock: FixedClock::new(at(2024, 1, 1, 9, 0)),
            calendar: BusinessCalendar::utc(),
            plan,
        }
    }

    pub fn notifier(&self) -> Notifier {
        Notifier::new(Arc::new(self.channel.clone()), Arc::new(self.bus.clone()))
    }

    pub fn ledger(&self) -> MembershipLedger {
        MembershipLedger::new(Arc::new(self.store.clone()), Arc::new(self.store.clone()))
    }

    /// Seeds an active membership for `member()` on the fixture plan.
    pub async fn active_membership(&self, start: NaiveDate) -> Membership {
        let membership =
            Membership::from_accepted_application(member(), &self.plan, ApplicationId::new(), start);
        self.store.insert_membership(membership.clone()).await;
        membership
    }
}
