//! Payment receipt issued 1:1 with an accepted application's membership.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ApplicationId, MembershipId, PlanId, ReceiptId, Timestamp, UserId,
};
use crate::domain::plan_application::{Payment, PaymentMethod};

use super::Membership;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,
    pub application_id: ApplicationId,
    pub membership_id: MembershipId,
    pub member_id: UserId,
    pub plan_id: PlanId,
    /// Amount paid, in cents.
    pub amount_cents: i64,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub issued_at: Timestamp,
}

impl Receipt {
    pub fn issue(application_id: ApplicationId, membership: &Membership, payment: &Payment) -> Self {
        Self {
            id: ReceiptId::new(),
            application_id,
            membership_id: membership.id,
            member_id: membership.member_id.clone(),
            plan_id: membership.plan_id,
            amount_cents: payment.amount_cents,
            payment_date: payment.payment_date,
            payment_method: payment.method,
            reference_number: payment.reference_number.clone(),
            issued_at: Timestamp::now(),
        }
    }
}
