//! GetMembershipHandler - Query handler for a single membership.

use std::sync::Arc;

use crate::domain::foundation::{BusinessCalendar, DomainError, MembershipId};
use crate::ports::Clock;

use super::{MembershipLedger, MembershipView};

#[derive(Debug, Clone)]
pub struct GetMembershipQuery {
    pub membership_id: MembershipId,
}

pub type GetMembershipResult = MembershipView;

/// Returns the membership with its effective end date and the days left as
/// of today in the business calendar.
pub struct GetMembershipHandler {
    ledger: MembershipLedger,
    clock: Arc<dyn Clock>,
    calendar: BusinessCalendar,
}

impl GetMembershipHandler {
    pub fn new(ledger: MembershipLedger, clock: Arc<dyn Clock>, calendar: BusinessCalendar) -> Self {
        Self {
            ledger,
            clock,
            calendar,
        }
    }

    pub async fn handle(&self, query: GetMembershipQuery) -> Result<GetMembershipResult, DomainError> {
        let today = self.calendar.date_of(&self.clock.now());
        self.ledger.get_membership(&query.membership_id, today).await
    }
}
