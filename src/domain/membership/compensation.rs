//! Compensation: audit-logged grants of extra valid days.
//!
//! Two kinds of rows share this table:
//!
//! - `Grant` rows add to a membership's effective end date without touching
//!   its stored `end_date`.
//! - `Extension` rows are the audit trail of `extend`, which moves `end_date`
//!   itself. They are never summed into the effective end date again.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    CompensationId, DomainError, MembershipId, Timestamp, UserId, ValidationError,
};

use super::Membership;

/// Status of a compensation row. New rows are always `Applied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationStatus {
    Pending,
    Applied,
    Expired,
}

impl CompensationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompensationStatus::Pending => "pending",
            CompensationStatus::Applied => "applied",
            CompensationStatus::Expired => "expired",
        }
    }
}

impl FromStr for CompensationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CompensationStatus::Pending),
            "applied" => Ok(CompensationStatus::Applied),
            "expired" => Ok(CompensationStatus::Expired),
            other => Err(DomainError::internal(format!(
                "Invalid compensation status value: {}",
                other
            ))),
        }
    }
}

/// Whether a row adds days on top of `end_date` or records a change to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationKind {
    Grant,
    Extension,
}

impl CompensationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompensationKind::Grant => "grant",
            CompensationKind::Extension => "extension",
        }
    }
}

impl FromStr for CompensationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grant" => Ok(CompensationKind::Grant),
            "extension" => Ok(CompensationKind::Extension),
            other => Err(DomainError::internal(format!(
                "Invalid compensation kind value: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for CompensationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One compensation row, tied to a single membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compensation {
    pub id: CompensationId,
    pub membership_id: MembershipId,
    pub member_id: UserId,
    pub days: i64,
    pub reason: String,
    pub compensation_date: NaiveDate,
    pub status: CompensationStatus,
    pub kind: CompensationKind,
    pub granted_by: UserId,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

impl Compensation {
    /// Builds an applied grant for `membership`.
    ///
    /// Does not check the membership status; callers decide whether the
    /// membership may receive days.
    pub fn grant(
        membership: &Membership,
        days: i64,
        reason: impl Into<String>,
        compensation_date: NaiveDate,
        granted_by: UserId,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        Self::build(
            membership,
            CompensationKind::Grant,
            days,
            reason.into(),
            compensation_date,
            granted_by,
            notes,
        )
    }

    /// Builds the audit row written alongside an `extend`.
    pub fn extension_audit(
        membership: &Membership,
        days: i64,
        reason: impl Into<String>,
        compensation_date: NaiveDate,
        granted_by: UserId,
    ) -> Result<Self, ValidationError> {
        Self::build(
            membership,
            CompensationKind::Extension,
            days,
            reason.into(),
            compensation_date,
            granted_by,
            None,
        )
    }

    fn build(
        membership: &Membership,
        kind: CompensationKind,
        days: i64,
        reason: String,
        compensation_date: NaiveDate,
        granted_by: UserId,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        validate_days(days)?;
        if reason.trim().is_empty() {
            return Err(ValidationError::empty_field("reason"));
        }

        Ok(Self {
            id: CompensationId::new(),
            membership_id: membership.id,
            member_id: membership.member_id.clone(),
            days,
            reason,
            compensation_date,
            status: CompensationStatus::Applied,
            kind,
            granted_by,
            notes: notes.filter(|n| !n.trim().is_empty()),
            created_at: Timestamp::now(),
        })
    }

    /// True if this row contributes to the effective end date.
    pub fn counts_toward_effective_end(&self) -> bool {
        self.kind == CompensationKind::Grant && self.status == CompensationStatus::Applied
    }
}

/// Largest day count a single grant or extension may carry (ten years).
pub const MAX_COMPENSATION_DAYS: i64 = 3650;

/// Accepts 1..=[`MAX_COMPENSATION_DAYS`].
pub fn validate_days(days: i64) -> Result<(), ValidationError> {
    if !(1..=MAX_COMPENSATION_DAYS).contains(&days) {
        return Err(ValidationError::out_of_range("days", 1, MAX_COMPENSATION_DAYS, days));
    }
    Ok(())
}

/// Sum of days that count toward the effective end date.
pub fn applied_bonus_days<'a>(rows: impl IntoIterator<Item = &'a Compensation>) -> i64 {
    rows.into_iter()
        .filter(|c| c.counts_toward_effective_end())
        .fold(0i64, |total, c| total.saturating_add(c.days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ApplicationId, PlanId};
    use crate::domain::membership::Plan;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn membership() -> Membership {
        let plan = Plan::new(PlanId::new(), "Monthly", 50_000, 30).unwrap();
        Membership::from_accepted_application(
            UserId::new("member-1").unwrap(),
            &plan,
            ApplicationId::new(),
            ymd(2024, 1, 1),
        )
    }

    fn admin() -> UserId {
        UserId::new("admin-1").unwrap()
    }

    #[test]
    fn grant_is_applied_and_counts() {
        let c = Compensation::grant(&membership(), 5, "Closed for repairs", ymd(2024, 1, 15), admin(), None)
            .unwrap();
        assert_eq!(c.status, CompensationStatus::Applied);
        assert!(c.counts_toward_effective_end());
    }

    #[test]
    fn extension_audit_does_not_count() {
        let c = Compensation::extension_audit(&membership(), 7, "Goodwill", ymd(2024, 1, 15), admin())
            .unwrap();
        assert_eq!(c.kind, CompensationKind::Extension);
        assert!(!c.counts_toward_effective_end());
    }

    #[test]
    fn zero_days_rejected() {
        let result = Compensation::grant(&membership(), 0, "Nothing", ymd(2024, 1, 15), admin(), None);
        assert!(matches!(result, Err(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn negative_days_rejected() {
        assert!(validate_days(-3).is_err());
    }

    #[test]
    fn day_count_is_capped() {
        assert!(validate_days(MAX_COMPENSATION_DAYS).is_ok());
        assert!(matches!(
            validate_days(MAX_COMPENSATION_DAYS + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_days(1_000_000_000_000_000).is_err());
    }

    #[test]
    fn blank_reason_rejected() {
        let result = Compensation::grant(&membership(), 2, " ", ymd(2024, 1, 15), admin(), None);
        assert!(matches!(result, Err(ValidationError::EmptyField { .. })));
    }

    #[test]
    fn blank_notes_are_dropped() {
        let c = Compensation::grant(
            &membership(),
            2,
            "Aircon outage",
            ymd(2024, 1, 15),
            admin(),
            Some("   ".to_string()),
        )
        .unwrap();
        assert!(c.notes.is_none());
    }

    #[test]
    fn bonus_days_skip_extensions_and_non_applied() {
        let m = membership();
        let grant = Compensation::grant(&m, 5, "Repairs", ymd(2024, 1, 15), admin(), None).unwrap();
        let ext = Compensation::extension_audit(&m, 7, "Goodwill", ymd(2024, 1, 16), admin()).unwrap();
        let mut expired = Compensation::grant(&m, 3, "Old", ymd(2024, 1, 2), admin(), None).unwrap();
        expired.status = CompensationStatus::Expired;

        assert_eq!(applied_bonus_days([&grant, &ext, &expired]), 5);
    }
}
