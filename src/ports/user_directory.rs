//! User directory port.
//!
//! Registration, authentication and profile management are external. The
//! engine needs two lookups: by user ID (email, role) and by the member code
//! printed on a member's card (for door scans).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{DomainError, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Staff,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" | "user" => Ok(Role::Member),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::internal(format!("Unknown role: {}", other))),
        }
    }
}

/// Directory record for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub display_name: Option<String>,
    /// Code on the member's card; absent for staff-only accounts.
    pub member_code: Option<String>,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns `None` if the user does not exist.
    async fn lookup(&self, user_id: &UserId) -> Result<Option<DirectoryEntry>, DomainError>;

    /// Returns `None` if no user carries this member code.
    async fn find_by_member_code(&self, code: &str) -> Result<Option<DirectoryEntry>, DomainError>;
}
