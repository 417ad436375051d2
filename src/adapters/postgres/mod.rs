//! PostgreSQL adapters - Database implementations for the persistence ports.
//!
//! Every all-or-nothing unit (accept, extend, bulk grant) runs in one
//! transaction. Uniqueness comes from constraints in `migrations/`; a
//! violation of a known constraint becomes `Conflict`, anything else
//! `Internal`.
//!
//! - `PostgresApplicationRepository` - Applications, acceptance unit
//! - `PostgresMembershipRepository` - Memberships, extension, expiry
//! - `PostgresCompensationRepository` - Grant rows
//! - `PostgresAttendanceRepository` - Daily attendance rows
//! - `PostgresNotificationMarkers` - Sweep dedupe markers
//! - `PostgresPlanCatalog` / `PostgresUserDirectory` - Read-only lookups
//! - `PostgresNotificationChannel` - In-app inbox with optional email

mod application_repository;
mod attendance_repository;
mod catalog;
mod compensation_repository;
mod membership_repository;
mod notification_channel;
mod notification_markers;
mod pool;

pub use application_repository::PostgresApplicationRepository;
pub use attendance_repository::PostgresAttendanceRepository;
pub use catalog::{PostgresPlanCatalog, PostgresUserDirectory};
pub use compensation_repository::PostgresCompensationRepository;
pub use membership_repository::PostgresMembershipRepository;
pub use notification_channel::PostgresNotificationChannel;
pub use notification_markers::PostgresNotificationMarkers;
pub use pool::{create_pool, run_migrations};

use std::str::FromStr;

use crate::domain::foundation::{DomainError, UserId};

/// Maps a sqlx error to `Internal` with context.
fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::internal(format!("{}: {}", context, e))
}

/// True if `e` is a violation of the named constraint.
fn violates(e: &sqlx::Error, constraint: &str) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}

/// Parses an enum column; bad stored values are `Internal`, not caller errors.
fn parse_column<T>(column: &str, value: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = DomainError>,
{
    value.parse().map_err(|e: DomainError| {
        DomainError::internal(format!("Invalid {} value in database: {}", column, e.message))
    })
}

fn parse_user_id(column: &str, value: String) -> Result<UserId, DomainError> {
    UserId::new(value).map_err(|e| DomainError::internal(format!("Invalid {}: {}", column, e)))
}
