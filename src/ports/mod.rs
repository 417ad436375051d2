//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `ApplicationRepository` - Plan applications, including the atomic accept
//! - `MembershipRepository` - Membership reads, extension and expiry
//! - `CompensationRepository` - Grant rows and bonus-day sums
//! - `AttendanceRepository` - Daily check-in/check-out rows
//! - `NotificationMarkers` - Dedupe records for sweep reminders
//!
//! ## Collaborator Ports
//!
//! - `PlanCatalog` - Read-only plan definitions
//! - `UserDirectory` - Member lookup by ID and by card code
//! - `NotificationChannel` - In-app (and optionally email) delivery
//! - `RealtimeBus` - Best-effort push to dashboards
//! - `Clock` - Current instant

mod application_repository;
mod attendance_repository;
mod clock;
mod compensation_repository;
mod membership_repository;
mod notification_channel;
mod notification_markers;
mod plan_catalog;
mod realtime_bus;
mod user_directory;

pub use application_repository::{AcceptedApplication, ApplicationFilter, ApplicationRepository};
pub use attendance_repository::AttendanceRepository;
pub use clock::Clock;
pub use compensation_repository::CompensationRepository;
pub use membership_repository::MembershipRepository;
pub use notification_channel::NotificationChannel;
pub use notification_markers::NotificationMarkers;
pub use plan_catalog::PlanCatalog;
pub use realtime_bus::{events, RealtimeBus};
pub use user_directory::{DirectoryEntry, Role, UserDirectory};
