//! In-process adapters.
//!
//! Used by tests and local runs without a database. Not durable.

mod directory;
mod notifications;
mod store;

pub use directory::{InMemoryPlanCatalog, InMemoryUserDirectory};
pub use notifications::{RecordingNotificationChannel, RecordingRealtimeBus};
pub use store::{FaultPoint, InMemoryStore};
