//! Adapters - Implementations of port interfaces.
//!
//! - `postgres` - Persistence, directory lookups and the in-app inbox
//! - `email` - Resend mail delivery
//! - `realtime` - Redis pub/sub fan-out
//! - `memory` - In-process adapters for tests and local runs
//! - `clock` - System and fixed clocks

pub mod clock;
pub mod email;
pub mod memory;
pub mod postgres;
pub mod realtime;

pub use clock::{FixedClock, SystemClock};
