//! Realtime bus adapters.
//!
//! - `RedisRealtimeBus` - Redis PUBLISH, one channel per event name
//! - `LoggingRealtimeBus` - Logs events; used when no Redis is configured

mod redis_bus;

pub use redis_bus::{LoggingRealtimeBus, RedisRealtimeBus};
