//! Clock port.

use crate::domain::foundation::Timestamp;

/// Source of the current instant. Handlers never call `Timestamp::now()`
/// directly so tests can pin time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_object_safe() {
        fn _accepts_dyn(_clock: &dyn Clock) {}
    }
}
