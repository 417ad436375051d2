//! Plan application domain module.
//!
//! A member asks to subscribe to a plan; an admin accepts (with payment) or
//! declines; the expiry sweep expires requests left pending past their
//! preferred start date.

mod aggregate;
mod payment;
mod status;

pub use aggregate::PlanApplication;
pub use payment::{Payment, PaymentMethod};
pub use status::ApplicationStatus;
