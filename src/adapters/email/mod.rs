//! Outbound email.
//!
//! - `ResendEmailSender` - Resend HTTP API client

mod resend;

pub use resend::ResendEmailSender;
