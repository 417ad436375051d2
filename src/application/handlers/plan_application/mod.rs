//! Plan application handlers.
//!
//! ## Commands
//! - Submitting an application for a plan
//! - Accepting (records payment, creates membership and receipt)
//! - Declining
//!
//! ## Queries
//! - Listing applications, optionally by status or member

mod accept_application;
mod decline_application;
mod list_applications;
mod submit_application;

// Commands
pub use accept_application::{
    AcceptApplicationCommand, AcceptApplicationHandler, AcceptApplicationResult,
};
pub use decline_application::{
    DeclineApplicationCommand, DeclineApplicationHandler, DeclineApplicationResult,
};
pub use submit_application::{
    SubmitApplicationCommand, SubmitApplicationHandler, SubmitApplicationResult,
};

// Queries
pub use list_applications::{
    ListApplicationsHandler, ListApplicationsQuery, ListApplicationsResult,
};
