//! Facebook Messenger webhook integration
//!
//! ## Submodules
//!
//! - [`handler`] - Verification and event decomposition logic
//! - [`routes`] - HTTP endpoint handlers for the webhook
//! - [`schemas`] - Data structures for webhook payloads and published records

pub mod handler;
pub mod routes;
pub mod schemas;
