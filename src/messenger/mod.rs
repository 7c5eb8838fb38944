//! Outbound messaging through the Facebook Graph API
//!
//! ## Submodules
//!
//! - [`client`] - Graph API client
//! - [`requests`] - Bodies accepted by the `/messages` endpoints
//! - [`routes`] - HTTP endpoint handlers proxying to the client
//! - [`schemas`] - Send API request and response bodies

pub mod client;
pub mod requests;
pub mod routes;
pub mod schemas;
