//! Wire types for the dashboard HTTP API
//!
//! This crate defines the stable JSON contract between the service and its
//! clients:
//! - Requests (register, login, activity signals)
//! - Responses and error bodies
//! - Shared view types (session user, analytics rows)
//! - Versioning

mod requests;
mod responses;
mod types;

pub use requests::*;
pub use responses::*;
pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
