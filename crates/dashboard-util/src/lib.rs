//! Shared utilities for the dashboard service
//!
//! This crate provides:
//! - ID types (AccountId, SessionToken)
//! - Time utilities (monotonic time, mockable wall clock)
//! - The error taxonomy shared by every layer
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
