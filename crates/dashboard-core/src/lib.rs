//! Session lifecycle engine for dashboardd
//!
//! This crate is the heart of dashboardd, containing:
//! - Registration, login and logout with a single active session
//! - Two-tier session persistence (ephemeral and durable)
//! - Inactivity watchdog driven by monotonic time
//! - Dashboard analytics and the navigation guard

mod analytics;
mod auth;
mod engine;
mod events;
mod guard;
mod session;
mod watchdog;

pub use analytics::*;
pub use auth::*;
pub use engine::*;
pub use events::*;
pub use guard::*;
pub use session::*;
pub use watchdog::*;
