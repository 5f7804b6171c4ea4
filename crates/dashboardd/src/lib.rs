//! HTTP surface of dashboardd
//!
//! The binary wires this router to a listener; integration tests drive it
//! directly with `tower::ServiceExt::oneshot`.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{AppError, AppResult};
pub use router::build_app_router;
pub use state::AppState;
