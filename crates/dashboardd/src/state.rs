use std::sync::Arc;

use dashboard_core::DashboardEngine;
use tokio::sync::Mutex;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Handlers and the watchdog tick take turns on the engine lock.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<DashboardEngine>>,
}

impl AppState {
    pub fn new(engine: DashboardEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }
}
