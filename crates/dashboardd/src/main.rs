//! dashboardd - The dashboard background service
//!
//! This is the main entry point for the dashboardd service.
//! It wires together all the components:
//! - Configuration loading
//! - Store initialization and seeding
//! - Session engine and inactivity watchdog
//! - HTTP server

use anyhow::{Context, Result};
use clap::Parser;
use dashboard_config::{Settings, load_config};
use dashboard_core::{CoreEvent, DashboardEngine};
use dashboard_store::{AuditEvent, AuditEventType, RecordStore, SqliteStore};
use dashboard_util::{
    DATABASE_FILENAME, MonotonicInstant, default_config_path, format_duration, is_mock_time_active,
};
use dashboardd::{AppState, build_app_router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// How often the inactivity watchdog is checked
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// dashboardd - Session lifecycle and analytics service for the dashboard
#[derive(Parser, Debug)]
#[command(name = "dashboardd")]
#[command(about = "Session lifecycle and analytics service for the dashboard", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/dashboard/config.toml)
    #[arg(short, long, env = "DASHBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address override (or set DASHBOARD_LISTEN env var)
    #[arg(long, env = "DASHBOARD_LISTEN")]
    listen: Option<SocketAddr>,

    /// Data directory override (or set DASHBOARD_DATA_DIR env var)
    #[arg(short, long, env = "DASHBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Main service state
struct Service {
    engine: DashboardEngine,
    store: Arc<SqliteStore>,
    listen_addr: SocketAddr,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        let settings = Self::load_settings(args)?;

        let listen_addr = args.listen.unwrap_or(settings.service.listen_addr);
        let data_dir = args
            .data_dir
            .clone()
            .unwrap_or_else(|| settings.service.data_dir.clone());

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        // Initialize store
        let db_path = data_dir.join(DATABASE_FILENAME);
        let store = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );

        info!(db_path = %db_path.display(), "Store initialized");

        store.append_audit(AuditEvent::new(AuditEventType::ServiceStarted))?;

        let report = store
            .seed_if_empty(&settings.seed)
            .context("Failed to seed store")?;
        if report.is_empty() {
            info!("Store already populated, seed skipped");
        }

        let mut engine = DashboardEngine::new(&settings, store.clone());
        match engine.restore(MonotonicInstant::now()) {
            Ok(Some(session)) => info!(tier = %session.tier, "Client session restored"),
            Ok(None) => info!("No client session to restore"),
            Err(e) => warn!(error = %e, "Failed to restore client session"),
        }

        Ok(Self {
            engine,
            store,
            listen_addr,
        })
    }

    fn load_settings(args: &Args) -> Result<Settings> {
        let (path, explicit) = match &args.config {
            Some(path) => (path.clone(), true),
            None => (default_config_path(), false),
        };

        if !explicit && !path.exists() {
            warn!(
                config_path = %path.display(),
                "No configuration file found, using defaults"
            );
            return Ok(Settings::default());
        }

        let settings = load_config(&path)
            .with_context(|| format!("Failed to load config from {:?}", path))?;

        info!(
            config_path = %path.display(),
            inactivity_timeout = %format_duration(settings.session.inactivity_timeout),
            seed_accounts = settings.seed.accounts.len(),
            "Configuration loaded"
        );

        Ok(settings)
    }

    async fn run(self) -> Result<()> {
        let state = AppState::new(self.engine);
        let engine = state.engine.clone();
        let store = self.store.clone();

        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.listen_addr))?;

        info!(listen_addr = %self.listen_addr, "HTTP server listening");

        // Spawn HTTP server task
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = build_app_router(state);
        let server = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                error!(error = %e, "HTTP server error");
            }
        });

        // Set up signal handlers
        let mut sigterm = signal(SignalKind::terminate())
            .context("Failed to create SIGTERM handler")?;
        let mut sigint = signal(SignalKind::interrupt())
            .context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup())
            .context("Failed to create SIGHUP handler")?;

        let mut tick_timer = tokio::time::interval(TICK_INTERVAL);

        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }
                _ = sighup.recv() => {
                    info!("Received SIGHUP, shutting down gracefully");
                    break;
                }

                // Tick timer - check inactivity expiry
                _ = tick_timer.tick() => {
                    let events = {
                        let mut engine = engine.lock().await;
                        engine.tick(MonotonicInstant::now())
                    };

                    for event in events {
                        Self::handle_core_event(event);
                    }
                }
            }
        }

        // Graceful shutdown
        info!("Shutting down dashboardd");

        engine.lock().await.teardown();

        let _ = shutdown_tx.send(());
        if let Err(e) = server.await {
            warn!(error = %e, "HTTP server task failed");
        }

        if let Err(e) = store.append_audit(AuditEvent::new(AuditEventType::ServiceStopped)) {
            warn!(error = %e, "Failed to log service shutdown");
        }

        info!("Shutdown complete");
        Ok(())
    }

    fn handle_core_event(event: CoreEvent) {
        match event {
            CoreEvent::SessionEnded { account_id, reason } => {
                info!(
                    account_id = %account_id,
                    reason = ?reason,
                    redirect = reason.redirect_path(),
                    "Client session ended"
                );
            }
            CoreEvent::LogoutFailed { reason, message } => {
                warn!(reason = ?reason, error = %message, "Client session logout failed");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "dashboardd starting"
    );

    if is_mock_time_active() {
        warn!("Mock time is active, registration dates and slot expiry use the shifted clock");
    }

    let service = Service::new(&args)?;
    service.run().await
}
