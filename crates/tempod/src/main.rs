//! # tempod
//!
//! Tempo daemon binary — wires together all crates and starts the
//! HTTP/WebSocket server plus the background scheduler loops.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tempo_core::DayBoundary;
use tempo_insights::{MetricEngine, StreakTracker};
use tempo_notify::{InMemorySessionRegistry, NotificationDispatcher, SessionRegistry};
use tempo_reminders::{ReminderService, Scheduler, SchedulerConfig};
use tempo_server::{ServerConfig, ServerDeps, TempoServer};
use tempo_settings::{TempoSettings, load_settings_from_path, settings_path};
use tempo_store::{StoreConfig, open_file, run_migrations};
use tracing_subscriber::EnvFilter;

/// Tempo daemon.
#[derive(Parser, Debug)]
#[command(name = "tempod", about = "Tempo reminder and insights daemon")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings; 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Path to the settings file (default `~/.tempo/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Tracing filter, e.g. `debug` or `tempo_server=trace` (overrides settings).
    #[arg(long)]
    log_level: Option<String>,
}

/// Fold CLI flags over loaded settings. Flags win.
fn apply_cli_overrides(settings: &mut TempoSettings, args: &Cli) {
    if let Some(ref host) = args.host {
        settings.server.host.clone_from(host);
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(ref path) = args.db_path {
        settings.database.path = path.to_string_lossy().into_owned();
    }
    if let Some(ref level) = args.log_level {
        settings.logging.level.clone_from(level);
    }
}

/// Resolve the database path. Relative paths land under `~/.tempo/`.
fn resolve_db_path(configured: &str) -> PathBuf {
    let path = PathBuf::from(configured);
    if path.is_absolute() {
        return path;
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".tempo").join(path)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Initialize tracing. `RUST_LOG` beats the configured filter when set.
fn init_tracing(settings: &TempoSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    if settings.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Settings first: the database path and log filter live there.
    let settings_file = args.settings.clone().unwrap_or_else(settings_path);
    let mut settings = load_settings_from_path(&settings_file)
        .with_context(|| format!("Failed to load settings: {}", settings_file.display()))?;
    apply_cli_overrides(&mut settings, &args);

    init_tracing(&settings);

    // Database
    let db_path = resolve_db_path(&settings.database.path);
    ensure_parent_dir(&db_path)?;
    let pool = open_file(&db_path.to_string_lossy(), &StoreConfig::default())
        .context("Failed to open database")?;
    {
        let conn = pool.get().context("Failed to get DB connection")?;
        let version = run_migrations(&conn).context("Failed to run migrations")?;
        tracing::debug!(version, "schema up to date");
    }

    let boundary = DayBoundary::from_name(&settings.time.timezone)
        .context("Invalid timezone in settings")?;

    // The recorder must be installed before the first counter touch.
    let metrics_handle = tempo_server::metrics::install_recorder();

    // Core services
    let registry: Arc<dyn SessionRegistry> = Arc::new(InMemorySessionRegistry::new());
    let dispatcher = Arc::new(NotificationDispatcher::new(registry.clone()));
    let engine = Arc::new(MetricEngine::new(pool.clone(), boundary));
    let tracker = Arc::new(StreakTracker::new(pool.clone(), boundary));

    let due_check_interval = Duration::from_secs(settings.scheduler.due_check_secs);
    let retention_interval = Duration::from_secs(settings.scheduler.retention_check_secs);
    let service = Arc::new(ReminderService::new(
        pool,
        dispatcher.clone(),
        due_check_interval,
    ));
    let scheduler = Scheduler::new(
        service,
        tracker.clone(),
        boundary,
        SchedulerConfig {
            due_check_interval,
            retention_interval,
        },
    );

    // Build and start server
    let config = ServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
        ..ServerConfig::default()
    };
    let server = TempoServer::new(
        config,
        ServerDeps {
            registry,
            dispatcher,
            engine,
            tracker,
            metrics: metrics_handle,
        },
    );

    // Scheduler loops share the server's cancellation token, so one
    // shutdown stops both the listener and the background work.
    let cancel = server.shutdown().token();
    let scheduler_handles = scheduler.spawn(&cancel);

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;

    tracing::info!(
        timezone = %settings.time.timezone,
        db = %db_path.display(),
        "Tempo listening on http://{addr}"
    );

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server
        .shutdown()
        .graceful_shutdown(scheduler_handles, None)
        .await;
    let _ = handle.await;

    tracing::info!("Shutdown complete");
    Ok(())
}
