//! `TempoServer` — Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use tempo_insights::{MetricEngine, StreakTracker};
use tempo_notify::{NotificationDispatcher, SessionRegistry};

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::metrics;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::session::ws_handler;

/// Collaborators the server routes requests into.
pub struct ServerDeps {
    /// Live session registry.
    pub registry: Arc<dyn SessionRegistry>,
    /// Notification delivery.
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Daily metric derivation.
    pub engine: Arc<MetricEngine>,
    /// Completion streak tracking.
    pub tracker: Arc<StreakTracker>,
    /// Handle for rendering `/metrics`.
    pub metrics: PrometheusHandle,
}

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live session registry.
    pub registry: Arc<dyn SessionRegistry>,
    /// Notification delivery.
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Daily metric derivation.
    pub engine: Arc<MetricEngine>,
    /// Completion streak tracking.
    pub tracker: Arc<StreakTracker>,
    /// Handle for rendering `/metrics`.
    pub metrics: PrometheusHandle,
    /// When the server started.
    pub start_time: Instant,
    /// Outbound queue depth for new sessions.
    pub channel_capacity: usize,
}

/// The main Tempo server.
pub struct TempoServer {
    config: ServerConfig,
    state: AppState,
    shutdown: Arc<ShutdownCoordinator>,
}

impl TempoServer {
    /// Create a new server.
    #[must_use]
    pub fn new(config: ServerConfig, deps: ServerDeps) -> Self {
        let state = AppState {
            registry: deps.registry,
            dispatcher: deps.dispatcher,
            engine: deps.engine,
            tracker: deps.tracker,
            metrics: deps.metrics,
            start_time: Instant::now(),
            channel_capacity: config.channel_capacity,
        };
        Self {
            config,
            state,
            shutdown: Arc::new(ShutdownCoordinator::new()),
        }
    }

    /// Build the Axum router with all routes.
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/ws", get(ws_handler))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Bind and start serving on a background task.
    ///
    /// Returns the bound address (useful with port 0) and the serve task's
    /// handle. The task drains in-flight requests once the shutdown
    /// coordinator fires.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener =
            TcpListener::bind(format!("{}:{}", self.config.host, self.config.port)).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(error) = served {
                error!(%error, "server exited with an error");
            }
        });

        info!(%addr, "listening");
        Ok((addr, handle))
    }

    /// Get the shutdown coordinator.
    #[must_use]
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.registry.count().await;
    Json(health::health_check(state.start_time, connections))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    metrics::render(&state.metrics)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
