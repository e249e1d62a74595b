//! Axum HTTP + WebSocket transport for Tempo.
//!
//! One router serves three routes:
//!
//! - `GET /health` — status, uptime, live connection count
//! - `GET /metrics` — Prometheus exposition
//! - `GET /ws?user=<id>` — the per-user notification socket
//!
//! The socket registers a [`tempo_notify::ClientSession`] on connect, replays
//! nothing (clients re-read durable state), forwards outbound notification
//! frames, and reacts to inbound client events with metric, streak, and
//! notification side effects.

pub mod config;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use server::{AppState, ServerDeps, TempoServer};
pub use shutdown::ShutdownCoordinator;
