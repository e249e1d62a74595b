//! Prometheus metrics recorder and `/metrics` rendering.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the global Prometheus metrics recorder.
///
/// Returns the handle used to render the `/metrics` endpoint. Must be called
/// once at startup, before any metrics are recorded.
///
/// # Panics
///
/// Panics if a recorder is already installed in this process.
#[must_use]
pub fn install_recorder() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

/// Render Prometheus text format from the installed recorder.
#[must_use]
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
