//! Inbound client event handling.
//!
//! Clients push `{"event": "...", "data": {...}}` frames describing state
//! changes they have already persisted through the task/journal surface.
//! The server reacts with metric and streak writes plus notifications; a
//! handler failure is logged and never tears down the connection.

use chrono::Utc;
use metrics::counter;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use tempo_core::UserId;
use tempo_notify::Notification;

use crate::server::AppState;

/// One inbound client frame.
#[derive(Debug, Deserialize)]
pub struct ClientEvent {
    /// Event name, e.g. `task:updated`.
    pub event: String,
    /// Event payload; shape depends on the event.
    #[serde(default)]
    pub data: Value,
}

/// Parse and react to one inbound text frame.
pub async fn handle_client_event(state: &AppState, owner: &UserId, text: &str) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(error) => {
            warn!(user = %owner, %error, "client sent an unparseable frame");
            return;
        }
    };

    counter!("client_events_total", "event" => event.event.clone()).increment(1);

    match event.event.as_str() {
        "task:created" => on_task_created(state, owner, &event.data).await,
        "task:updated" => on_task_updated(state, owner, &event.data).await,
        "journal:created" => on_journal_created(state, owner, &event.data).await,
        other => debug!(user = %owner, event = other, "ignoring unknown client event"),
    }
}

/// Newly created tasks only matter here when they are urgent.
async fn on_task_created(state: &AppState, owner: &UserId, data: &Value) {
    if data.get("priority").and_then(Value::as_str) != Some("URGENT") {
        return;
    }
    let title = data.get("title").and_then(Value::as_str).unwrap_or_default();
    let _ = state
        .dispatcher
        .send_to_user(owner, &Notification::urgent_task(title, data.clone()))
        .await;
}

/// The completion flow. Clients emit `task:updated` with `COMPLETED` exactly
/// once per transition into that status, after persisting the task row.
async fn on_task_updated(state: &AppState, owner: &UserId, data: &Value) {
    if data.get("status").and_then(Value::as_str) != Some("COMPLETED") {
        return;
    }
    let now = Utc::now();

    if let Err(error) = state.engine.record_completion(owner, now) {
        error!(user = %owner, %error, "failed to record completion metric");
    }
    if let Err(error) = state.tracker.on_task_completed(owner, now) {
        error!(user = %owner, %error, "failed to update completion streak");
    }

    let title = data.get("title").and_then(Value::as_str).unwrap_or_default();
    let _ = state
        .dispatcher
        .send_to_user(owner, &Notification::task_completed(title, data.clone()))
        .await;

    match state.tracker.current_streak_length(owner) {
        Ok(streak) if streak > 0 && streak % 7 == 0 => {
            let _ = state
                .dispatcher
                .send_to_user(owner, &Notification::streak_milestone(streak))
                .await;
        }
        Ok(_) => {}
        Err(error) => error!(user = %owner, %error, "failed to read streak length"),
    }
}

/// Low-mood journal entries get a supportive nudge.
async fn on_journal_created(state: &AppState, owner: &UserId, data: &Value) {
    let low_mood = data
        .get("mood")
        .and_then(Value::as_i64)
        .is_some_and(|mood| mood <= 2);
    if !low_mood {
        return;
    }
    let _ = state
        .dispatcher
        .send_to_user(owner, &Notification::mood_support(data.clone()))
        .await;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
