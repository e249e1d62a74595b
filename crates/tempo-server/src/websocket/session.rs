//! WebSocket session lifecycle — one connected client from upgrade through
//! disconnect.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use tempo_core::{ConnectionId, UserId};
use tempo_notify::{ClientSession, Notification};

use super::events::handle_client_event;
use crate::server::AppState;

/// Query parameters for `GET /ws`.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// The connecting user's id.
    pub user: String,
}

/// GET /ws?user=<id> — upgrade and run the session.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    if query.user.is_empty() {
        return (StatusCode::BAD_REQUEST, "missing user").into_response();
    }
    let owner = UserId::from(query.user.as_str());
    ws.on_upgrade(move |socket| run_ws_session(socket, owner, state))
}

/// Run a WebSocket session for a connected client.
///
/// 1. Registers a session with the registry (replacing any previous one)
/// 2. Sends the connection welcome notification
/// 3. Forwards outbound frames from the session channel to the socket
/// 4. Parses inbound text frames as client events
/// 5. Unregisters on disconnect, guarded by connection id
#[instrument(skip_all, fields(user = %owner))]
pub async fn run_ws_session(socket: WebSocket, owner: UserId, state: AppState) {
    let connection_id = ConnectionId::new();
    let (tx, mut outbound_rx) = mpsc::channel::<Arc<String>>(state.channel_capacity);
    let session = Arc::new(ClientSession::new(connection_id.clone(), tx));
    state.registry.register(&owner, session).await;

    info!(connection = %connection_id, "client connected");
    counter!("ws_connections_total").increment(1);
    gauge!("ws_connections_active").increment(1.0);

    let _ = state
        .dispatcher
        .send_to_user(&owner, &Notification::welcome())
        .await;

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Outbound forwarder: session channel → socket.
    let forwarder = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx
                .send(Message::Text(frame.to_string().into()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    while let Some(Ok(message)) = ws_rx.next().await {
        match message {
            Message::Text(text) => handle_client_event(&state, &owner, text.as_str()).await,
            Message::Close(_) => {
                debug!(connection = %connection_id, "client sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Binary(payload) => {
                debug!(
                    connection = %connection_id,
                    len = payload.len(),
                    "ignoring binary frame"
                );
            }
        }
    }

    info!(connection = %connection_id, "client disconnected");
    counter!("ws_disconnections_total").increment(1);
    gauge!("ws_connections_active").decrement(1.0);
    forwarder.abort();
    state.registry.unregister(&owner, &connection_id).await;
}
