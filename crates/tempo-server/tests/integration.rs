//! End-to-end tests using a real WebSocket client.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use tempo_core::{DayBoundary, UserId};
use tempo_insights::{MetricEngine, StreakTracker};
use tempo_notify::{InMemorySessionRegistry, NotificationDispatcher, SessionRegistry};
use tempo_server::{ServerConfig, ServerDeps, TempoServer};
use tempo_store::{
    ConnectionPool, DailyMetricRepository, NewTask, StoreConfig, StreakRepository, TaskRepository,
    TaskStatus, open_in_memory, run_migrations,
};

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

struct TestServer {
    server: TempoServer,
    handle: tokio::task::JoinHandle<()>,
    registry: Arc<InMemorySessionRegistry>,
    pool: ConnectionPool,
    ws_base: String,
}

async fn boot_server() -> TestServer {
    let pool = open_in_memory(&StoreConfig::default()).unwrap();
    {
        let conn = pool.get().unwrap();
        let _ = run_migrations(&conn).unwrap();
    }
    let registry = Arc::new(InMemorySessionRegistry::new());
    let boundary = DayBoundary::utc();
    let deps = ServerDeps {
        registry: registry.clone(),
        dispatcher: Arc::new(NotificationDispatcher::new(registry.clone())),
        engine: Arc::new(MetricEngine::new(pool.clone(), boundary)),
        tracker: Arc::new(StreakTracker::new(pool.clone(), boundary)),
        metrics: metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle(),
    };

    // Default config binds 127.0.0.1:0 (auto-assign).
    let server = TempoServer::new(ServerConfig::default(), deps);
    let (addr, handle) = server.listen().await.unwrap();

    TestServer {
        server,
        handle,
        registry,
        pool,
        ws_base: format!("ws://{addr}/ws"),
    }
}

async fn connect(ts: &TestServer, user: &str) -> WsStream {
    let (ws, _) = connect_async(format!("{}?user={user}", ts.ws_base))
        .await
        .unwrap();
    ws
}

/// Read the next text frame as JSON.
async fn read_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("timeout waiting for a frame")
            .expect("stream closed")
            .expect("ws error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn send_event(ws: &mut WsStream, event: &Value) {
    ws.send(Message::text(event.to_string())).await.unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn welcome_frame_sent_on_connect() {
    let ts = boot_server().await;
    let mut ws = connect(&ts, "user-1").await;

    let frame = read_json(&mut ws).await;
    assert_eq!(frame["type"], "notification");
    assert!(frame["timestamp"].is_string());
    assert_eq!(frame["data"]["type"], "connection");
    assert_eq!(frame["data"]["title"], "Welcome Back! 👋");

    ts.server.shutdown().shutdown();
}

#[tokio::test]
async fn connected_session_is_registered() {
    let ts = boot_server().await;
    let mut ws = connect(&ts, "user-1").await;

    // The welcome frame proves registration completed server-side.
    let _welcome = read_json(&mut ws).await;
    assert_eq!(ts.registry.count().await, 1);
    assert!(
        ts.registry
            .lookup(&UserId::from("user-1"))
            .await
            .is_some()
    );

    ts.server.shutdown().shutdown();
}

#[tokio::test]
async fn completion_event_round_trip() {
    let ts = boot_server().await;
    let owner = UserId::from("user-1");

    {
        let conn = ts.pool.get().unwrap();
        let task =
            TaskRepository::create(&conn, &NewTask::titled(owner.clone(), "Ship the report"))
                .unwrap();
        let _ = TaskRepository::set_status(&conn, &task.id, TaskStatus::Completed).unwrap();
    }

    let mut ws = connect(&ts, "user-1").await;
    let _welcome = read_json(&mut ws).await;

    send_event(
        &mut ws,
        &json!({
            "event": "task:updated",
            "data": {"title": "Ship the report", "status": "COMPLETED"},
        }),
    )
    .await;

    let frame = read_json(&mut ws).await;
    assert_eq!(frame["type"], "notification");
    assert_eq!(frame["data"]["type"], "task_completed");
    assert_eq!(
        frame["data"]["message"],
        "Great job! You completed \"Ship the report\""
    );

    // The durable side of the flow: metric and streak rows for today.
    let today = DayBoundary::utc().date_key(chrono::Utc::now());
    let conn = ts.pool.get().unwrap();
    let metric = DailyMetricRepository::get(&conn, &owner, &today)
        .unwrap()
        .expect("metric row");
    assert_eq!(metric.tasks_completed, 1);
    let streak = StreakRepository::get(&conn, &owner, &today)
        .unwrap()
        .expect("streak row");
    assert_eq!(streak.tasks_completed, 1);

    ts.server.shutdown().shutdown();
}

#[tokio::test]
async fn urgent_task_event_round_trip() {
    let ts = boot_server().await;
    let mut ws = connect(&ts, "user-1").await;
    let _welcome = read_json(&mut ws).await;

    send_event(
        &mut ws,
        &json!({
            "event": "task:created",
            "data": {"title": "Pay rent", "priority": "URGENT"},
        }),
    )
    .await;

    let frame = read_json(&mut ws).await;
    assert_eq!(frame["data"]["type"], "urgent_task");
    assert_eq!(
        frame["data"]["message"],
        "Task \"Pay rent\" has been marked as urgent"
    );

    ts.server.shutdown().shutdown();
}

#[tokio::test]
async fn low_mood_journal_round_trip() {
    let ts = boot_server().await;
    let mut ws = connect(&ts, "user-1").await;
    let _welcome = read_json(&mut ws).await;

    send_event(
        &mut ws,
        &json!({
            "event": "journal:created",
            "data": {"mood": 1, "content": "rough day"},
        }),
    )
    .await;

    let frame = read_json(&mut ws).await;
    assert_eq!(frame["data"]["type"], "mood_support");
    assert_eq!(frame["data"]["title"], "Feeling Better Soon 💙");

    ts.server.shutdown().shutdown();
}

#[tokio::test]
async fn bad_frames_do_not_kill_the_connection() {
    let ts = boot_server().await;
    let mut ws = connect(&ts, "user-1").await;
    let _welcome = read_json(&mut ws).await;

    ws.send(Message::text("definitely not json")).await.unwrap();
    send_event(&mut ws, &json!({"event": "task:deleted", "data": {}})).await;

    // A known event after the garbage still round-trips.
    send_event(
        &mut ws,
        &json!({
            "event": "task:created",
            "data": {"title": "Still here", "priority": "URGENT"},
        }),
    )
    .await;

    let frame = read_json(&mut ws).await;
    assert_eq!(frame["data"]["type"], "urgent_task");

    ts.server.shutdown().shutdown();
}

#[tokio::test]
async fn registry_empty_after_disconnect() {
    let ts = boot_server().await;
    let mut ws = connect(&ts, "user-1").await;
    let _welcome = read_json(&mut ws).await;
    assert_eq!(ts.registry.count().await, 1);

    ws.close(None).await.unwrap();
    drop(ws);

    // Unregistration happens on the session task; poll until it lands.
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    while ts.registry.count().await != 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "session was not unregistered after disconnect"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    ts.server.shutdown().shutdown();
}

#[tokio::test]
async fn reconnect_replaces_the_previous_session() {
    let ts = boot_server().await;
    let mut first = connect(&ts, "user-1").await;
    let _welcome = read_json(&mut first).await;

    let mut second = connect(&ts, "user-1").await;
    let _welcome = read_json(&mut second).await;

    assert_eq!(ts.registry.count().await, 1);

    ts.server.shutdown().shutdown();
}

#[tokio::test]
async fn sessions_are_per_user() {
    let ts = boot_server().await;
    let mut alice = connect(&ts, "user-alice").await;
    let _welcome = read_json(&mut alice).await;
    let mut bob = connect(&ts, "user-bob").await;
    let _welcome = read_json(&mut bob).await;

    assert_eq!(ts.registry.count().await, 2);

    // Alice's event produces a frame for Alice only.
    send_event(
        &mut alice,
        &json!({
            "event": "task:created",
            "data": {"title": "Alice's errand", "priority": "URGENT"},
        }),
    )
    .await;
    let frame = read_json(&mut alice).await;
    assert_eq!(frame["data"]["type"], "urgent_task");

    ts.server.shutdown().shutdown();
}

#[tokio::test]
async fn graceful_shutdown_stops_the_listener() {
    let ts = boot_server().await;
    ts.server.shutdown().shutdown();

    timeout(TIMEOUT, ts.handle)
        .await
        .expect("shutdown timed out")
        .expect("join error");
}
