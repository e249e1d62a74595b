//! Live session registry.
//!
//! One session per user: a reconnecting client replaces the previous
//! entry, so delivery never fans out to multiple devices. Unregister is
//! guarded by connection id so a stale disconnect cannot evict the
//! session that replaced it.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};

use tempo_core::{ConnectionId, UserId};

/// A connected client's send handle.
pub struct ClientSession {
    /// Identifies the underlying connection for guarded unregister.
    pub connection_id: ConnectionId,
    tx: mpsc::Sender<Arc<String>>,
    dropped_frames: AtomicU64,
}

impl ClientSession {
    /// Wrap the write half of a connection.
    #[must_use]
    pub fn new(connection_id: ConnectionId, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            connection_id,
            tx,
            dropped_frames: AtomicU64::new(0),
        }
    }

    /// Queue a pre-serialized frame without blocking.
    ///
    /// Returns `false` if the channel is full or closed; the frame is
    /// dropped and counted.
    pub fn send(&self, frame: Arc<String>) -> bool {
        if self.tx.try_send(frame).is_ok() {
            true
        } else {
            let _ = self.dropped_frames.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Frames dropped on this session so far.
    #[must_use]
    pub fn drop_count(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }
}

/// Where live sessions register and get looked up.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Bind a session to its owner, replacing any existing one.
    async fn register(&self, owner: &UserId, session: Arc<ClientSession>);

    /// Remove the owner's session, but only if it still belongs to
    /// `connection_id`.
    async fn unregister(&self, owner: &UserId, connection_id: &ConnectionId);

    /// The owner's current session, if any.
    async fn lookup(&self, owner: &UserId) -> Option<Arc<ClientSession>>;

    /// Number of live sessions.
    async fn count(&self) -> usize;
}

/// Process-local registry over a [`RwLock`]ed map.
#[derive(Default)]
pub struct InMemorySessionRegistry {
    sessions: RwLock<HashMap<UserId, Arc<ClientSession>>>,
}

impl InMemorySessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn register(&self, owner: &UserId, session: Arc<ClientSession>) {
        let mut sessions = self.sessions.write().await;
        let _ = sessions.insert(owner.clone(), session);
    }

    async fn unregister(&self, owner: &UserId, connection_id: &ConnectionId) {
        let mut sessions = self.sessions.write().await;
        if sessions
            .get(owner)
            .is_some_and(|session| session.connection_id == *connection_id)
        {
            let _ = sessions.remove(owner);
        }
    }

    async fn lookup(&self, owner: &UserId) -> Option<Arc<ClientSession>> {
        self.sessions.read().await.get(owner).cloned()
    }

    async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_session(conn_id: &str) -> (Arc<ClientSession>, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(32);
        (
            Arc::new(ClientSession::new(ConnectionId::from(conn_id), tx)),
            rx,
        )
    }

    #[tokio::test]
    async fn register_and_lookup() {
        let registry = InMemorySessionRegistry::new();
        let user = UserId::from("user-1");
        let (session, _rx) = make_session("conn-1");

        registry.register(&user, session).await;
        assert_eq!(registry.count().await, 1);
        let found = registry.lookup(&user).await.unwrap();
        assert_eq!(found.connection_id.as_str(), "conn-1");
    }

    #[tokio::test]
    async fn lookup_unknown_user_is_none() {
        let registry = InMemorySessionRegistry::new();
        assert!(registry.lookup(&UserId::from("user-x")).await.is_none());
    }

    #[tokio::test]
    async fn reconnect_replaces_previous_session() {
        let registry = InMemorySessionRegistry::new();
        let user = UserId::from("user-1");
        let (first, _rx1) = make_session("conn-1");
        let (second, _rx2) = make_session("conn-2");

        registry.register(&user, first).await;
        registry.register(&user, second).await;

        assert_eq!(registry.count().await, 1);
        let found = registry.lookup(&user).await.unwrap();
        assert_eq!(found.connection_id.as_str(), "conn-2");
    }

    #[tokio::test]
    async fn unregister_removes_matching_connection() {
        let registry = InMemorySessionRegistry::new();
        let user = UserId::from("user-1");
        let (session, _rx) = make_session("conn-1");

        registry.register(&user, session).await;
        registry.unregister(&user, &ConnectionId::from("conn-1")).await;
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn stale_unregister_leaves_replacement_in_place() {
        let registry = InMemorySessionRegistry::new();
        let user = UserId::from("user-1");
        let (first, _rx1) = make_session("conn-1");
        let (second, _rx2) = make_session("conn-2");

        registry.register(&user, first).await;
        registry.register(&user, second).await;
        // The old connection's teardown fires after the reconnect
        registry.unregister(&user, &ConnectionId::from("conn-1")).await;

        let found = registry.lookup(&user).await.unwrap();
        assert_eq!(found.connection_id.as_str(), "conn-2");
    }

    #[tokio::test]
    async fn unregister_unknown_user_is_a_no_op() {
        let registry = InMemorySessionRegistry::new();
        registry
            .unregister(&UserId::from("user-x"), &ConnectionId::from("conn-1"))
            .await;
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn session_send_delivers_frames_in_order() {
        let (session, mut rx) = make_session("conn-1");
        assert!(session.send(Arc::new("first".to_string())));
        assert!(session.send(Arc::new("second".to_string())));

        assert_eq!(*rx.recv().await.unwrap(), "first");
        assert_eq!(*rx.recv().await.unwrap(), "second");
    }

    #[tokio::test]
    async fn session_send_to_full_channel_counts_a_drop() {
        let (tx, _rx) = mpsc::channel(1);
        let session = ClientSession::new(ConnectionId::from("conn-1"), tx);

        assert!(session.send(Arc::new("fits".to_string())));
        assert!(!session.send(Arc::new("dropped".to_string())));
        assert_eq!(session.drop_count(), 1);
    }

    #[tokio::test]
    async fn session_send_to_closed_channel_fails() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let session = ClientSession::new(ConnectionId::from("conn-1"), tx);

        assert!(!session.send(Arc::new("gone".to_string())));
        assert_eq!(session.drop_count(), 1);
    }
}
