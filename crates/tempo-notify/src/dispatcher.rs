//! Delivery of notifications to live sessions.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use tempo_core::UserId;

use crate::payload::{Notification, OutboundFrame};
use crate::registry::SessionRegistry;

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The frame was queued on the owner's live session.
    Delivered,
    /// No live session, or its channel was full or closed.
    Missed,
}

/// Sends notifications to whichever session a user currently has.
///
/// A miss is not an error: the durable record (reminder row, metric row)
/// already exists by the time dispatch runs, and a reconnecting client
/// re-reads state anyway.
pub struct NotificationDispatcher {
    registry: Arc<dyn SessionRegistry>,
}

impl NotificationDispatcher {
    /// Create a dispatcher delivering through `registry`.
    #[must_use]
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Serialize once and try to queue the frame on the owner's session.
    pub async fn send_to_user(&self, owner: &UserId, notification: &Notification) -> Delivery {
        let frame = OutboundFrame::notification(notification);
        let json = match serde_json::to_string(&frame) {
            Ok(json) => json,
            Err(error) => {
                warn!(user = %owner, %error, "failed to serialize notification frame");
                return Delivery::Missed;
            }
        };

        let Some(session) = self.registry.lookup(owner).await else {
            debug!(user = %owner, kind = ?notification.kind, "no live session, notification missed");
            counter!("notifications_missed_total").increment(1);
            return Delivery::Missed;
        };

        if session.send(Arc::new(json)) {
            debug!(user = %owner, kind = ?notification.kind, "notification delivered");
            counter!("notifications_delivered_total").increment(1);
            Delivery::Delivered
        } else {
            warn!(
                user = %owner,
                connection = %session.connection_id,
                dropped = session.drop_count(),
                "session channel rejected notification frame"
            );
            counter!("notifications_missed_total").increment(1);
            Delivery::Missed
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
