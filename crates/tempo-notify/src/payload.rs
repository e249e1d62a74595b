//! Notification payloads sent over the live channel.
//!
//! Payloads are ephemeral. Each one exists for a single delivery attempt;
//! nothing here is persisted or retried. Durable state (the reminder row,
//! the metric row) is the caller's responsibility.

use serde::Serialize;

use tempo_core::TaskId;
use tempo_core::time::now_iso;

/// Discriminates the notification shapes the client renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Reminder,
    UrgentTask,
    TaskCompleted,
    StreakMilestone,
    MoodSupport,
    Connection,
}

/// One notification as the client sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Notification {
    /// A scheduled reminder firing. Title and message come from the stored
    /// reminder row.
    #[must_use]
    pub fn reminder(
        title: impl Into<String>,
        message: impl Into<String>,
        task_id: &TaskId,
        task_title: &str,
        scheduled_at: &str,
    ) -> Self {
        Self {
            kind: NotificationKind::Reminder,
            title: title.into(),
            message: message.into(),
            data: Some(serde_json::json!({
                "taskId": task_id,
                "taskTitle": task_title,
                "scheduledAt": scheduled_at,
            })),
        }
    }

    /// A task was created with urgent priority. `data` echoes the client's
    /// event payload back.
    #[must_use]
    pub fn urgent_task(task_title: &str, data: serde_json::Value) -> Self {
        Self {
            kind: NotificationKind::UrgentTask,
            title: "Urgent Task Created".to_string(),
            message: format!("Task \"{task_title}\" has been marked as urgent"),
            data: Some(data),
        }
    }

    /// Congratulation on completing a task.
    #[must_use]
    pub fn task_completed(task_title: &str, data: serde_json::Value) -> Self {
        Self {
            kind: NotificationKind::TaskCompleted,
            title: "Task Completed! 🎉".to_string(),
            message: format!("Great job! You completed \"{task_title}\""),
            data: Some(data),
        }
    }

    /// Streak reached a week multiple.
    #[must_use]
    pub fn streak_milestone(days: u32) -> Self {
        Self {
            kind: NotificationKind::StreakMilestone,
            title: "Amazing Streak! 🔥".to_string(),
            message: format!("You've maintained a {days}-day streak!"),
            data: Some(serde_json::json!({ "streak": days })),
        }
    }

    /// Encouragement after a low-mood journal entry. `data` echoes the
    /// client's event payload back.
    #[must_use]
    pub fn mood_support(data: serde_json::Value) -> Self {
        Self {
            kind: NotificationKind::MoodSupport,
            title: "Feeling Better Soon 💙".to_string(),
            message: "Journaling helps. Tomorrow is a new day!".to_string(),
            data: Some(data),
        }
    }

    /// Greeting sent right after a session registers.
    #[must_use]
    pub fn welcome() -> Self {
        Self {
            kind: NotificationKind::Connection,
            title: "Welcome Back! 👋".to_string(),
            message: "You're now connected to Tempo real-time updates".to_string(),
            data: None,
        }
    }
}

/// Wire envelope around a payload on the WebSocket channel.
#[derive(Debug, Serialize)]
pub struct OutboundFrame<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub timestamp: String,
    pub data: &'a Notification,
}

impl<'a> OutboundFrame<'a> {
    /// Wrap a notification, stamping the current time.
    #[must_use]
    pub fn notification(payload: &'a Notification) -> Self {
        Self {
            kind: "notification",
            timestamp: now_iso(),
            data: payload,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
