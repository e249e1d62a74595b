//! Row types for the persistence layer.
//!
//! Serializable types use `camelCase` on the wire to match the existing
//! clients. Enum values are stored uppercase in SQL (mirroring the CHECK
//! constraints) and serialized the same way.

use serde::{Deserialize, Serialize};

use tempo_core::{ReminderId, TaskId, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Enums
// ─────────────────────────────────────────────────────────────────────────────

/// Task status in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started.
    Pending,
    /// Currently being worked on.
    InProgress,
    /// Done.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Whether this status represents a terminal (done) state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// SQL string representation (matches `SQLite` CHECK constraint values).
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Task priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    /// Low priority.
    Low,
    /// Default priority.
    Medium,
    /// Elevated priority.
    High,
    /// Needs attention now.
    Urgent,
}

impl TaskPriority {
    /// SQL string representation.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Delivery channel for a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderKind {
    /// In-app push over the live connection.
    Notification,
    /// Email delivery.
    Email,
    /// Mobile push delivery.
    Push,
}

impl ReminderKind {
    /// SQL string representation.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Notification => "NOTIFICATION",
            Self::Email => "EMAIL",
            Self::Push => "PUSH",
        }
    }
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain types
// ─────────────────────────────────────────────────────────────────────────────

/// A task owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique ID (prefixed: `task-{uuid}`).
    pub id: TaskId,
    /// Owning user.
    pub user_id: UserId,
    /// Short description.
    pub title: String,
    /// Detailed description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current status.
    pub status: TaskStatus,
    /// Priority level.
    pub priority: TaskPriority,
    /// When this task is due (ISO-8601 UTC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// When the task entered `Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// A scheduled reminder tied to a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    /// Unique ID (prefixed: `rem-{uuid}`).
    pub id: ReminderId,
    /// Task this reminder belongs to (cascade-deleted with it).
    pub task_id: TaskId,
    /// Owning user.
    pub user_id: UserId,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub message: String,
    /// When this reminder fires (ISO-8601 UTC).
    pub scheduled_at: String,
    /// Delivery channel.
    pub kind: ReminderKind,
    /// Whether the due-check has already dispatched this reminder.
    pub is_sent: bool,
    /// Creation timestamp.
    pub created_at: String,
}

/// A reminder joined with its task, as selected by the due-check.
#[derive(Debug, Clone)]
pub struct DueReminder {
    /// The reminder row.
    pub reminder: Reminder,
    /// Title of the joined task.
    pub task_title: String,
    /// Due date of the joined task, if any (drives urgent escalation).
    pub task_due_date: Option<String>,
}

/// One user's productivity metrics for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMetric {
    /// Unique ID (prefixed: `met-{uuid}`).
    pub id: String,
    /// Owning user.
    pub user_id: UserId,
    /// Calendar day key (`YYYY-MM-DD`, per the configured day boundary).
    pub metric_date: String,
    /// Tasks with a due date on this day.
    pub tasks_planned: i64,
    /// Tasks completed on this day.
    pub tasks_completed: i64,
    /// Journal entries written on this day.
    pub journal_entries: i64,
    /// Focused minutes logged on this day.
    pub focus_minutes: i64,
    /// Whether the user's streak was alive on this day.
    pub streak_active: bool,
    /// Composite productivity score in [0, 1].
    pub score: f64,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// One user's streak ledger row for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakDay {
    /// Unique ID (prefixed: `str-{uuid}`).
    pub id: String,
    /// Owning user.
    pub user_id: UserId,
    /// Calendar day key (`YYYY-MM-DD`).
    pub streak_date: String,
    /// Completions recorded on this day.
    pub tasks_completed: i64,
    /// Whether this day still counts toward the live chain.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Mutation params
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters for creating a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Owning user.
    pub user_id: UserId,
    /// Short description (required).
    pub title: String,
    /// Detailed description.
    pub description: Option<String>,
    /// Initial status (default: Pending).
    pub status: Option<TaskStatus>,
    /// Initial priority (default: Medium).
    pub priority: Option<TaskPriority>,
    /// Due date (ISO-8601 UTC).
    pub due_date: Option<String>,
}

impl NewTask {
    /// Minimal params: a titled task for a user, everything else defaulted.
    #[must_use]
    pub fn titled(user_id: UserId, title: impl Into<String>) -> Self {
        Self {
            user_id,
            title: title.into(),
            description: None,
            status: None,
            priority: None,
            due_date: None,
        }
    }
}

/// Parameters for creating a reminder.
#[derive(Debug, Clone)]
pub struct NewReminder {
    /// Task the reminder belongs to.
    pub task_id: TaskId,
    /// Owning user.
    pub user_id: UserId,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub message: String,
    /// When the reminder fires (ISO-8601 UTC).
    pub scheduled_at: String,
    /// Delivery channel.
    pub kind: ReminderKind,
}

/// Full-row upsert parameters for a daily metric, keyed on (user, day).
#[derive(Debug, Clone)]
pub struct MetricUpsert {
    /// Owning user.
    pub user_id: UserId,
    /// Calendar day key (`YYYY-MM-DD`).
    pub metric_date: String,
    /// Tasks with a due date on this day.
    pub tasks_planned: i64,
    /// Tasks completed on this day.
    pub tasks_completed: i64,
    /// Journal entries written on this day.
    pub journal_entries: i64,
    /// Focused minutes logged on this day.
    pub focus_minutes: i64,
    /// Whether the streak was alive on this day.
    pub streak_active: bool,
    /// Composite score in [0, 1].
    pub score: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
