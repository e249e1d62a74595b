//! Reminder scheduling and dispatch.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use tracing::{debug, error, info};

use tempo_core::time::{format_iso, parse_iso};
use tempo_core::{TaskId, UserId};
use tempo_notify::{Notification, NotificationDispatcher};
use tempo_store::{
    ConnectionPool, DueReminder, NewReminder, PooledConnection, Reminder, ReminderKind,
    ReminderRepository, StoreError, TaskRepository,
};

use crate::errors::{ReminderError, Result};

/// Hours before a task's due date used for the default reminder slot.
const DEFAULT_LEAD_HOURS: i64 = 12;
/// A sent reminder whose task falls due within this many hours escalates.
const URGENT_WINDOW_HOURS: i64 = 2;
/// Minutes after a triggering send at which the urgent follow-up fires.
const URGENT_LEAD_MINUTES: i64 = 30;
/// Sent reminders are retained this many days.
const RETENTION_DAYS: i64 = 30;

/// What one due-check tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueCheckSummary {
    /// Reminders dispatched and marked sent.
    pub dispatched: usize,
    /// Urgent follow-ups inserted.
    pub escalated: usize,
    /// Reminders whose processing failed; retried next tick.
    pub failed: usize,
}

/// Schedules reminders and drives the periodic due/retention passes.
pub struct ReminderService {
    pool: ConnectionPool,
    dispatcher: Arc<NotificationDispatcher>,
    due_window: std::time::Duration,
}

impl ReminderService {
    /// Create a service. `due_window` is how far back a due-check tick
    /// looks; it matches the tick interval so consecutive windows tile
    /// the timeline.
    #[must_use]
    pub fn new(
        pool: ConnectionPool,
        dispatcher: Arc<NotificationDispatcher>,
        due_window: std::time::Duration,
    ) -> Self {
        Self {
            pool,
            dispatcher,
            due_window,
        }
    }

    /// Create a reminder for a task the user owns.
    ///
    /// The slot is `custom_time` when given, otherwise 12 hours before the
    /// task's due date, otherwise 12 hours from now.
    pub fn schedule_reminder_for_task(
        &self,
        owner: &UserId,
        task_id: &TaskId,
        custom_time: Option<&str>,
    ) -> Result<Reminder> {
        let conn = self.conn()?;
        let task = TaskRepository::get(&conn, task_id)?
            .filter(|task| task.user_id == *owner)
            .ok_or_else(|| ReminderError::NotFound(task_id.clone()))?;

        let scheduled_at = match custom_time {
            Some(raw) => parse_iso(raw).ok_or_else(|| {
                ReminderError::Validation(format!("unparseable reminder time: {raw}"))
            })?,
            None => match task.due_date.as_deref().and_then(parse_iso) {
                Some(due) => due - Duration::hours(DEFAULT_LEAD_HOURS),
                None => Utc::now() + Duration::hours(DEFAULT_LEAD_HOURS),
            },
        };

        let reminder = ReminderRepository::create(
            &conn,
            &NewReminder {
                task_id: task.id.clone(),
                user_id: owner.clone(),
                title: format!("Task Reminder: {}", task.title),
                message: format!("Don't forget about your task: {}", task.title),
                scheduled_at: format_iso(scheduled_at),
                kind: ReminderKind::Notification,
            },
        )?;
        debug!(
            reminder = %reminder.id,
            task = %task.id,
            scheduled_at = %reminder.scheduled_at,
            "reminder scheduled"
        );
        Ok(reminder)
    }

    /// Dispatch every unsent reminder that fell due inside the window
    /// ending at `now`.
    ///
    /// Each reminder is sent to the owner's live session (a miss is fine),
    /// then marked sent. A crash between those two steps re-sends on the
    /// next pass. A failure on one reminder leaves the rest of the batch
    /// untouched.
    pub async fn run_due_check(&self, now: DateTime<Utc>) -> Result<DueCheckSummary> {
        let window_start = now - Duration::seconds(self.due_window.as_secs() as i64);
        let due = {
            let conn = self.conn()?;
            ReminderRepository::due_between(&conn, &format_iso(window_start), &format_iso(now))?
        };

        let mut summary = DueCheckSummary::default();
        for item in &due {
            match self.deliver(item, now).await {
                Ok(escalated) => {
                    summary.dispatched += 1;
                    if escalated {
                        summary.escalated += 1;
                    }
                }
                Err(err) => {
                    error!(reminder = %item.reminder.id, error = %err, "due reminder processing failed");
                    summary.failed += 1;
                }
            }
        }
        if summary.dispatched > 0 {
            info!(
                dispatched = summary.dispatched,
                escalated = summary.escalated,
                "due reminders processed"
            );
        }
        Ok(summary)
    }

    /// Delete sent reminders older than the retention horizon. Returns how
    /// many rows went away.
    pub fn run_retention(&self, now: DateTime<Utc>) -> Result<usize> {
        let cutoff = format_iso(now - Duration::days(RETENTION_DAYS));
        let conn = self.conn()?;
        let deleted = ReminderRepository::delete_sent_before(&conn, &cutoff)?;
        if deleted > 0 {
            info!(deleted, "swept old sent reminders");
        }
        Ok(deleted)
    }

    /// Send one due reminder, mark it, and escalate if the task is close
    /// to due. Returns whether a follow-up was inserted.
    async fn deliver(&self, due: &DueReminder, now: DateTime<Utc>) -> Result<bool> {
        let payload = Notification::reminder(
            &due.reminder.title,
            &due.reminder.message,
            &due.reminder.task_id,
            &due.task_title,
            &due.reminder.scheduled_at,
        );
        let outcome = self
            .dispatcher
            .send_to_user(&due.reminder.user_id, &payload)
            .await;

        let conn = self.conn()?;
        let _ = ReminderRepository::mark_sent(&conn, &due.reminder.id)?;
        counter!("reminders_sent_total").increment(1);
        debug!(reminder = %due.reminder.id, ?outcome, "reminder dispatched");

        if let Some(due_at) = due.task_due_date.as_deref().and_then(parse_iso) {
            let until_due = due_at - now;
            if until_due > Duration::zero() && until_due <= Duration::hours(URGENT_WINDOW_HOURS) {
                let follow_up = ReminderRepository::create(
                    &conn,
                    &NewReminder {
                        task_id: due.reminder.task_id.clone(),
                        user_id: due.reminder.user_id.clone(),
                        title: format!("URGENT: {}", due.task_title),
                        message: "Task is due soon! Complete it now.".to_string(),
                        scheduled_at: format_iso(now + Duration::minutes(URGENT_LEAD_MINUTES)),
                        kind: ReminderKind::Notification,
                    },
                )?;
                counter!("reminders_escalated_total").increment(1);
                info!(
                    reminder = %follow_up.id,
                    task = %due.reminder.task_id,
                    "urgent follow-up scheduled"
                );
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get().map_err(StoreError::from)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
