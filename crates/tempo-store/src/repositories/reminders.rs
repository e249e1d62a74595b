//! Reminder repository.
//!
//! The due-check query joins each pending reminder with its task so the
//! scheduler can build the payload and decide on urgent escalation without
//! a second lookup. `is_sent` is flipped only after a dispatch attempt;
//! the retention sweep deletes sent rows past the cutoff.

use rusqlite::{Connection, OptionalExtension, params};

use tempo_core::{ReminderId, TaskId, UserId, now_iso};

use crate::errors::Result;
use crate::types::{DueReminder, NewReminder, Reminder, ReminderKind};

/// Reminder repository — stateless, every method takes `&Connection`.
pub struct ReminderRepository;

impl ReminderRepository {
    /// Create a new unsent reminder.
    pub fn create(conn: &Connection, new: &NewReminder) -> Result<Reminder> {
        let id = ReminderId::new();
        let now = now_iso();

        let _ = conn.execute(
            "INSERT INTO reminders (id, task_id, user_id, title, message,
                                    scheduled_at, kind, is_sent, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)",
            params![
                id.as_str(),
                new.task_id.as_str(),
                new.user_id.as_str(),
                new.title,
                new.message,
                new.scheduled_at,
                new.kind.as_sql(),
                now,
            ],
        )?;

        Ok(Reminder {
            id,
            task_id: new.task_id.clone(),
            user_id: new.user_id.clone(),
            title: new.title.clone(),
            message: new.message.clone(),
            scheduled_at: new.scheduled_at.clone(),
            kind: new.kind,
            is_sent: false,
            created_at: now,
        })
    }

    /// Get a reminder by ID.
    pub fn get(conn: &Connection, id: &ReminderId) -> Result<Option<Reminder>> {
        let reminder = conn
            .query_row(
                "SELECT id, task_id, user_id, title, message, scheduled_at,
                        kind, is_sent, created_at
                 FROM reminders WHERE id = ?1",
                params![id.as_str()],
                Self::map_row,
            )
            .optional()?;
        Ok(reminder)
    }

    /// Unsent reminders scheduled within `[from, to]` (inclusive), joined
    /// with their task, ordered by schedule time. Spans all users — the
    /// due-check loop is global.
    pub fn due_between(conn: &Connection, from: &str, to: &str) -> Result<Vec<DueReminder>> {
        let mut stmt = conn.prepare(
            "SELECT r.id, r.task_id, r.user_id, r.title, r.message, r.scheduled_at,
                    r.kind, r.is_sent, r.created_at, t.title, t.due_date
             FROM reminders r
             JOIN tasks t ON t.id = r.task_id
             WHERE r.is_sent = 0 AND r.scheduled_at >= ?1 AND r.scheduled_at <= ?2
             ORDER BY r.scheduled_at",
        )?;
        let rows = stmt
            .query_map(params![from, to], |row| {
                Ok(DueReminder {
                    reminder: Self::map_row(row)?,
                    task_title: row.get(9)?,
                    task_due_date: row.get(10)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Mark a reminder as sent. Returns whether a row was updated.
    pub fn mark_sent(conn: &Connection, id: &ReminderId) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE reminders SET is_sent = 1 WHERE id = ?1",
            params![id.as_str()],
        )?;
        Ok(changed > 0)
    }

    /// All of a user's reminders, soonest first.
    pub fn list_for_user(conn: &Connection, user_id: &UserId) -> Result<Vec<Reminder>> {
        let mut stmt = conn.prepare(
            "SELECT id, task_id, user_id, title, message, scheduled_at,
                    kind, is_sent, created_at
             FROM reminders WHERE user_id = ?1
             ORDER BY scheduled_at",
        )?;
        let rows = stmt
            .query_map(params![user_id.as_str()], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Delete a reminder before it fires. Returns whether a row was removed.
    pub fn delete(conn: &Connection, id: &ReminderId) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM reminders WHERE id = ?1",
            params![id.as_str()],
        )?;
        Ok(changed > 0)
    }

    /// Retention sweep: delete sent reminders scheduled before `cutoff`.
    /// Returns how many rows were removed. Unsent reminders are never
    /// touched regardless of age.
    pub fn delete_sent_before(conn: &Connection, cutoff: &str) -> Result<usize> {
        let deleted = conn.execute(
            "DELETE FROM reminders WHERE is_sent = 1 AND scheduled_at < ?1",
            params![cutoff],
        )?;
        Ok(deleted)
    }

    /// Map a rusqlite row to `Reminder`.
    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reminder> {
        let kind: String = row.get(6)?;
        Ok(Reminder {
            id: ReminderId::from_string(row.get(0)?),
            task_id: TaskId::from_string(row.get(1)?),
            user_id: UserId::from_string(row.get(2)?),
            title: row.get(3)?,
            message: row.get(4)?,
            scheduled_at: row.get(5)?,
            kind: match kind.as_str() {
                "EMAIL" => ReminderKind::Email,
                "PUSH" => ReminderKind::Push,
                _ => ReminderKind::Notification,
            },
            is_sent: row.get::<_, i32>(7)? == 1,
            created_at: row.get(8)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
