//! Task repository.
//!
//! Tasks are mutated by the CRUD layer upstream; this crate reads them for
//! metric derivation and reminder scheduling. The windowed count queries
//! re-derive planned/completed totals from the table on every call, so the
//! metric engine stays correct after edits and deletes.

use rusqlite::{Connection, OptionalExtension, params};

use tempo_core::{TaskId, UserId, now_iso};

use crate::errors::Result;
use crate::types::{NewTask, Task, TaskPriority, TaskStatus};

/// Task repository — stateless, every method takes `&Connection`.
pub struct TaskRepository;

impl TaskRepository {
    /// Create a new task.
    pub fn create(conn: &Connection, new: &NewTask) -> Result<Task> {
        let id = TaskId::new();
        let now = now_iso();
        let status = new.status.unwrap_or(TaskStatus::Pending);
        let priority = new.priority.unwrap_or(TaskPriority::Medium);

        let _ = conn.execute(
            "INSERT INTO tasks (id, user_id, title, description, status, priority,
                                due_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                id.as_str(),
                new.user_id.as_str(),
                new.title,
                new.description,
                status.as_sql(),
                priority.as_sql(),
                new.due_date,
                now,
            ],
        )?;

        Ok(Task {
            id,
            user_id: new.user_id.clone(),
            title: new.title.clone(),
            description: new.description.clone(),
            status,
            priority,
            due_date: new.due_date.clone(),
            completed_at: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get a task by ID.
    pub fn get(conn: &Connection, id: &TaskId) -> Result<Option<Task>> {
        let task = conn
            .query_row(
                "SELECT id, user_id, title, description, status, priority,
                        due_date, completed_at, created_at, updated_at
                 FROM tasks WHERE id = ?1",
                params![id.as_str()],
                Self::map_row,
            )
            .optional()?;
        Ok(task)
    }

    /// Transition a task's status. Completing stamps `completed_at`; any
    /// other transition clears it. Returns the updated task, or `None` if
    /// the task does not exist.
    pub fn set_status(conn: &Connection, id: &TaskId, status: TaskStatus) -> Result<Option<Task>> {
        let now = now_iso();
        let completed_at = (status == TaskStatus::Completed).then(|| now.clone());

        let changed = conn.execute(
            "UPDATE tasks SET status = ?1, completed_at = ?2, updated_at = ?3 WHERE id = ?4",
            params![status.as_sql(), completed_at, now, id.as_str()],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id)
    }

    /// Delete a task (reminders cascade). Returns whether a row was removed.
    pub fn delete(conn: &Connection, id: &TaskId) -> Result<bool> {
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.as_str()])?;
        Ok(changed > 0)
    }

    /// Count tasks due within `[from, to)` for a user.
    pub fn count_planned_in_window(
        conn: &Connection,
        user_id: &UserId,
        from: &str,
        to: &str,
    ) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM tasks
             WHERE user_id = ?1 AND due_date >= ?2 AND due_date < ?3",
            params![user_id.as_str(), from, to],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count tasks completed within `[from, to)` for a user.
    pub fn count_completed_in_window(
        conn: &Connection,
        user_id: &UserId,
        from: &str,
        to: &str,
    ) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM tasks
             WHERE user_id = ?1 AND status = 'COMPLETED'
               AND completed_at >= ?2 AND completed_at < ?3",
            params![user_id.as_str(), from, to],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Count a user's all-time completed tasks.
    pub fn count_all_completed(conn: &Connection, user_id: &UserId) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND status = 'COMPLETED'",
            params![user_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Map a rusqlite row to `Task`.
    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
        let status: String = row.get(4)?;
        let priority: String = row.get(5)?;
        Ok(Task {
            id: TaskId::from_string(row.get(0)?),
            user_id: UserId::from_string(row.get(1)?),
            title: row.get(2)?,
            description: row.get(3)?,
            status: match status.as_str() {
                "IN_PROGRESS" => TaskStatus::InProgress,
                "COMPLETED" => TaskStatus::Completed,
                "CANCELLED" => TaskStatus::Cancelled,
                _ => TaskStatus::Pending,
            },
            priority: match priority.as_str() {
                "LOW" => TaskPriority::Low,
                "HIGH" => TaskPriority::High,
                "URGENT" => TaskPriority::Urgent,
                _ => TaskPriority::Medium,
            },
            due_date: row.get(6)?,
            completed_at: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
