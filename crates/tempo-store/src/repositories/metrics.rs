//! Daily metric repository.
//!
//! One row per (user, day), upserted atomically. The metric engine always
//! writes the full derived row; `ON CONFLICT` keeps the original `id` and
//! `created_at` when the day already exists.

use rusqlite::{Connection, OptionalExtension, params};

use tempo_core::{UserId, now_iso};

use crate::errors::Result;
use crate::repositories::generate_id;
use crate::types::{DailyMetric, MetricUpsert};

/// Daily metric repository — stateless, every method takes `&Connection`.
pub struct DailyMetricRepository;

impl DailyMetricRepository {
    /// Insert or replace the metric row for (user, day). Returns the stored
    /// row.
    pub fn upsert(conn: &Connection, up: &MetricUpsert) -> Result<DailyMetric> {
        let id = generate_id("met");
        let now = now_iso();

        let _ = conn.execute(
            "INSERT INTO daily_metrics (id, user_id, metric_date, tasks_planned,
                 tasks_completed, journal_entries, focus_minutes, streak_active,
                 score, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
             ON CONFLICT (user_id, metric_date) DO UPDATE SET
                 tasks_planned = excluded.tasks_planned,
                 tasks_completed = excluded.tasks_completed,
                 journal_entries = excluded.journal_entries,
                 focus_minutes = excluded.focus_minutes,
                 streak_active = excluded.streak_active,
                 score = excluded.score,
                 updated_at = excluded.updated_at",
            params![
                id,
                up.user_id.as_str(),
                up.metric_date,
                up.tasks_planned,
                up.tasks_completed,
                up.journal_entries,
                up.focus_minutes,
                up.streak_active as i32,
                up.score,
                now,
            ],
        )?;

        Self::fetch(conn, &up.user_id, &up.metric_date)
    }

    /// Get the metric row for (user, day), if present.
    pub fn get(conn: &Connection, user_id: &UserId, date: &str) -> Result<Option<DailyMetric>> {
        let metric = conn
            .query_row(
                "SELECT id, user_id, metric_date, tasks_planned, tasks_completed,
                        journal_entries, focus_minutes, streak_active, score,
                        created_at, updated_at
                 FROM daily_metrics WHERE user_id = ?1 AND metric_date = ?2",
                params![user_id.as_str(), date],
                Self::map_row,
            )
            .optional()?;
        Ok(metric)
    }

    /// Metric rows for (user) with `from <= metric_date <= to`, ordered by
    /// date ascending. Days without a row are simply absent.
    pub fn range(
        conn: &Connection,
        user_id: &UserId,
        from: &str,
        to: &str,
    ) -> Result<Vec<DailyMetric>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, metric_date, tasks_planned, tasks_completed,
                    journal_entries, focus_minutes, streak_active, score,
                    created_at, updated_at
             FROM daily_metrics
             WHERE user_id = ?1 AND metric_date >= ?2 AND metric_date <= ?3
             ORDER BY metric_date",
        )?;
        let rows = stmt
            .query_map(params![user_id.as_str(), from, to], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Fetch a row that is known to exist (post-upsert).
    fn fetch(conn: &Connection, user_id: &UserId, date: &str) -> Result<DailyMetric> {
        let metric = conn.query_row(
            "SELECT id, user_id, metric_date, tasks_planned, tasks_completed,
                    journal_entries, focus_minutes, streak_active, score,
                    created_at, updated_at
             FROM daily_metrics WHERE user_id = ?1 AND metric_date = ?2",
            params![user_id.as_str(), date],
            Self::map_row,
        )?;
        Ok(metric)
    }

    /// Map a rusqlite row to `DailyMetric`.
    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DailyMetric> {
        Ok(DailyMetric {
            id: row.get(0)?,
            user_id: UserId::from_string(row.get(1)?),
            metric_date: row.get(2)?,
            tasks_planned: row.get(3)?,
            tasks_completed: row.get(4)?,
            journal_entries: row.get(5)?,
            focus_minutes: row.get(6)?,
            streak_active: row.get::<_, i32>(7)? == 1,
            score: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
