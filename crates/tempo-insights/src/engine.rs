//! Daily metric engine.
//!
//! Refreshes one (user, day) metric row from the authoritative tasks table.
//! Counts are re-derived on every call rather than incremented, so a row
//! converges to the correct values no matter how many times the day is
//! recorded or in what order task edits landed.

use chrono::{DateTime, Utc};
use tracing::debug;

use tempo_core::time::format_iso;
use tempo_core::{DayBoundary, UserId};
use tempo_store::{
    ConnectionPool, DailyMetric, DailyMetricRepository, MetricUpsert, PooledConnection,
    StoreError, TaskRepository,
};

use crate::errors::Result;
use crate::scorer::{DaySignals, compute_score};

/// Derives and persists per-day productivity metrics.
pub struct MetricEngine {
    pool: ConnectionPool,
    boundary: DayBoundary,
}

impl MetricEngine {
    /// Create an engine over the given pool and day boundary.
    #[must_use]
    pub fn new(pool: ConnectionPool, boundary: DayBoundary) -> Self {
        Self { pool, boundary }
    }

    /// Refresh the metric row for the day containing `at`.
    ///
    /// Planned and completed counts come from the tasks table; an existing
    /// row's journal and focus counters carry forward. `streak_active`
    /// turns on with the first completion of the day and stays on for the
    /// rest of it. The write is a single atomic upsert keyed on
    /// (user, day) — calling this twice with the same inputs persists
    /// identical values.
    pub fn record_completion(&self, owner: &UserId, at: DateTime<Utc>) -> Result<DailyMetric> {
        let (window_start, window_end) = self.boundary.day_window(at);
        let date_key = self.boundary.date_key(at);
        let from = format_iso(window_start);
        let to = format_iso(window_end);

        let conn = self.conn()?;
        let planned = TaskRepository::count_planned_in_window(&conn, owner, &from, &to)?;
        let completed = TaskRepository::count_completed_in_window(&conn, owner, &from, &to)?;

        let existing = DailyMetricRepository::get(&conn, owner, &date_key)?;
        let journal_entries = existing.as_ref().map_or(0, |m| m.journal_entries);
        let focus_minutes = existing.as_ref().map_or(0, |m| m.focus_minutes);
        let streak_active = completed > 0 || existing.as_ref().is_some_and(|m| m.streak_active);

        let score = compute_score(&DaySignals {
            tasks_planned: planned,
            tasks_completed: completed,
            journal_entries,
            focus_minutes,
            streak_active,
        });

        let metric = DailyMetricRepository::upsert(
            &conn,
            &MetricUpsert {
                user_id: owner.clone(),
                metric_date: date_key,
                tasks_planned: planned,
                tasks_completed: completed,
                journal_entries,
                focus_minutes,
                streak_active,
                score,
            },
        )?;

        debug!(
            user = %owner,
            date = %metric.metric_date,
            planned,
            completed,
            score,
            "daily metric refreshed"
        );
        Ok(metric)
    }

    /// The metric row for (user, day), if one exists.
    pub fn metric_for_day(&self, owner: &UserId, date: &str) -> Result<Option<DailyMetric>> {
        let conn = self.conn()?;
        Ok(DailyMetricRepository::get(&conn, owner, date)?)
    }

    /// Metric rows for `from <= day <= to`, ordered by date. Days the user
    /// never recorded have no row.
    pub fn range(&self, owner: &UserId, from: &str, to: &str) -> Result<Vec<DailyMetric>> {
        let conn = self.conn()?;
        Ok(DailyMetricRepository::range(&conn, owner, from, to)?)
    }

    /// The configured day boundary.
    #[must_use]
    pub fn boundary(&self) -> DayBoundary {
        self.boundary
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get().map_err(StoreError::from)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
