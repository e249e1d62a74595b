//! Read-side aggregation for the productivity dashboard.
//!
//! Everything here is derived from persisted metric and streak rows at
//! query time. Days without a row simply contribute nothing (heatmap) or
//! a zero (charts), so the read path never writes.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

use tempo_core::time::{format_date_key, weekday_label};
use tempo_core::{DayBoundary, UserId};
use tempo_store::{
    ConnectionPool, DailyMetricRepository, PooledConnection, StoreError, StreakRepository,
    TaskRepository,
};

use crate::errors::Result;
use crate::streaks::consecutive_run;

/// Days covered by the heatmap and the analytics average, today included.
const HEATMAP_DAYS: u64 = 364;

/// One heatmap cell: a recorded day and its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapPoint {
    pub date: String,
    pub score: f64,
}

/// One bar of the weekly or monthly chart, scaled to 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub label: String,
    pub value: i64,
}

/// Headline numbers for the analytics card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub tasks_done: i64,
    pub streak_days: u32,
    pub avg_score: f64,
}

/// Serves dashboard queries over persisted metric and streak rows.
pub struct DashboardService {
    pool: ConnectionPool,
    boundary: DayBoundary,
}

impl DashboardService {
    /// Create a service over the given pool and day boundary.
    #[must_use]
    pub fn new(pool: ConnectionPool, boundary: DayBoundary) -> Self {
        Self { pool, boundary }
    }

    /// Recorded days in the trailing year, oldest first. Absent days are
    /// omitted rather than zero-filled.
    pub fn heatmap(&self, owner: &UserId, now: DateTime<Utc>) -> Result<Vec<HeatmapPoint>> {
        let today = self.boundary.local_date(now);
        let from = days_back(today, HEATMAP_DAYS - 1);
        let conn = self.conn()?;
        let rows = DailyMetricRepository::range(
            &conn,
            owner,
            &format_date_key(from),
            &format_date_key(today),
        )?;
        Ok(rows
            .into_iter()
            .map(|metric| HeatmapPoint {
                date: metric.metric_date,
                score: metric.score,
            })
            .collect())
    }

    /// The last seven days as weekday-labelled bars, today last. Days
    /// without a metric row chart as zero.
    pub fn weekly_chart(&self, owner: &UserId, now: DateTime<Utc>) -> Result<Vec<ChartPoint>> {
        let today = self.boundary.local_date(now);
        let scores = self.scores_between(owner, days_back(today, 6), today)?;

        let mut points = Vec::with_capacity(7);
        for offset in 0..7u64 {
            let day = days_back(today, 6 - offset);
            let score = scores.get(&format_date_key(day)).copied().unwrap_or(0.0);
            points.push(ChartPoint {
                label: weekday_label(day),
                value: (score * 100.0).round() as i64,
            });
        }
        Ok(points)
    }

    /// The last 28 days in four week buckets, oldest week first. Each bar
    /// is the week's average score; unrecorded days average in as zero.
    pub fn monthly_chart(&self, owner: &UserId, now: DateTime<Utc>) -> Result<Vec<ChartPoint>> {
        let today = self.boundary.local_date(now);
        let scores = self.scores_between(owner, days_back(today, 27), today)?;

        let mut points = Vec::with_capacity(4);
        for week in 0..4u64 {
            let mut sum = 0.0;
            for slot in 0..7u64 {
                let day = days_back(today, 27 - (week * 7 + slot));
                sum += scores.get(&format_date_key(day)).copied().unwrap_or(0.0);
            }
            points.push(ChartPoint {
                label: format!("Week {}", week + 1),
                value: ((sum / 7.0) * 100.0).round() as i64,
            });
        }
        Ok(points)
    }

    /// All-time completions, current streak length, and the mean score
    /// over the heatmap window (0 when no day in it was recorded).
    pub fn analytics(&self, owner: &UserId, now: DateTime<Utc>) -> Result<AnalyticsSummary> {
        let today = self.boundary.local_date(now);
        let from = days_back(today, HEATMAP_DAYS - 1);
        let conn = self.conn()?;

        let tasks_done = TaskRepository::count_all_completed(&conn, owner)?;
        let completed_days = StreakRepository::completed_days_desc(&conn, owner)?;
        let streak_days = consecutive_run(&completed_days);

        let rows = DailyMetricRepository::range(
            &conn,
            owner,
            &format_date_key(from),
            &format_date_key(today),
        )?;
        let avg_score = if rows.is_empty() {
            0.0
        } else {
            let mean = rows.iter().map(|m| m.score).sum::<f64>() / rows.len() as f64;
            (mean * 100.0).round() / 100.0
        };

        Ok(AnalyticsSummary {
            tasks_done,
            streak_days,
            avg_score,
        })
    }

    fn scores_between(
        &self,
        owner: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashMap<String, f64>> {
        let conn = self.conn()?;
        let rows = DailyMetricRepository::range(
            &conn,
            owner,
            &format_date_key(from),
            &format_date_key(to),
        )?;
        Ok(rows
            .into_iter()
            .map(|metric| (metric.metric_date, metric.score))
            .collect())
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get().map_err(StoreError::from)?)
    }
}

/// `date` minus `n` days, saturating at the calendar minimum.
fn days_back(date: NaiveDate, n: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(n)).unwrap_or(date)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
