//! Streak ledger maintenance and length computation.
//!
//! Each completion bumps the owner's per-day streak row; the nightly
//! rollover seeds a fresh row for everyone who completed something
//! yesterday and retires rows older than that. Streak length is a pure
//! walk over completion dates, so it stays correct even if rollover runs
//! late or more than once.

use chrono::{DateTime, Utc};
use tracing::debug;

use tempo_core::time::{format_date_key, parse_date_key, prev_day};
use tempo_core::{DayBoundary, UserId};
use tempo_store::{ConnectionPool, PooledConnection, StoreError, StreakDay, StreakRepository};

use crate::errors::Result;

/// Maintains per-user streak rows and answers streak-length queries.
pub struct StreakTracker {
    pool: ConnectionPool,
    boundary: DayBoundary,
}

/// What one rollover pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloverSummary {
    /// Users whose streak was carried into the new day.
    pub extended: usize,
    /// Old rows flipped inactive.
    pub retired: usize,
}

impl StreakTracker {
    /// Create a tracker over the given pool and day boundary.
    #[must_use]
    pub fn new(pool: ConnectionPool, boundary: DayBoundary) -> Self {
        Self { pool, boundary }
    }

    /// Record one task completion against the day containing `at`.
    ///
    /// Creates the day's row on first completion and increments its
    /// counter on every later one.
    pub fn on_task_completed(&self, owner: &UserId, at: DateTime<Utc>) -> Result<StreakDay> {
        let date_key = self.boundary.date_key(at);
        let conn = self.conn()?;
        let day = StreakRepository::increment_completion(&conn, owner, &date_key)?;
        debug!(user = %owner, date = %date_key, completed = day.tasks_completed, "streak day bumped");
        Ok(day)
    }

    /// Advance the streak ledger across a day boundary.
    ///
    /// Every user with at least one completion yesterday gets today's row
    /// seeded at zero completions, keeping their chain unbroken until
    /// midnight. Rows strictly older than yesterday flip inactive. Running
    /// this more than once for the same day changes nothing.
    pub fn advance(&self, now: DateTime<Utc>) -> Result<RolloverSummary> {
        let today = self.boundary.local_date(now);
        let yesterday = prev_day(today);
        let today_key = format_date_key(today);
        let yesterday_key = format_date_key(yesterday);

        let conn = self.conn()?;
        let tx = conn.unchecked_transaction().map_err(StoreError::from)?;
        let owners = StreakRepository::owners_with_completion_on(&tx, &yesterday_key)?;
        for owner in &owners {
            let _ = StreakRepository::ensure_row(&tx, owner, &today_key)?;
        }
        let retired = StreakRepository::deactivate_before(&tx, &yesterday_key)?;
        tx.commit().map_err(StoreError::from)?;

        let summary = RolloverSummary {
            extended: owners.len(),
            retired,
        };
        debug!(
            date = %today_key,
            extended = summary.extended,
            retired = summary.retired,
            "streak rollover"
        );
        Ok(summary)
    }

    /// Length of the owner's current streak in days.
    ///
    /// Walks completion days newest-first from the most recent day with a
    /// completion and counts while days stay exactly consecutive. A user
    /// who completed nothing yet today still sees yesterday's run.
    pub fn current_streak_length(&self, owner: &UserId) -> Result<u32> {
        let conn = self.conn()?;
        let days = StreakRepository::completed_days_desc(&conn, owner)?;
        Ok(consecutive_run(&days))
    }

    /// The best single-day completion count over the recent window.
    ///
    /// The dashboard's "longest streak" figure is this max rather than a
    /// full historical chain search.
    pub fn longest_streak(&self, owner: &UserId) -> Result<i64> {
        let conn = self.conn()?;
        let recent = StreakRepository::recent(&conn, owner, 30)?;
        Ok(recent
            .iter()
            .map(|day| day.tasks_completed)
            .max()
            .unwrap_or(0))
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get().map_err(StoreError::from)?)
    }
}

/// Count the run of exactly-consecutive days at the head of a
/// newest-first date-key list.
pub(crate) fn consecutive_run(days_desc: &[String]) -> u32 {
    let mut dates = days_desc.iter().filter_map(|key| parse_date_key(key));
    let Some(mut prev) = dates.next() else {
        return 0;
    };
    let mut length = 1;
    for date in dates {
        if date == prev_day(prev) {
            length += 1;
            prev = date;
        } else {
            break;
        }
    }
    length
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
