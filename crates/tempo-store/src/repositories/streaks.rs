//! Streak ledger repository.
//!
//! One row per (user, day). Completion increments happen in SQL
//! (`tasks_completed = tasks_completed + 1`) so concurrent completions on
//! the same day never lose an update. The nightly sweep uses `ensure_row`
//! to extend chains and `deactivate_before` to retire stale days.

use rusqlite::{Connection, OptionalExtension, params};

use tempo_core::{UserId, now_iso};

use crate::errors::Result;
use crate::repositories::generate_id;
use crate::types::StreakDay;

/// Streak repository — stateless, every method takes `&Connection`.
pub struct StreakRepository;

impl StreakRepository {
    /// Record one completion on (user, day): increments the existing row or
    /// creates it with `tasks_completed = 1`. Either way the day is marked
    /// active. Returns the stored row.
    pub fn increment_completion(
        conn: &Connection,
        user_id: &UserId,
        date: &str,
    ) -> Result<StreakDay> {
        let id = generate_id("str");
        let now = now_iso();

        let _ = conn.execute(
            "INSERT INTO user_streaks (id, user_id, streak_date, tasks_completed,
                 is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, 1, 1, ?4, ?4)
             ON CONFLICT (user_id, streak_date) DO UPDATE SET
                 tasks_completed = tasks_completed + 1,
                 is_active = 1,
                 updated_at = excluded.updated_at",
            params![id, user_id.as_str(), date, now],
        )?;

        Self::fetch(conn, user_id, date)
    }

    /// Make sure (user, day) has a row, creating an active zero-completion
    /// one if absent. An existing row is left untouched. Returns the stored
    /// row.
    pub fn ensure_row(conn: &Connection, user_id: &UserId, date: &str) -> Result<StreakDay> {
        let id = generate_id("str");
        let now = now_iso();

        let _ = conn.execute(
            "INSERT INTO user_streaks (id, user_id, streak_date, tasks_completed,
                 is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, 1, ?4, ?4)
             ON CONFLICT (user_id, streak_date) DO NOTHING",
            params![id, user_id.as_str(), date, now],
        )?;

        Self::fetch(conn, user_id, date)
    }

    /// Get the row for (user, day), if present.
    pub fn get(conn: &Connection, user_id: &UserId, date: &str) -> Result<Option<StreakDay>> {
        let day = conn
            .query_row(
                "SELECT id, user_id, streak_date, tasks_completed, is_active,
                        created_at, updated_at
                 FROM user_streaks WHERE user_id = ?1 AND streak_date = ?2",
                params![user_id.as_str(), date],
                Self::map_row,
            )
            .optional()?;
        Ok(day)
    }

    /// The user's most recent `limit` rows, newest first.
    pub fn recent(conn: &Connection, user_id: &UserId, limit: u32) -> Result<Vec<StreakDay>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, streak_date, tasks_completed, is_active,
                    created_at, updated_at
             FROM user_streaks WHERE user_id = ?1
             ORDER BY streak_date DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![user_id.as_str(), limit], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Date keys of the user's days with at least one completion, newest
    /// first. Input to the consecutive-day walk.
    pub fn completed_days_desc(conn: &Connection, user_id: &UserId) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT streak_date FROM user_streaks
             WHERE user_id = ?1 AND tasks_completed > 0
             ORDER BY streak_date DESC",
        )?;
        let rows = stmt
            .query_map(params![user_id.as_str()], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Users who completed at least one task on `date`. The nightly sweep
    /// extends exactly these users' chains into the next day.
    pub fn owners_with_completion_on(conn: &Connection, date: &str) -> Result<Vec<UserId>> {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT user_id FROM user_streaks
             WHERE streak_date = ?1 AND tasks_completed > 0",
        )?;
        let rows = stmt
            .query_map(params![date], |row| {
                Ok(UserId::from_string(row.get(0)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Deactivate every still-active row dated strictly before `date`,
    /// across all users. Returns how many rows changed.
    pub fn deactivate_before(conn: &Connection, date: &str) -> Result<usize> {
        let now = now_iso();
        let changed = conn.execute(
            "UPDATE user_streaks SET is_active = 0, updated_at = ?1
             WHERE streak_date < ?2 AND is_active = 1",
            params![now, date],
        )?;
        Ok(changed)
    }

    /// Fetch a row that is known to exist (post-upsert).
    fn fetch(conn: &Connection, user_id: &UserId, date: &str) -> Result<StreakDay> {
        let day = conn.query_row(
            "SELECT id, user_id, streak_date, tasks_completed, is_active,
                    created_at, updated_at
             FROM user_streaks WHERE user_id = ?1 AND streak_date = ?2",
            params![user_id.as_str(), date],
            Self::map_row,
        )?;
        Ok(day)
    }

    /// Map a rusqlite row to `StreakDay`.
    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StreakDay> {
        Ok(StreakDay {
            id: row.get(0)?,
            user_id: UserId::from_string(row.get(1)?),
            streak_date: row.get(2)?,
            tasks_completed: row.get(3)?,
            is_active: row.get::<_, i32>(4)? == 1,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")
            .unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn increment_creates_then_counts_up() {
        let conn = setup();
        let user = UserId::from("user-1");

        let first = StreakRepository::increment_completion(&conn, &user, "2025-01-15").unwrap();
        assert_eq!(first.tasks_completed, 1);
        assert!(first.is_active);

        let second = StreakRepository::increment_completion(&conn, &user, "2025-01-15").unwrap();
        assert_eq!(second.tasks_completed, 2);
        assert_eq!(second.id, first.id);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM user_streaks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn increment_reactivates_deactivated_day() {
        let conn = setup();
        let user = UserId::from("user-1");
        StreakRepository::increment_completion(&conn, &user, "2025-01-14").unwrap();
        StreakRepository::deactivate_before(&conn, "2025-01-15").unwrap();
        assert!(
            !StreakRepository::get(&conn, &user, "2025-01-14")
                .unwrap()
                .unwrap()
                .is_active
        );

        let row = StreakRepository::increment_completion(&conn, &user, "2025-01-14").unwrap();
        assert!(row.is_active);
        assert_eq!(row.tasks_completed, 2);
    }

    #[test]
    fn ensure_row_creates_zero_completion_day() {
        let conn = setup();
        let user = UserId::from("user-1");
        let row = StreakRepository::ensure_row(&conn, &user, "2025-01-16").unwrap();
        assert_eq!(row.tasks_completed, 0);
        assert!(row.is_active);
    }

    #[test]
    fn ensure_row_leaves_existing_untouched() {
        let conn = setup();
        let user = UserId::from("user-1");
        StreakRepository::increment_completion(&conn, &user, "2025-01-15").unwrap();
        StreakRepository::increment_completion(&conn, &user, "2025-01-15").unwrap();

        let row = StreakRepository::ensure_row(&conn, &user, "2025-01-15").unwrap();
        assert_eq!(row.tasks_completed, 2);
    }

    #[test]
    fn recent_returns_newest_first_with_limit() {
        let conn = setup();
        let user = UserId::from("user-1");
        for date in ["2025-01-12", "2025-01-13", "2025-01-14", "2025-01-15"] {
            StreakRepository::increment_completion(&conn, &user, date).unwrap();
        }

        let recent = StreakRepository::recent(&conn, &user, 3).unwrap();
        let dates: Vec<&str> = recent.iter().map(|d| d.streak_date.as_str()).collect();
        assert_eq!(dates, vec!["2025-01-15", "2025-01-14", "2025-01-13"]);
    }

    #[test]
    fn completed_days_skip_zero_days() {
        let conn = setup();
        let user = UserId::from("user-1");
        StreakRepository::increment_completion(&conn, &user, "2025-01-13").unwrap();
        StreakRepository::ensure_row(&conn, &user, "2025-01-14").unwrap();
        StreakRepository::increment_completion(&conn, &user, "2025-01-15").unwrap();

        let days = StreakRepository::completed_days_desc(&conn, &user).unwrap();
        assert_eq!(days, vec!["2025-01-15", "2025-01-13"]);
    }

    #[test]
    fn owners_with_completion_on_filters_by_day_and_count() {
        let conn = setup();
        StreakRepository::increment_completion(&conn, &UserId::from("user-1"), "2025-01-15")
            .unwrap();
        StreakRepository::increment_completion(&conn, &UserId::from("user-2"), "2025-01-15")
            .unwrap();
        // Active but no completions
        StreakRepository::ensure_row(&conn, &UserId::from("user-3"), "2025-01-15").unwrap();
        // Completed on another day
        StreakRepository::increment_completion(&conn, &UserId::from("user-4"), "2025-01-14")
            .unwrap();

        let mut owners: Vec<String> = StreakRepository::owners_with_completion_on(&conn, "2025-01-15")
            .unwrap()
            .into_iter()
            .map(UserId::into_inner)
            .collect();
        owners.sort();
        assert_eq!(owners, vec!["user-1", "user-2"]);
    }

    #[test]
    fn deactivate_before_spares_recent_days() {
        let conn = setup();
        let user = UserId::from("user-1");
        StreakRepository::increment_completion(&conn, &user, "2025-01-13").unwrap();
        StreakRepository::increment_completion(&conn, &user, "2025-01-14").unwrap();
        StreakRepository::increment_completion(&conn, &user, "2025-01-15").unwrap();

        let changed = StreakRepository::deactivate_before(&conn, "2025-01-14").unwrap();
        assert_eq!(changed, 1);
        assert!(
            !StreakRepository::get(&conn, &user, "2025-01-13")
                .unwrap()
                .unwrap()
                .is_active
        );
        assert!(
            StreakRepository::get(&conn, &user, "2025-01-14")
                .unwrap()
                .unwrap()
                .is_active
        );
        assert!(
            StreakRepository::get(&conn, &user, "2025-01-15")
                .unwrap()
                .unwrap()
                .is_active
        );
    }

    #[test]
    fn deactivate_before_is_idempotent() {
        let conn = setup();
        let user = UserId::from("user-1");
        StreakRepository::increment_completion(&conn, &user, "2025-01-13").unwrap();

        assert_eq!(StreakRepository::deactivate_before(&conn, "2025-01-15").unwrap(), 1);
        assert_eq!(StreakRepository::deactivate_before(&conn, "2025-01-15").unwrap(), 0);
    }
}
