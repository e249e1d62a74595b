//! Core types shared across the Tempo workspace.
//!
//! Two concerns live here because every other crate needs them:
//!
//! - [`ids`] — branded ID newtypes so a task ID can never be passed where a
//!   user ID is expected.
//! - [`time`] — ISO-8601 timestamp helpers and [`time::DayBoundary`], the
//!   explicit-timezone calendar bucketing used by metrics, streaks, and the
//!   nightly rollover.

pub mod ids;
pub mod time;

pub use ids::{ConnectionId, ReminderId, TaskId, UserId};
pub use time::{DayBoundary, now_iso};
