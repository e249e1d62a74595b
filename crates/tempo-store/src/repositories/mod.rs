//! Stateless repositories over the SQLite schema.
//!
//! Every method takes a `&Connection` and translates between row types and
//! SQL. Writes that must stay correct under concurrent callers use atomic
//! `INSERT … ON CONFLICT … DO UPDATE` upserts rather than read-modify-write.

pub mod metrics;
pub mod reminders;
pub mod streaks;
pub mod tasks;

use uuid::Uuid;

/// Generate a prefixed UUID v7 row ID.
pub(crate) fn generate_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7())
}
