//! SQLite persistence layer for the Tempo backend.
//!
//! Layout mirrors the data model: a pooled connection layer with WAL and
//! foreign keys ([`connection`]), an embedded migration runner
//! ([`migrations`]), row types ([`types`]), and stateless repositories
//! ([`repositories`]) that take a `&Connection` per call.
//!
//! All timestamps are ISO-8601 UTC TEXT; calendar days are `YYYY-MM-DD`
//! TEXT keys produced by the configured day boundary. Both sort
//! lexicographically in chronological order, which the due-check and
//! retention queries rely on.

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod repositories;
pub mod types;

pub use connection::{ConnectionPool, PooledConnection, StoreConfig, open_file, open_in_memory};
pub use errors::{Result, StoreError};
pub use migrations::run_migrations;
pub use repositories::metrics::DailyMetricRepository;
pub use repositories::reminders::ReminderRepository;
pub use repositories::streaks::StreakRepository;
pub use repositories::tasks::TaskRepository;
pub use types::{
    DailyMetric, DueReminder, MetricUpsert, NewReminder, NewTask, Reminder, ReminderKind,
    StreakDay, Task, TaskPriority, TaskStatus,
};
