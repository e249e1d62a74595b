//! Reminder scheduling and background execution.
//!
//! [`ReminderService`] owns the write-path operations (schedule, due
//! check, retention); [`Scheduler`] runs them on their cadences alongside
//! the midnight streak rollover.

pub mod errors;
pub mod scheduler;
pub mod service;

pub use errors::{ReminderError, Result};
pub use scheduler::{Scheduler, SchedulerConfig, due_check_loop, retention_loop, rollover_loop};
pub use service::{DueCheckSummary, ReminderService};
