//! Background scheduler loops.
//!
//! Three independent loops: the due-check pass, the retention sweep, and
//! the midnight streak rollover. A tick failure is logged and counted,
//! never fatal; the only way out of a loop is cancellation. Each loop
//! awaits its own tick to completion, and missed ticks coalesce instead
//! of piling up.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::counter;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use tempo_core::DayBoundary;
use tempo_insights::StreakTracker;

use crate::service::ReminderService;

/// Tick cadences for the periodic loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// How often the due-check pass runs.
    pub due_check_interval: Duration,
    /// How often the retention sweep runs.
    pub retention_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            due_check_interval: Duration::from_secs(60),
            retention_interval: Duration::from_secs(3600),
        }
    }
}

/// Spawns and configures the background loops.
pub struct Scheduler {
    service: Arc<ReminderService>,
    tracker: Arc<StreakTracker>,
    boundary: DayBoundary,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Bundle the loop collaborators.
    #[must_use]
    pub fn new(
        service: Arc<ReminderService>,
        tracker: Arc<StreakTracker>,
        boundary: DayBoundary,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            service,
            tracker,
            boundary,
            config,
        }
    }

    /// Spawn all three loops. They run until `cancel` fires.
    pub fn spawn(self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        info!(
            due_check_secs = self.config.due_check_interval.as_secs(),
            retention_secs = self.config.retention_interval.as_secs(),
            "scheduler started"
        );
        vec![
            tokio::spawn(due_check_loop(
                self.service.clone(),
                self.config.due_check_interval,
                cancel.clone(),
            )),
            tokio::spawn(retention_loop(
                self.service,
                self.config.retention_interval,
                cancel.clone(),
            )),
            tokio::spawn(rollover_loop(self.tracker, self.boundary, cancel.clone())),
        ]
    }
}

/// Run the due-check pass every `every` until cancelled.
pub async fn due_check_loop(
    service: Arc<ReminderService>,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut ticks = time::interval(every);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Skip the immediate first tick
    let _ = ticks.tick().await;

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                if let Err(error) = service.run_due_check(Utc::now()).await {
                    error!(error = %error, job = "due_check", "scheduler tick failed");
                    counter!("scheduler_tick_errors_total", "job" => "due_check").increment(1);
                }
            }
            () = cancel.cancelled() => {
                debug!(job = "due_check", "scheduler loop stopped");
                return;
            }
        }
    }
}

/// Run the retention sweep every `every` until cancelled.
pub async fn retention_loop(
    service: Arc<ReminderService>,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut ticks = time::interval(every);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Skip the immediate first tick
    let _ = ticks.tick().await;

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                if let Err(error) = service.run_retention(Utc::now()) {
                    error!(error = %error, job = "retention", "scheduler tick failed");
                    counter!("scheduler_tick_errors_total", "job" => "retention").increment(1);
                }
            }
            () = cancel.cancelled() => {
                debug!(job = "retention", "scheduler loop stopped");
                return;
            }
        }
    }
}

/// Advance the streak ledger at each local midnight until cancelled.
pub async fn rollover_loop(
    tracker: Arc<StreakTracker>,
    boundary: DayBoundary,
    cancel: CancellationToken,
) {
    loop {
        let wait = boundary.until_next_rollover(Utc::now());
        tokio::select! {
            () = time::sleep(wait) => {
                match tracker.advance(Utc::now()) {
                    Ok(summary) => info!(
                        extended = summary.extended,
                        retired = summary.retired,
                        "streak rollover complete"
                    ),
                    Err(error) => {
                        error!(error = %error, job = "rollover", "scheduler tick failed");
                        counter!("scheduler_tick_errors_total", "job" => "rollover").increment(1);
                    }
                }
            }
            () = cancel.cancelled() => {
                debug!(job = "rollover", "scheduler loop stopped");
                return;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
