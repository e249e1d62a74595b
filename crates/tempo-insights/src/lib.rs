//! Productivity insights: daily metric scoring, streak maintenance, and
//! dashboard aggregation.
//!
//! The write path ([`MetricEngine`], [`StreakTracker`]) re-derives state
//! from the task tables so repeated triggers converge; the read path
//! ([`DashboardService`]) only aggregates what was persisted.

pub mod dashboard;
pub mod engine;
pub mod errors;
pub mod scorer;
pub mod streaks;

pub use dashboard::{AnalyticsSummary, ChartPoint, DashboardService, HeatmapPoint};
pub use engine::MetricEngine;
pub use errors::{InsightsError, Result};
pub use scorer::{DaySignals, compute_score};
pub use streaks::{RolloverSummary, StreakTracker};
