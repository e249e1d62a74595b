//! Composite daily productivity score.
//!
//! A pure weighted sum over one day's activity signals. The same snapshot
//! always produces bit-identical output: every component is derived with
//! the same operations in the same order, and rounding happens exactly once
//! at the end.
//!
//! Weights: 40% task completion ratio, 25% streak, 20% focus time
//! (saturating at two hours), 15% journaling (any entry counts in full).

/// One day's activity snapshot, as fed to the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySignals {
    /// Tasks due on this day.
    pub tasks_planned: i64,
    /// Tasks completed on this day.
    pub tasks_completed: i64,
    /// Journal entries written on this day.
    pub journal_entries: i64,
    /// Focused minutes logged on this day.
    pub focus_minutes: i64,
    /// Whether the user's streak is alive on this day.
    pub streak_active: bool,
}

const WEIGHT_TASKS: f64 = 0.4;
const WEIGHT_STREAK: f64 = 0.25;
const WEIGHT_FOCUS: f64 = 0.2;
const WEIGHT_JOURNAL: f64 = 0.15;

/// Minutes of focus that earn the full focus component.
const FOCUS_TARGET_MINUTES: f64 = 120.0;

/// Compute the composite score for one day, in `[0, 1]` rounded to three
/// decimal places.
///
/// The task component is the completion ratio when anything was planned;
/// unplanned days score full marks for any completion and zero otherwise.
#[must_use]
pub fn compute_score(signals: &DaySignals) -> f64 {
    let tasks = if signals.tasks_planned > 0 {
        signals.tasks_completed as f64 / signals.tasks_planned as f64
    } else if signals.tasks_completed > 0 {
        1.0
    } else {
        0.0
    };
    let streak = if signals.streak_active { 1.0 } else { 0.0 };
    let focus = (signals.focus_minutes as f64 / FOCUS_TARGET_MINUTES).min(1.0);
    let journal = if signals.journal_entries > 0 { 1.0 } else { 0.0 };

    let raw = WEIGHT_TASKS * tasks
        + WEIGHT_STREAK * streak
        + WEIGHT_FOCUS * focus
        + WEIGHT_JOURNAL * journal;

    (raw.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn signals(
        planned: i64,
        completed: i64,
        journal: i64,
        focus: i64,
        streak: bool,
    ) -> DaySignals {
        DaySignals {
            tasks_planned: planned,
            tasks_completed: completed,
            journal_entries: journal,
            focus_minutes: focus,
            streak_active: streak,
        }
    }

    #[test]
    fn all_zero_snapshot_scores_zero() {
        assert_eq!(compute_score(&signals(0, 0, 0, 0, false)), 0.0);
    }

    #[test]
    fn full_snapshot_scores_one() {
        assert_eq!(compute_score(&signals(4, 4, 1, 120, true)), 1.0);
    }

    #[test]
    fn completion_ratio_drives_the_task_component() {
        // 2 of 4 planned: 0.4 * 0.5 = 0.2
        assert_eq!(compute_score(&signals(4, 2, 0, 0, false)), 0.2);
    }

    #[test]
    fn unplanned_completion_earns_full_task_component() {
        // Nothing planned, one done: task component is 1.0
        assert_eq!(compute_score(&signals(0, 1, 0, 0, false)), 0.4);
    }

    #[test]
    fn focus_saturates_at_two_hours() {
        let two_hours = compute_score(&signals(0, 0, 0, 120, false));
        let four_hours = compute_score(&signals(0, 0, 0, 240, false));
        assert_eq!(two_hours, 0.2);
        assert_eq!(four_hours, 0.2);
    }

    #[test]
    fn one_hour_focus_is_half_the_component() {
        assert_eq!(compute_score(&signals(0, 0, 0, 60, false)), 0.1);
    }

    #[test]
    fn any_journal_entry_counts_in_full() {
        assert_eq!(compute_score(&signals(0, 0, 1, 0, false)), 0.15);
        assert_eq!(compute_score(&signals(0, 0, 7, 0, false)), 0.15);
    }

    #[test]
    fn streak_component_is_quarter_weight() {
        assert_eq!(compute_score(&signals(0, 0, 0, 0, true)), 0.25);
    }

    #[test]
    fn overcompletion_clamps_to_one() {
        // Ratio of 5.0 would push the raw sum past 1
        assert_eq!(compute_score(&signals(1, 5, 1, 240, true)), 1.0);
    }

    #[test]
    fn rounds_to_three_decimals() {
        // 1/3 ratio: 0.4 * 0.333… = 0.1333… → 0.133
        assert_eq!(compute_score(&signals(3, 1, 0, 0, false)), 0.133);
        // 2/3 ratio: 0.2666… → 0.267
        assert_eq!(compute_score(&signals(3, 2, 0, 0, false)), 0.267);
    }

    #[test]
    fn identical_snapshots_score_identically() {
        let a = signals(7, 3, 2, 45, true);
        let b = signals(7, 3, 2, 45, true);
        assert_eq!(compute_score(&a).to_bits(), compute_score(&b).to_bits());
    }

    proptest! {
        #[test]
        fn score_stays_in_unit_range(
            planned in 0i64..1000,
            completed in 0i64..1000,
            journal in 0i64..100,
            focus in 0i64..10_000,
            streak in proptest::bool::ANY,
        ) {
            let score = compute_score(&signals(planned, completed, journal, focus, streak));
            prop_assert!((0.0..=1.0).contains(&score), "score out of range: {score}");
        }

        #[test]
        fn score_has_at_most_three_decimals(
            planned in 0i64..1000,
            completed in 0i64..1000,
            journal in 0i64..100,
            focus in 0i64..10_000,
            streak in proptest::bool::ANY,
        ) {
            let score = compute_score(&signals(planned, completed, journal, focus, streak));
            let scaled = score * 1000.0;
            prop_assert!((scaled - scaled.round()).abs() < 1e-9);
        }
    }
}
