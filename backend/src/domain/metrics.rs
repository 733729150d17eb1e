//! Derived habit statistics.
//!
//! Everything here is pure: results depend only on the habits, the logs and
//! the reference `today` supplied by the caller. Nothing is cached; the
//! analytics endpoint recomputes from a fresh snapshot on every request.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use super::{DEFAULT_TARGET_DAYS, Habit, HabitId, HabitLog, MonthFilter};

/// Upper bound on the backward walk performed by [`active_streak`].
pub const MAX_STREAK_DAYS: u32 = 3650;
/// Trailing window used for the weekly rate and series.
pub const WEEKLY_WINDOW_DAYS: u32 = 7;
/// Trailing window used for the monthly rate and series.
pub const MONTHLY_WINDOW_DAYS: u32 = 30;

/// Failures raised while interpreting metric inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricsError {
    #[error("invalid {kind}: {value:?}")]
    InvalidInput { kind: &'static str, value: String },
}

impl MetricsError {
    pub(crate) fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidInput {
            kind: "date",
            value: value.into(),
        }
    }

    pub(crate) fn invalid_month(value: impl Into<String>) -> Self {
        Self::InvalidInput {
            kind: "month",
            value: value.into(),
        }
    }
}

/// Constant-time lookup of completed `(habit, date)` pairs.
#[derive(Debug, Clone, Default)]
pub struct CompletionIndex {
    completed: HashSet<(HabitId, NaiveDate)>,
}

impl CompletionIndex {
    /// Index the completed entries of `logs`; incomplete logs are ignored.
    pub fn new(logs: &[HabitLog]) -> Self {
        let completed = logs
            .iter()
            .filter(|log| log.completed)
            .map(|log| (log.habit_id, log.date))
            .collect();
        Self { completed }
    }

    pub fn is_completed(&self, habit_id: HabitId, date: NaiveDate) -> bool {
        self.completed.contains(&(habit_id, date))
    }

    /// Number of `habits` completed on `date`.
    pub fn completed_on(&self, habits: &[Habit], date: NaiveDate) -> u32 {
        let count = habits
            .iter()
            .filter(|habit| self.is_completed(habit.id, date))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Number of days in `month` on which `habit_id` was completed.
    pub fn completed_in(&self, habit_id: HabitId, month: &MonthFilter) -> u32 {
        let count = self
            .completed
            .iter()
            .filter(|(id, date)| *id == habit_id && month.contains(*date))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn is_kept(&self, habits: &[Habit], date: NaiveDate) -> bool {
        !habits.is_empty() && habits.iter().all(|habit| self.is_completed(habit.id, date))
    }
}

/// Completion progress of a single habit against its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Percentage in `0..=100`.
    pub percent: u8,
    /// Target the percentage was computed against.
    pub target_days: i32,
    /// `true` when the stored target was missing or non-positive.
    pub target_defaulted: bool,
}

/// Progress of `completed` days against `target_days`.
///
/// A missing or non-positive target falls back to the default of 30 days and
/// is flagged. The result saturates at 100 and rounds half up.
///
/// # Examples
/// ```
/// use habit_tracker::domain::metrics::progress;
///
/// assert_eq!(progress(None, 15).percent, 50);
/// assert_eq!(progress(Some(20), 40).percent, 100);
/// assert!(progress(Some(0), 1).target_defaulted);
/// ```
pub fn progress(target_days: Option<i32>, completed: u32) -> Progress {
    let (target, target_defaulted) = match target_days {
        Some(target) if target > 0 => (target, false),
        _ => (DEFAULT_TARGET_DAYS, true),
    };
    let target_wide = u64::from(target.unsigned_abs());
    let completed_wide = u64::from(completed);
    let percent = if completed_wide >= target_wide {
        100
    } else {
        round_half_up_percent(completed_wide, target_wide)
    };
    Progress {
        percent,
        target_days: target,
        target_defaulted,
    }
}

/// `round(numerator / denominator * 100)` with halves rounded up, capped at 100.
fn round_half_up_percent(numerator: u64, denominator: u64) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let scaled = (200 * u128::from(numerator) + u128::from(denominator)) / (2 * u128::from(denominator));
    u8::try_from(scaled.min(100)).unwrap_or(100)
}

/// Consecutive kept days ending at `today`.
///
/// A day is kept when the user has at least one habit and every habit has a
/// completed log on it. The walk stops at [`MAX_STREAK_DAYS`].
pub fn active_streak(habits: &[Habit], index: &CompletionIndex, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = Some(today);
    while let Some(current) = day {
        if streak >= MAX_STREAK_DAYS || !index.is_kept(habits, current) {
            break;
        }
        streak += 1;
        day = current.pred_opt();
    }
    streak
}

/// Mean daily completion ratio over the trailing window, as a percentage.
///
/// The window covers `window_days` days ending at and including `today`.
/// Returns 0 when there are no habits or the window is empty.
pub fn completion_rate(
    habits: &[Habit],
    index: &CompletionIndex,
    today: NaiveDate,
    window_days: u32,
) -> u8 {
    if habits.is_empty() || window_days == 0 {
        return 0;
    }
    let completed: u64 = trailing_days(today, window_days)
        .map(|day| u64::from(index.completed_on(habits, day)))
        .sum();
    let total = habits.len() as u64;
    let possible = total * u64::from(window_days);
    round_half_up_percent(completed, possible)
}

/// Dates of the trailing window, oldest first. Days before the calendar's
/// minimum are skipped.
fn trailing_days(today: NaiveDate, window_days: u32) -> impl Iterator<Item = NaiveDate> {
    (0..window_days)
        .rev()
        .filter_map(move |offset| today.checked_sub_days(Days::new(u64::from(offset))))
}

/// Span and labelling of a [`daily_series`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesWindow {
    /// Seven days labelled by weekday, e.g. `Mon`.
    Weekly,
    /// Thirty days labelled by month and day, e.g. `Mar 05`.
    Monthly,
}

impl SeriesWindow {
    pub fn days(self) -> u32 {
        match self {
            Self::Weekly => WEEKLY_WINDOW_DAYS,
            Self::Monthly => MONTHLY_WINDOW_DAYS,
        }
    }

    fn label(self, date: NaiveDate) -> String {
        match self {
            Self::Weekly => date.format("%a").to_string(),
            Self::Monthly => date.format("%b %d").to_string(),
        }
    }
}

/// One day of a chart series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub date: NaiveDate,
    #[schema(example = "Mon")]
    pub label: String,
    pub completed_count: u32,
}

/// Lazy per-day completion counts, oldest first.
///
/// Produced by [`daily_series`]; yields exactly `window.days()` points unless
/// the window would extend before the calendar's minimum date.
#[derive(Debug, Clone)]
pub struct DailySeries<'a> {
    habits: &'a [Habit],
    index: &'a CompletionIndex,
    window: SeriesWindow,
    today: NaiveDate,
    remaining: u32,
}

impl Iterator for DailySeries<'_> {
    type Item = SeriesPoint;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            self.remaining -= 1;
            let Some(date) = self
                .today
                .checked_sub_days(Days::new(u64::from(self.remaining)))
            else {
                continue;
            };
            return Some(SeriesPoint {
                date,
                label: self.window.label(date),
                completed_count: self.index.completed_on(self.habits, date),
            });
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, usize::try_from(self.remaining).ok())
    }
}

/// Per-day completion counts for the trailing `window` ending at `today`.
pub fn daily_series<'a>(
    habits: &'a [Habit],
    index: &'a CompletionIndex,
    today: NaiveDate,
    window: SeriesWindow,
) -> DailySeries<'a> {
    DailySeries {
        habits,
        index,
        window,
        today,
        remaining: window.days(),
    }
}

/// Per-habit slice of the analytics report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HabitProgress {
    pub habit_id: HabitId,
    pub name: String,
    pub color: String,
    pub target_days: i32,
    pub completed_this_month: u32,
    pub progress: u8,
    pub target_defaulted: bool,
}

/// Aggregate statistics for one user as of `today`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub today: NaiveDate,
    pub total_habits: u32,
    pub active_streak: u32,
    pub weekly_rate: u8,
    pub monthly_rate: u8,
    pub weekly: Vec<SeriesPoint>,
    pub monthly: Vec<SeriesPoint>,
    pub habits: Vec<HabitProgress>,
}

impl AnalyticsReport {
    /// Compute the report from a snapshot of the user's habits and logs.
    pub fn compute(habits: &[Habit], logs: &[HabitLog], today: NaiveDate) -> Self {
        let index = CompletionIndex::new(logs);
        let month = MonthFilter::containing(today);
        let per_habit = habits
            .iter()
            .map(|habit| {
                let completed_this_month = index.completed_in(habit.id, &month);
                let progress = progress(Some(habit.target_days), completed_this_month);
                HabitProgress {
                    habit_id: habit.id,
                    name: habit.name.clone(),
                    color: habit.color.clone(),
                    target_days: progress.target_days,
                    completed_this_month,
                    progress: progress.percent,
                    target_defaulted: progress.target_defaulted,
                }
            })
            .collect();

        Self {
            today,
            total_habits: u32::try_from(habits.len()).unwrap_or(u32::MAX),
            active_streak: active_streak(habits, &index, today),
            weekly_rate: completion_rate(habits, &index, today, WEEKLY_WINDOW_DAYS),
            monthly_rate: completion_rate(habits, &index, today, MONTHLY_WINDOW_DAYS),
            weekly: daily_series(habits, &index, today, SeriesWindow::Weekly).collect(),
            monthly: daily_series(habits, &index, today, SeriesWindow::Monthly).collect(),
            habits: per_habit,
        }
    }
}

#[cfg(test)]
mod tests;
