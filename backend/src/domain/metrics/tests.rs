//! Behavioural tests for the metrics calculator.

use super::*;
use crate::domain::{UserId, parse_date};
use chrono::{DateTime, Utc};
use rstest::{fixture, rstest};

fn date(raw: &str) -> NaiveDate {
    parse_date(raw).expect("fixture date is valid")
}

fn habit(id: i32, target_days: i32) -> Habit {
    Habit {
        id: HabitId::new(id),
        user_id: UserId::new("u1").expect("valid id"),
        name: format!("habit {id}"),
        description: None,
        color: "#4F46E5".into(),
        target_days,
        created_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

fn log(habit_id: i32, day: NaiveDate, completed: bool) -> HabitLog {
    HabitLog {
        id: 0,
        habit_id: HabitId::new(habit_id),
        date: day,
        completed,
        notes: None,
    }
}

/// Logs for `habit_id` completed on each of the `days` ending at `last`.
fn run_of(habit_id: i32, last: NaiveDate, days: u64) -> Vec<HabitLog> {
    (0..days)
        .filter_map(|offset| last.checked_sub_days(Days::new(offset)))
        .map(|day| log(habit_id, day, true))
        .collect()
}

#[fixture]
fn today() -> NaiveDate {
    date("2024-01-15")
}

#[rstest]
#[case(Some(30), 0, 0)]
#[case(Some(30), 15, 50)]
#[case(None, 15, 50)]
#[case(Some(-4), 15, 50)]
#[case(Some(3), 1, 33)]
#[case(Some(3), 2, 67)]
#[case(Some(8), 1, 13)]
#[case(Some(20), 500, 100)]
#[case(Some(i32::MAX), u32::MAX, 100)]
fn progress_is_bounded_and_rounded(
    #[case] target: Option<i32>,
    #[case] completed: u32,
    #[case] expected: u8,
) {
    let result = progress(target, completed);
    assert_eq!(result.percent, expected);
    assert!(result.percent <= 100);
}

#[rstest]
#[case(None, true)]
#[case(Some(0), true)]
#[case(Some(-1), true)]
#[case(Some(12), false)]
fn progress_flags_defaulted_targets(#[case] target: Option<i32>, #[case] defaulted: bool) {
    let result = progress(target, 1);
    assert_eq!(result.target_defaulted, defaulted);
    if defaulted {
        assert_eq!(result.target_days, DEFAULT_TARGET_DAYS);
    }
}

#[rstest]
fn index_ignores_incomplete_logs(today: NaiveDate) {
    let index = CompletionIndex::new(&[log(1, today, false), log(2, today, true)]);
    assert!(!index.is_completed(HabitId::new(1), today));
    assert!(index.is_completed(HabitId::new(2), today));
    assert_eq!(index.completed_on(&[habit(1, 30), habit(2, 30)], today), 1);
}

#[rstest]
fn streak_is_zero_without_logs(today: NaiveDate) {
    let index = CompletionIndex::new(&[]);
    assert_eq!(active_streak(&[habit(1, 30)], &index, today), 0);
}

#[rstest]
fn streak_is_zero_without_habits(today: NaiveDate) {
    let index = CompletionIndex::new(&run_of(1, today, 3));
    assert_eq!(active_streak(&[], &index, today), 0);
}

#[rstest]
fn streak_counts_kept_days_after_a_lapse(today: NaiveDate) {
    let habits = [habit(1, 30), habit(2, 30)];
    let mut logs = run_of(1, today, 8);
    logs.extend(run_of(2, today, 5));
    let index = CompletionIndex::new(&logs);
    assert_eq!(active_streak(&habits, &index, today), 5);
}

#[rstest]
fn streak_is_zero_when_today_is_not_kept(today: NaiveDate) {
    let yesterday = today.pred_opt().expect("yesterday exists");
    let index = CompletionIndex::new(&run_of(1, yesterday, 4));
    assert_eq!(active_streak(&[habit(1, 30)], &index, today), 0);
}

#[rstest]
fn streak_is_bounded(today: NaiveDate) {
    let index = CompletionIndex::new(&run_of(1, today, u64::from(MAX_STREAK_DAYS) + 10));
    assert_eq!(active_streak(&[habit(1, 30)], &index, today), MAX_STREAK_DAYS);
}

#[rstest]
fn completion_rate_is_zero_without_habits(today: NaiveDate) {
    let index = CompletionIndex::new(&run_of(1, today, 7));
    assert_eq!(completion_rate(&[], &index, today, 7), 0);
}

#[rstest]
fn completion_rate_is_zero_for_empty_window(today: NaiveDate) {
    let index = CompletionIndex::new(&run_of(1, today, 7));
    assert_eq!(completion_rate(&[habit(1, 30)], &index, today, 0), 0);
}

#[rstest]
fn completion_rate_averages_daily_ratios(today: NaiveDate) {
    // Habit 1 every day, habit 2 on the last three days: (7 + 3) / 14.
    let habits = [habit(1, 30), habit(2, 30)];
    let mut logs = run_of(1, today, 7);
    logs.extend(run_of(2, today, 3));
    let index = CompletionIndex::new(&logs);
    assert_eq!(completion_rate(&habits, &index, today, 7), 71);
}

#[rstest]
fn completion_rate_ignores_days_outside_window(today: NaiveDate) {
    let eighth_day_back = today.checked_sub_days(Days::new(7)).expect("date exists");
    let index = CompletionIndex::new(&[log(1, eighth_day_back, true)]);
    assert_eq!(completion_rate(&[habit(1, 30)], &index, today, 7), 0);
}

#[rstest]
fn weekly_series_is_oldest_first_with_weekday_labels(today: NaiveDate) {
    let index = CompletionIndex::new(&[log(1, today, true)]);
    let habits = [habit(1, 30)];
    let points: Vec<_> = daily_series(&habits, &index, today, SeriesWindow::Weekly).collect();

    assert_eq!(points.len(), 7);
    assert_eq!(points[0].date, date("2024-01-09"));
    assert_eq!(points[0].label, "Tue");
    let last = points.last().expect("series is non-empty");
    assert_eq!(last.date, today);
    assert_eq!(last.label, "Mon");
    assert_eq!(last.completed_count, 1);
}

#[rstest]
fn monthly_series_spans_thirty_days(today: NaiveDate) {
    let index = CompletionIndex::default();
    let points: Vec<_> = daily_series(&[], &index, today, SeriesWindow::Monthly).collect();

    assert_eq!(points.len(), 30);
    assert_eq!(points[0].label, "Dec 17");
    assert!(points.iter().all(|point| point.completed_count == 0));
}

#[rstest]
fn series_is_recomputed_per_call(today: NaiveDate) {
    let habits = [habit(1, 30)];
    let index = CompletionIndex::new(&run_of(1, today, 2));
    let first: Vec<_> = daily_series(&habits, &index, today, SeriesWindow::Weekly).collect();
    let second: Vec<_> = daily_series(&habits, &index, today, SeriesWindow::Weekly).collect();
    assert_eq!(first, second);
}

#[rstest]
fn report_counts_completions_in_current_month(today: NaiveDate) {
    let habits = [habit(1, 0)];
    let mut logs = run_of(1, today, 20);
    logs.push(log(1, date("2024-01-20"), false));
    let report = AnalyticsReport::compute(&habits, &logs, today);

    let entry = &report.habits[0];
    assert_eq!(entry.completed_this_month, 15);
    assert_eq!(entry.progress, 50);
    assert!(entry.target_defaulted);
    assert_eq!(entry.target_days, DEFAULT_TARGET_DAYS);
    assert_eq!(report.total_habits, 1);
    assert_eq!(report.active_streak, 20);
    assert_eq!(report.weekly_rate, 100);
    assert_eq!(report.monthly_rate, 67);
}

#[rstest]
fn later_days_of_the_month_count_towards_progress_only(today: NaiveDate) {
    let habits = [habit(1, 2)];
    let logs = [
        log(1, today, true),
        log(1, date("2024-01-20"), true),
        log(1, date("2024-02-01"), true),
    ];
    let report = AnalyticsReport::compute(&habits, &logs, today);

    assert_eq!(report.habits[0].completed_this_month, 2);
    assert_eq!(report.habits[0].progress, 100);
    assert_eq!(report.active_streak, 1);
    assert_eq!(report.weekly_rate, 14);
    assert!(report.monthly.iter().all(|point| point.date <= today));
}

#[rstest]
fn report_for_user_without_habits_is_empty(today: NaiveDate) {
    let report = AnalyticsReport::compute(&[], &[], today);
    assert_eq!(report.active_streak, 0);
    assert_eq!(report.weekly_rate, 0);
    assert_eq!(report.monthly_rate, 0);
    assert_eq!(report.weekly.len(), 7);
    assert!(report.habits.is_empty());
}
