//! Habit domain service.
//!
//! Implements the driving ports on top of a [`HabitRepository`], enforcing
//! per-user ownership before any habit or log is read or written.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use tracing::error;

use crate::domain::metrics::{AnalyticsReport, MAX_STREAK_DAYS};
use crate::domain::ports::{
    HabitRepository, HabitRepositoryError, HabitsCommand, HabitsQuery, LogDayRequest,
};
use crate::domain::{Error, Habit, HabitId, HabitLog, MonthFilter, NewHabit, UserId};

/// Service implementing [`HabitsCommand`] and [`HabitsQuery`].
#[derive(Clone)]
pub struct HabitService<R> {
    repository: Arc<R>,
}

impl<R> HabitService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R> HabitService<R>
where
    R: HabitRepository,
{
    fn map_repository_error(error: HabitRepositoryError) -> Error {
        match error {
            HabitRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("habit store unavailable: {message}"))
            }
            HabitRepositoryError::Query { message } => {
                error!(%message, "habit repository query failed");
                Error::internal(format!("habit repository error: {message}"))
            }
            HabitRepositoryError::MissingUser { user_id } => {
                Error::unauthorized(format!("unknown user: {user_id}"))
            }
        }
    }

    fn habit_not_found() -> Error {
        Error::not_found("Habit not found")
    }

    /// Load `habit_id` if `user_id` owns it.
    async fn owned_habit(&self, user_id: &UserId, habit_id: HabitId) -> Result<Habit, Error> {
        self.repository
            .find_habit(habit_id)
            .await
            .map_err(Self::map_repository_error)?
            .filter(|habit| habit.is_owned_by(user_id))
            .ok_or_else(Self::habit_not_found)
    }
}

#[async_trait]
impl<R> HabitsCommand for HabitService<R>
where
    R: HabitRepository,
{
    async fn create_habit(&self, habit: NewHabit) -> Result<Habit, Error> {
        self.repository
            .create_habit(habit)
            .await
            .map_err(Self::map_repository_error)
    }

    async fn delete_habit(&self, user_id: &UserId, habit_id: HabitId) -> Result<(), Error> {
        self.owned_habit(user_id, habit_id).await?;
        let deleted = self
            .repository
            .delete_habit(habit_id)
            .await
            .map_err(Self::map_repository_error)?;
        // A concurrent delete may win between the ownership check and here.
        if deleted {
            Ok(())
        } else {
            Err(Self::habit_not_found())
        }
    }

    async fn log_day(&self, request: LogDayRequest) -> Result<HabitLog, Error> {
        let LogDayRequest { user_id, entry } = request;
        self.owned_habit(&user_id, entry.habit_id).await?;
        self.repository
            .upsert_habit_log(entry)
            .await
            .map_err(Self::map_repository_error)
    }
}

#[async_trait]
impl<R> HabitsQuery for HabitService<R>
where
    R: HabitRepository,
{
    async fn list_habits(&self, user_id: &UserId) -> Result<Vec<Habit>, Error> {
        self.repository
            .list_habits(user_id)
            .await
            .map_err(Self::map_repository_error)
    }

    async fn get_habit(&self, user_id: &UserId, habit_id: HabitId) -> Result<Habit, Error> {
        self.owned_habit(user_id, habit_id).await
    }

    async fn list_logs(
        &self,
        user_id: &UserId,
        habit_id: HabitId,
        month: Option<MonthFilter>,
    ) -> Result<Vec<HabitLog>, Error> {
        self.owned_habit(user_id, habit_id).await?;
        self.repository
            .list_habit_logs(habit_id, month)
            .await
            .map_err(Self::map_repository_error)
    }

    async fn analytics(&self, user_id: &UserId, today: NaiveDate) -> Result<AnalyticsReport, Error> {
        let habits = self
            .repository
            .list_habits(user_id)
            .await
            .map_err(Self::map_repository_error)?;
        let from = today
            .checked_sub_days(Days::new(u64::from(MAX_STREAK_DAYS)))
            .unwrap_or(NaiveDate::MIN);
        // Monthly counts include later days of the current month.
        let until = MonthFilter::containing(today)
            .next_month_start()
            .pred_opt()
            .unwrap_or(today);
        let logs = self
            .repository
            .list_logs_for_user(user_id, from, until)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(AnalyticsReport::compute(&habits, &logs, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::LogEntry;
    use crate::domain::ports::MockHabitRepository;
    use chrono::{DateTime, Utc};
    use rstest::{fixture, rstest};

    fn user(raw: &str) -> UserId {
        UserId::new(raw).expect("valid id")
    }

    fn habit(id: i32, owner: &str) -> Habit {
        Habit {
            id: HabitId::new(id),
            user_id: user(owner),
            name: "Drink Water".into(),
            description: None,
            color: "#3B82F6".into(),
            target_days: 30,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn day(raw: &str) -> NaiveDate {
        crate::domain::parse_date(raw).expect("fixture date is valid")
    }

    fn make_service(repo: MockHabitRepository) -> HabitService<MockHabitRepository> {
        HabitService::new(Arc::new(repo))
    }

    #[fixture]
    fn owner() -> UserId {
        user("owner")
    }

    #[rstest]
    #[tokio::test]
    async fn get_habit_hides_foreign_habits(owner: UserId) {
        let mut repo = MockHabitRepository::new();
        repo.expect_find_habit()
            .times(1)
            .return_once(|_| Ok(Some(habit(1, "someone-else"))));

        let error = make_service(repo)
            .get_habit(&owner, HabitId::new(1))
            .await
            .expect_err("foreign habit is hidden");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "Habit not found");
    }

    #[rstest]
    #[tokio::test]
    async fn delete_checks_ownership_before_deleting(owner: UserId) {
        let mut repo = MockHabitRepository::new();
        repo.expect_find_habit()
            .times(1)
            .return_once(|_| Ok(Some(habit(2, "intruder"))));
        repo.expect_delete_habit().never();

        let error = make_service(repo)
            .delete_habit(&owner, HabitId::new(2))
            .await
            .expect_err("foreign habit is not deleted");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_reports_lost_race_as_not_found(owner: UserId) {
        let mut repo = MockHabitRepository::new();
        repo.expect_find_habit()
            .return_once(|_| Ok(Some(habit(3, "owner"))));
        repo.expect_delete_habit().times(1).return_once(|_| Ok(false));

        let error = make_service(repo)
            .delete_habit(&owner, HabitId::new(3))
            .await
            .expect_err("row vanished");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn log_day_upserts_for_owner(owner: UserId) {
        let mut repo = MockHabitRepository::new();
        repo.expect_find_habit()
            .return_once(|_| Ok(Some(habit(4, "owner"))));
        repo.expect_upsert_habit_log()
            .times(1)
            .withf(|entry| entry.completed && entry.date == day("2024-01-15"))
            .return_once(|entry| {
                Ok(HabitLog {
                    id: 10,
                    habit_id: entry.habit_id,
                    date: entry.date,
                    completed: entry.completed,
                    notes: entry.notes,
                })
            });

        let request = LogDayRequest {
            user_id: owner,
            entry: LogEntry {
                habit_id: HabitId::new(4),
                date: day("2024-01-15"),
                completed: true,
                notes: None,
            },
        };
        let log = make_service(repo).log_day(request).await.expect("upsert succeeds");
        assert_eq!(log.id, 10);
        assert!(log.completed);
    }

    #[rstest]
    #[case(HabitRepositoryError::connection("pool timed out"), ErrorCode::ServiceUnavailable)]
    #[case(HabitRepositoryError::query("syntax error"), ErrorCode::InternalError)]
    #[case(HabitRepositoryError::missing_user("ghost"), ErrorCode::Unauthorized)]
    #[tokio::test]
    async fn repository_errors_map_to_domain_codes(
        owner: UserId,
        #[case] failure: HabitRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockHabitRepository::new();
        repo.expect_list_habits().return_once(move |_| Err(failure));

        let error = make_service(repo)
            .list_habits(&owner)
            .await
            .expect_err("repository failure propagates");
        assert_eq!(error.code(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn analytics_fetches_trailing_snapshot(owner: UserId) {
        let today = day("2024-01-15");
        let mut repo = MockHabitRepository::new();
        repo.expect_list_habits()
            .return_once(|_| Ok(vec![habit(1, "owner")]));
        repo.expect_list_logs_for_user()
            .times(1)
            .withf(move |_, from, to| {
                *to == day("2024-01-31") && *from == today - Days::new(u64::from(MAX_STREAK_DAYS))
            })
            .return_once(move |_, _, _| {
                Ok(vec![HabitLog {
                    id: 1,
                    habit_id: HabitId::new(1),
                    date: today,
                    completed: true,
                    notes: None,
                }])
            });

        let report = make_service(repo)
            .analytics(&owner, today)
            .await
            .expect("analytics succeeds");
        assert_eq!(report.active_streak, 1);
        assert_eq!(report.total_habits, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn analytics_counts_whole_month_but_bounds_streak_at_today(owner: UserId) {
        let today = day("2024-01-15");
        let mut target_two = habit(1, "owner");
        target_two.target_days = 2;
        let mut repo = MockHabitRepository::new();
        repo.expect_list_habits()
            .return_once(move |_| Ok(vec![target_two]));
        repo.expect_list_logs_for_user().return_once(move |_, _, _| {
            Ok(["2024-01-15", "2024-01-20"]
                .into_iter()
                .enumerate()
                .map(|(id, date)| HabitLog {
                    id: i32::try_from(id).expect("small id"),
                    habit_id: HabitId::new(1),
                    date: day(date),
                    completed: true,
                    notes: None,
                })
                .collect())
        });

        let report = make_service(repo)
            .analytics(&owner, today)
            .await
            .expect("analytics succeeds");
        assert_eq!(report.habits[0].completed_this_month, 2);
        assert_eq!(report.habits[0].progress, 100);
        assert_eq!(report.active_streak, 1);
        assert_eq!(report.weekly.last().map(|point| point.date), Some(today));
        assert_eq!(report.weekly.last().map(|point| point.completed_count), Some(1));
    }
}
