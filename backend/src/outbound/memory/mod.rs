//! In-process habit store.
//!
//! Used when no database URL is configured and throughout the test suite.
//! All state sits behind one mutex, so each repository call is atomic and
//! the `(habit_id, date)` uniqueness holds under concurrent upserts.
//!
//! No user directory exists outside the process, so a habit's owner is
//! registered on its first `create_habit`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::domain::ports::{HabitRepository, HabitRepositoryError};
use crate::domain::{
    Habit, HabitId, HabitLog, LogEntry, MonthFilter, NewHabit, UserId, UserRecord,
};

#[derive(Debug, Default)]
struct Store {
    users: HashMap<UserId, UserRecord>,
    habits: BTreeMap<HabitId, Habit>,
    logs: BTreeMap<(HabitId, NaiveDate), HabitLog>,
    next_habit_id: i32,
    next_log_id: i32,
}

impl Store {
    fn allocate_habit_id(&mut self) -> Result<HabitId, HabitRepositoryError> {
        self.next_habit_id = self
            .next_habit_id
            .checked_add(1)
            .ok_or_else(|| HabitRepositoryError::query("habit id sequence exhausted"))?;
        Ok(HabitId::new(self.next_habit_id))
    }

    fn allocate_log_id(&mut self) -> Result<i32, HabitRepositoryError> {
        self.next_log_id = self
            .next_log_id
            .checked_add(1)
            .ok_or_else(|| HabitRepositoryError::query("habit log id sequence exhausted"))?;
        Ok(self.next_log_id)
    }
}

/// Mutex-guarded [`HabitRepository`] with the log rules of the PostgreSQL
/// adapter: cascade delete and upsert keyed on `(habit_id, date)`.
#[derive(Debug, Default)]
pub struct InMemoryHabitRepository {
    store: Mutex<Store>,
}

impl InMemoryHabitRepository {
    /// Repository pre-populated with bare records for `users`.
    pub fn with_users(users: impl IntoIterator<Item = UserId>) -> Self {
        let repo = Self::default();
        {
            let mut store = repo.lock();
            for id in users {
                store.users.insert(id.clone(), UserRecord::bare(id));
            }
        }
        repo
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HabitRepository for InMemoryHabitRepository {
    async fn create_habit(&self, habit: NewHabit) -> Result<Habit, HabitRepositoryError> {
        let mut store = self.lock();
        let id = store.allocate_habit_id()?;
        store
            .users
            .entry(habit.user_id.clone())
            .or_insert_with(|| UserRecord::bare(habit.user_id.clone()));
        let created = Habit {
            id,
            user_id: habit.user_id,
            name: habit.name,
            description: habit.description,
            color: habit.color,
            target_days: habit.target_days,
            created_at: Utc::now(),
        };
        store.habits.insert(id, created.clone());
        Ok(created)
    }

    async fn list_habits(&self, user_id: &UserId) -> Result<Vec<Habit>, HabitRepositoryError> {
        let store = self.lock();
        Ok(store
            .habits
            .values()
            .filter(|habit| &habit.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_habit(&self, id: HabitId) -> Result<Option<Habit>, HabitRepositoryError> {
        Ok(self.lock().habits.get(&id).cloned())
    }

    async fn delete_habit(&self, id: HabitId) -> Result<bool, HabitRepositoryError> {
        let mut store = self.lock();
        if store.habits.remove(&id).is_none() {
            return Ok(false);
        }
        store.logs.retain(|(habit_id, _), _| *habit_id != id);
        Ok(true)
    }

    async fn list_habit_logs(
        &self,
        habit_id: HabitId,
        month: Option<MonthFilter>,
    ) -> Result<Vec<HabitLog>, HabitRepositoryError> {
        let store = self.lock();
        let (from, until) = match month {
            Some(month) => (month.first_day(), Some(month.next_month_start())),
            None => (NaiveDate::MIN, None),
        };
        Ok(store
            .logs
            .range((habit_id, from)..=(habit_id, NaiveDate::MAX))
            .map(|(_, log)| log)
            .take_while(|log| until.is_none_or(|end| log.date < end))
            .cloned()
            .collect())
    }

    async fn upsert_habit_log(&self, entry: LogEntry) -> Result<HabitLog, HabitRepositoryError> {
        let mut store = self.lock();
        if !store.habits.contains_key(&entry.habit_id) {
            return Err(HabitRepositoryError::query(format!(
                "habit {} does not exist",
                entry.habit_id
            )));
        }
        let key = (entry.habit_id, entry.date);
        let id = match store.logs.get(&key) {
            Some(existing) => existing.id,
            None => store.allocate_log_id()?,
        };
        let log = HabitLog {
            id,
            habit_id: entry.habit_id,
            date: entry.date,
            completed: entry.completed,
            notes: entry.notes,
        };
        store.logs.insert(key, log.clone());
        Ok(log)
    }

    async fn list_logs_for_user(
        &self,
        user_id: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HabitLog>, HabitRepositoryError> {
        if from > to {
            return Ok(Vec::new());
        }
        let store = self.lock();
        let owned: Vec<HabitId> = store
            .habits
            .values()
            .filter(|habit| &habit.user_id == user_id)
            .map(|habit| habit.id)
            .collect();
        let mut logs: Vec<HabitLog> = owned
            .into_iter()
            .flat_map(|habit_id| store.logs.range((habit_id, from)..=(habit_id, to)))
            .map(|(_, log)| log.clone())
            .collect();
        logs.sort_by_key(|log| (log.date, log.habit_id));
        Ok(logs)
    }

    async fn upsert_user(&self, user: &UserRecord) -> Result<(), HabitRepositoryError> {
        self.lock().users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{DEFAULT_HABIT_COLOR, parse_date};
    use rstest::{fixture, rstest};

    fn day(raw: &str) -> NaiveDate {
        parse_date(raw).expect("fixture date is valid")
    }

    fn new_habit(user_id: &UserId, name: &str) -> NewHabit {
        NewHabit {
            user_id: user_id.clone(),
            name: name.into(),
            description: None,
            color: DEFAULT_HABIT_COLOR.into(),
            target_days: 30,
        }
    }

    fn entry(habit_id: HabitId, date: &str, completed: bool) -> LogEntry {
        LogEntry {
            habit_id,
            date: day(date),
            completed,
            notes: None,
        }
    }

    #[fixture]
    fn user_id() -> UserId {
        UserId::new("u1").expect("valid id")
    }

    #[fixture]
    fn repo(user_id: UserId) -> InMemoryHabitRepository {
        InMemoryHabitRepository::with_users([user_id])
    }

    #[rstest]
    #[tokio::test]
    async fn create_registers_unseen_owner(repo: InMemoryHabitRepository) {
        let stranger = UserId::new("nobody").expect("valid id");
        let habit = repo
            .create_habit(new_habit(&stranger, "Read"))
            .await
            .expect("owner registered on first habit");
        assert_eq!(habit.user_id, stranger);
        assert!(repo.lock().users.contains_key(&stranger));
        assert_eq!(repo.list_habits(&stranger).await.expect("list").len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn create_keeps_existing_user_record(repo: InMemoryHabitRepository, user_id: UserId) {
        let record = UserRecord {
            email: Some("u1@example.com".into()),
            ..UserRecord::bare(user_id.clone())
        };
        repo.upsert_user(&record).await.expect("user");
        repo.create_habit(new_habit(&user_id, "Read")).await.expect("create");
        assert_eq!(repo.lock().users.get(&user_id), Some(&record));
    }

    #[rstest]
    #[tokio::test]
    async fn lists_in_creation_order(repo: InMemoryHabitRepository, user_id: UserId) {
        for name in ["A", "B", "C"] {
            repo.create_habit(new_habit(&user_id, name)).await.expect("create");
        }
        let names: Vec<_> = repo
            .list_habits(&user_id)
            .await
            .expect("list")
            .into_iter()
            .map(|habit| habit.name)
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[rstest]
    #[tokio::test]
    async fn upsert_is_idempotent_and_toggles(repo: InMemoryHabitRepository, user_id: UserId) {
        let habit = repo.create_habit(new_habit(&user_id, "Run")).await.expect("create");

        let first = repo
            .upsert_habit_log(entry(habit.id, "2024-01-15", true))
            .await
            .expect("insert");
        let again = repo
            .upsert_habit_log(entry(habit.id, "2024-01-15", true))
            .await
            .expect("repeat");
        let toggled = repo
            .upsert_habit_log(entry(habit.id, "2024-01-15", false))
            .await
            .expect("toggle");

        assert_eq!(first, again);
        assert_eq!(toggled.id, first.id);
        assert!(!toggled.completed);
        let logs = repo.list_habit_logs(habit.id, None).await.expect("list");
        assert_eq!(logs.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn month_filter_excludes_neighbouring_months(
        repo: InMemoryHabitRepository,
        user_id: UserId,
    ) {
        let habit = repo.create_habit(new_habit(&user_id, "Run")).await.expect("create");
        for date in ["2024-01-31", "2024-02-01", "2024-02-29", "2024-03-01"] {
            repo.upsert_habit_log(entry(habit.id, date, true))
                .await
                .expect("upsert");
        }

        let february = MonthFilter::parse("2024-02").expect("valid month");
        let dates: Vec<_> = repo
            .list_habit_logs(habit.id, Some(february))
            .await
            .expect("list")
            .into_iter()
            .map(|log| log.date)
            .collect();
        assert_eq!(dates, [day("2024-02-01"), day("2024-02-29")]);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_cascades_to_logs(repo: InMemoryHabitRepository, user_id: UserId) {
        let habit = repo.create_habit(new_habit(&user_id, "Run")).await.expect("create");
        repo.upsert_habit_log(entry(habit.id, "2024-01-15", true))
            .await
            .expect("upsert");

        assert!(repo.delete_habit(habit.id).await.expect("delete"));
        assert!(!repo.delete_habit(habit.id).await.expect("second delete"));
        assert!(repo.list_habit_logs(habit.id, None).await.expect("list").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn user_logs_are_scoped_by_owner_and_range(
        repo: InMemoryHabitRepository,
        user_id: UserId,
    ) {
        let other = UserId::new("u2").expect("valid id");
        repo.upsert_user(&UserRecord::bare(other.clone())).await.expect("user");
        let mine = repo.create_habit(new_habit(&user_id, "Mine")).await.expect("create");
        let theirs = repo.create_habit(new_habit(&other, "Theirs")).await.expect("create");
        for (habit, date) in [
            (mine.id, "2024-01-01"),
            (mine.id, "2024-01-10"),
            (theirs.id, "2024-01-10"),
            (mine.id, "2024-01-20"),
        ] {
            repo.upsert_habit_log(entry(habit, date, true)).await.expect("upsert");
        }

        let logs = repo
            .list_logs_for_user(&user_id, day("2024-01-05"), day("2024-01-20"))
            .await
            .expect("list");
        let dates: Vec<_> = logs.iter().map(|log| log.date).collect();
        assert_eq!(dates, [day("2024-01-10"), day("2024-01-20")]);
        assert!(logs.iter().all(|log| log.habit_id == mine.id));
    }

    #[rstest]
    #[tokio::test]
    async fn concurrent_upserts_converge_on_one_row(user_id: UserId) {
        let repo = Arc::new(InMemoryHabitRepository::with_users([user_id.clone()]));
        let habit = repo.create_habit(new_habit(&user_id, "Run")).await.expect("create");

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    repo.upsert_habit_log(entry(habit.id, "2024-01-15", i % 2 == 0))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.expect("task joins").expect("upsert succeeds");
        }

        let logs = repo.list_habit_logs(habit.id, None).await.expect("list");
        assert_eq!(logs.len(), 1);
    }
}
