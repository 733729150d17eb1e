//! Demo data for local development.
//!
//! Seeding is idempotent: the demo user is upserted on every run and the
//! sample habits are only created while the user has none.

use crate::domain::ports::{HabitRepository, HabitRepositoryError};
use crate::domain::{NewHabit, UserId, UserRecord};

/// Identity used by the demo seed when none is configured.
pub const DEMO_USER_ID: &str = "demo-user-id";

const DEMO_HABITS: [(&str, &str, &str, i32); 2] = [
    ("Drink Water", "Drink 8 glasses of water daily", "#3B82F6", 30),
    ("Exercise", "30 minutes of cardio", "#10B981", 20),
];

/// What a seeding run changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOutcome {
    pub habits_created: usize,
}

/// Profile written for the demo user.
pub fn demo_user(id: UserId) -> UserRecord {
    UserRecord {
        id,
        email: Some("demo@example.com".into()),
        first_name: Some("Demo".into()),
        last_name: Some("User".into()),
    }
}

/// Ensure `user_id` exists and owns the sample habits.
pub async fn seed_demo<R>(repository: &R, user_id: &UserId) -> Result<SeedOutcome, HabitRepositoryError>
where
    R: HabitRepository + ?Sized,
{
    repository.upsert_user(&demo_user(user_id.clone())).await?;
    if !repository.list_habits(user_id).await?.is_empty() {
        return Ok(SeedOutcome { habits_created: 0 });
    }

    for (name, description, color, target_days) in DEMO_HABITS {
        repository
            .create_habit(NewHabit {
                user_id: user_id.clone(),
                name: name.to_owned(),
                description: Some(description.to_owned()),
                color: color.to_owned(),
                target_days,
            })
            .await?;
    }
    Ok(SeedOutcome {
        habits_created: DEMO_HABITS.len(),
    })
}
