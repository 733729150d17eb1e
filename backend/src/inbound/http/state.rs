//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on the driving
//! ports, so they can be exercised with mocks and no I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{HabitsCommand, HabitsQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub habits: Arc<dyn HabitsCommand>,
    pub habits_query: Arc<dyn HabitsQuery>,
    /// Source of "today" when a request does not pin it.
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Construct state from the habit ports and a clock.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use habit_tracker::domain::HabitService;
    /// use habit_tracker::inbound::http::state::HttpState;
    /// use habit_tracker::outbound::memory::InMemoryHabitRepository;
    ///
    /// let service = Arc::new(HabitService::new(Arc::new(InMemoryHabitRepository::default())));
    /// let state = HttpState::new(service.clone(), service, Arc::new(mockable::DefaultClock));
    /// let _query = state.habits_query.clone();
    /// ```
    pub fn new(
        habits: Arc<dyn HabitsCommand>,
        habits_query: Arc<dyn HabitsQuery>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            habits,
            habits_query,
            clock,
        }
    }
}
