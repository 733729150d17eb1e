//! Domain primitives, services and ports.
//!
//! Purpose: define the habit tracker's entities and rules independently of
//! HTTP and SQL. Inbound adapters call the driving ports; outbound adapters
//! implement [`ports::HabitRepository`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - UserId, Habit, HabitLog and friends: validated entities.
//! - metrics: pure streak, rate, progress and series calculations.
//! - HabitService: implementation of the driving ports.

mod calendar;
pub mod demo_seed;
pub mod error;
mod habit;
mod habit_log;
pub mod habit_service;
pub mod metrics;
pub mod ports;
pub mod trace_id;
mod user;
pub mod validation;

pub use self::calendar::{MonthFilter, parse_date};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::habit::{DEFAULT_HABIT_COLOR, DEFAULT_TARGET_DAYS, HABIT_NAME_MAX, Habit, HabitId, NewHabit};
pub use self::habit_log::{HabitLog, LogEntry};
pub use self::habit_service::HabitService;
pub use self::metrics::{AnalyticsReport, MetricsError};
pub use self::trace_id::TraceId;
pub use self::user::{USER_ID_MAX, UserId, UserRecord, UserValidationError};

/// HTTP header carrying the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";
