//! User identity as seen by the habit tracker.
//!
//! Users are owned by the external auth integration. Identifiers are opaque
//! strings issued there; this service validates their shape and nothing more.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum accepted length of a user identifier.
pub const USER_ID_MAX: usize = 255;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must not have leading or trailing whitespace")]
    PaddedId,
    #[error("user id must be at most {max} characters")]
    IdTooLong { max: usize },
}

/// Opaque user identifier issued by the auth integration.
///
/// ## Invariants
/// - Non-empty, free of surrounding whitespace, at most [`USER_ID_MAX`]
///   characters.
///
/// # Examples
/// ```
/// use habit_tracker::domain::UserId;
///
/// let id = UserId::new("demo-user-id").unwrap();
/// assert_eq!(id.as_ref(), "demo-user-id");
/// assert!(UserId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "demo-user-id")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::PaddedId);
        }
        if id.chars().count() > USER_ID_MAX {
            return Err(UserValidationError::IdTooLong { max: USER_ID_MAX });
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Profile fields this service may write when seeding a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserRecord {
    /// Record carrying only an identifier.
    pub fn bare(id: UserId) -> Self {
        Self {
            id,
            email: None,
            first_name: None,
            last_name: None,
        }
    }
}
