//! Authenticated user identity as seen by the cart domain.
//!
//! The identity provider is external and its ids are opaque strings; the
//! cart only needs a stable owner key to scope carts and authorise item
//! mutations, so no particular format is assumed.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest identifier accepted from the session.
pub const USER_ID_MAX_LEN: usize = 255;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must not contain whitespace or control characters")]
    InvalidId,
    #[error("user id must be at most {max} characters")]
    TooLong { max: usize },
}

/// Opaque user identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::UserId;
    ///
    /// let id = UserId::new("zG7k2fN1yQ8wLp3sT0aB").expect("valid id");
    /// assert_eq!(id.as_str(), "zG7k2fN1yQ8wLp3sT0aB");
    /// assert!(UserId::new(" ").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(UserValidationError::InvalidId);
        }
        if id.chars().count() > USER_ID_MAX_LEN {
            return Err(UserValidationError::TooLong {
                max: USER_ID_MAX_LEN,
            });
        }
        Ok(Self(id))
    }

    /// Generate a random identifier, for fixtures and local tooling.
    pub fn random() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
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
