//! Shared primitives for all Rust crates in ConsorciaTech.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across ConsorciaTech crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated or presented an invalid credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but blocked by policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// An external HTTP dependency answered with a non-success status.
    #[error("upstream error ({status}): {message}")]
    Upstream {
        /// Status code returned by the upstream service.
        status: u16,
        /// Human-readable failure description.
        message: String,
    },

    /// An external dependency could not be reached.
    #[error("dependency unavailable: {0}")]
    Unavailable(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns whether redelivering the same input could succeed.
    ///
    /// Validation and authorization failures need new input; dependency and
    /// internal failures may clear on their own.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Upstream { .. } | Self::Unavailable(_) | Self::Internal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn validation_errors_are_not_retryable() {
        assert!(!AppError::Validation("missing uid".to_owned()).is_retryable());
        assert!(!AppError::Unauthorized("bad token".to_owned()).is_retryable());
    }

    #[test]
    fn dependency_errors_are_retryable() {
        assert!(AppError::Unavailable("store offline".to_owned()).is_retryable());
        assert!(
            AppError::Upstream {
                status: 503,
                message: "busy".to_owned(),
            }
            .is_retryable()
        );
    }
}
