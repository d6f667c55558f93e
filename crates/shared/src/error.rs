//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Business-rule failures (`InvalidOrderNumber`, `Conflict`,
/// `InsufficientFunds`) are never retryable; `RateLimited` and `Upstream`
/// are transient and the caller may retry with backoff.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Malformed request input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Order number failed the checksum.
    #[error("Invalid order number: {0}")]
    InvalidOrderNumber(String),

    /// Conflict (e.g., order number owned by another user).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Withdrawal exceeds the current balance.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// The accrual service asked us to back off.
    #[error("Rate limited by upstream: {0}")]
    RateLimited(String),

    /// The accrual service is unavailable or unreachable.
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Validation(_) => 400,
            Self::InvalidOrderNumber(_) => 422,
            Self::Conflict(_) => 409,
            Self::InsufficientFunds(_) => 402,
            Self::RateLimited(_) => 429,
            Self::Upstream(_) => 502,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidOrderNumber(_) => "INVALID_ORDER_NUMBER",
            Self::Conflict(_) => "CONFLICT",
            Self::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::Upstream(_) => "UPSTREAM_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller may retry the operation later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::Upstream(_) | Self::Database(_) | Self::Internal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Unauthorized(String::new()).status_code(), 401);
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(
            AppError::InvalidOrderNumber(String::new()).status_code(),
            422
        );
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(AppError::InsufficientFunds(String::new()).status_code(), 402);
        assert_eq!(AppError::RateLimited(String::new()).status_code(), 429);
        assert_eq!(AppError::Upstream(String::new()).status_code(), 502);
        assert_eq!(AppError::Database(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::InvalidOrderNumber(String::new()).error_code(),
            "INVALID_ORDER_NUMBER"
        );
        assert_eq!(AppError::Conflict(String::new()).error_code(), "CONFLICT");
        assert_eq!(
            AppError::InsufficientFunds(String::new()).error_code(),
            "INSUFFICIENT_FUNDS"
        );
        assert_eq!(
            AppError::RateLimited(String::new()).error_code(),
            "RATE_LIMITED"
        );
        assert_eq!(
            AppError::Upstream(String::new()).error_code(),
            "UPSTREAM_UNAVAILABLE"
        );
    }

    #[test]
    fn test_retryability() {
        assert!(AppError::RateLimited(String::new()).is_retryable());
        assert!(AppError::Upstream(String::new()).is_retryable());
        assert!(!AppError::Conflict(String::new()).is_retryable());
        assert!(!AppError::InsufficientFunds(String::new()).is_retryable());
        assert!(!AppError::InvalidOrderNumber(String::new()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::InsufficientFunds("msg".into()).to_string(),
            "Insufficient funds: msg"
        );
        assert_eq!(
            AppError::InvalidOrderNumber("msg".into()).to_string(),
            "Invalid order number: msg"
        );
    }
}
