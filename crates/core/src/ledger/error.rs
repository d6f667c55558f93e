//! Ledger error types.

use thiserror::Error;

use crate::accrual::AccrualError;
use bonusmart_shared::AppError;

use super::store::StoreError;

/// Errors produced by ledger operations.
///
/// Business-rule failures are detected before any mutation and are never
/// retryable; `Accrual` and `Store` failures leave no partial state and
/// the caller may retry.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The order number failed the checksum.
    #[error("order number failed validation")]
    InvalidOrderNumber,

    /// The withdrawal amount is zero or negative.
    #[error("withdrawal amount must be positive")]
    InvalidAmount,

    /// The order number is owned by another user.
    #[error("order number already uploaded by another user")]
    Conflict,

    /// The withdrawal exceeds the current balance.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// The accrual lookup failed; the submission was not persisted.
    #[error(transparent)]
    Accrual(#[from] AccrualError),

    /// The backing store failed; the transaction was rolled back.
    #[error("store failure: {0}")]
    Store(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            // The unique constraint is the final arbiter for racing
            // submissions of the same number.
            StoreError::Duplicate => Self::Conflict,
            StoreError::Database(msg) => Self::Store(msg),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidOrderNumber => {
                Self::InvalidOrderNumber("order number failed validation".into())
            }
            LedgerError::InvalidAmount => {
                Self::Validation("withdrawal amount must be positive".into())
            }
            LedgerError::Conflict => {
                Self::Conflict("order number already uploaded by another user".into())
            }
            LedgerError::InsufficientFunds => {
                Self::InsufficientFunds("balance is lower than the requested sum".into())
            }
            LedgerError::Accrual(AccrualError::RateLimited { retry_after_secs }) => {
                Self::RateLimited(match retry_after_secs {
                    Some(secs) => format!("retry after {secs}s"),
                    None => "retry later".into(),
                })
            }
            LedgerError::Accrual(e) => Self::Upstream(e.to_string()),
            LedgerError::Store(msg) => Self::Database(msg),
        }
    }
}
