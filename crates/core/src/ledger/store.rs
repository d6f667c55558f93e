//! Persistence contract for the ledger.
//!
//! Every mutating operation executes inside a single database transaction
//! with commit-or-rollback-all semantics. The implementation lives in the
//! db crate; this trait keeps the service testable without a database.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::{BalanceSummary, OrderRecord, OrderStatus, WithdrawalRecord};

/// Errors from the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the insert: the order number is
    /// already claimed, by an order or a withdrawal.
    #[error("order number already claimed")]
    Duplicate,

    /// Any other database failure. The transaction was rolled back.
    #[error("database error: {0}")]
    Database(String),
}

/// Result of a withdrawal attempt inside its transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalOutcome {
    /// The withdrawal row was inserted and the balance debited.
    Applied,
    /// The balance (plus any fresh accrual) did not cover the sum; the
    /// transaction was rolled back.
    InsufficientFunds,
}

/// Transactional persistence for orders, balances, and withdrawals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// True iff `owner` claimed `number`, as an order or a withdrawal.
    /// Orders and withdrawals share one number namespace.
    async fn order_exists(&self, owner: Uuid, number: &str) -> Result<bool, StoreError>;

    /// True iff anyone claimed `number`, on either side of the ledger.
    /// Used to detect cross-user duplicate submissions before the
    /// accrual lookup.
    async fn order_exists_any(&self, number: &str) -> Result<bool, StoreError>;

    /// Inserts the order row and credits the owner's balance by `accrual`
    /// in one transaction; both commit together or neither does.
    async fn insert_order_and_credit(
        &self,
        owner: Uuid,
        number: &str,
        status: OrderStatus,
        accrual: Decimal,
    ) -> Result<(), StoreError>;

    /// Reads the live balance and the aggregated withdrawn total.
    async fn balance(&self, owner: Uuid) -> Result<BalanceSummary, StoreError>;

    /// Inside one transaction: locks the balance row, verifies
    /// `current + fresh_accrual >= sum`, inserts the withdrawal row, and
    /// sets `current += fresh_accrual - sum`. Insufficient funds rolls
    /// back and reports a distinct outcome, not an error.
    async fn insert_withdrawal_and_debit(
        &self,
        owner: Uuid,
        number: &str,
        sum: Decimal,
        fresh_accrual: Decimal,
    ) -> Result<WithdrawalOutcome, StoreError>;

    /// All orders for a user, newest first (an API contract).
    async fn list_orders(&self, owner: Uuid) -> Result<Vec<OrderRecord>, StoreError>;

    /// All withdrawals for a user, newest first.
    async fn list_withdrawals(&self, owner: Uuid) -> Result<Vec<WithdrawalRecord>, StoreError>;
}
