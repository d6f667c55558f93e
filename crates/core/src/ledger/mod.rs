//! Order/balance/withdrawal ledger.
//!
//! The ledger is the combined order, balance, and withdrawal records for
//! all users. [`service::OrderLedgerService`] orchestrates validation,
//! deduplication, accrual lookup, and transactional balance mutation on
//! top of the [`store::LedgerStore`] persistence contract.

pub mod error;
pub mod service;
pub mod store;
pub mod types;

pub use error::LedgerError;
pub use service::OrderLedgerService;
pub use store::{LedgerStore, StoreError, WithdrawalOutcome};
pub use types::{BalanceSummary, OrderRecord, OrderStatus, SubmitOutcome, WithdrawalRecord};
