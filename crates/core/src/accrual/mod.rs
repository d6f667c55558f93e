//! Client for the external accrual service.
//!
//! The accrual service answers `GET /api/orders/{number}` with the reward
//! state of an order. This module translates its responses into ledger
//! terms: a [`AccrualSnapshot`] on success, or an [`AccrualError`] naming
//! how the lookup failed and whether it is worth retrying.
//!
//! The service layer talks to the [`AccrualSource`] trait so tests can run
//! without a live upstream.

mod client;
mod types;

use async_trait::async_trait;

pub use client::AccrualClient;
pub use types::{AccrualError, AccrualSnapshot, AccrualStatus, classify_response};

/// Read access to the accrual service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccrualSource: Send + Sync {
    /// Fetches the reward state for an order number.
    ///
    /// # Errors
    ///
    /// Returns an [`AccrualError`] when the upstream rate-limits, fails,
    /// or cannot be reached. All of these are retryable from the caller's
    /// point of view; nothing has been persisted.
    async fn fetch(&self, order_number: &str) -> Result<AccrualSnapshot, AccrualError>;
}
