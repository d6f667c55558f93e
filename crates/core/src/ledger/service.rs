//! Order ledger orchestration.
//!
//! Sequencing for a submission: checksum, ownership checks, accrual
//! lookup under a deadline, then one transactional insert-and-credit.
//! No database transaction ever spans the accrual call; the unique
//! constraint on the order number settles concurrent submissions.

use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::accrual::{AccrualError, AccrualSnapshot, AccrualSource};
use crate::luhn;

use super::error::LedgerError;
use super::store::{LedgerStore, WithdrawalOutcome};
use super::types::{BalanceSummary, OrderRecord, SubmitOutcome, WithdrawalRecord};

/// Central business-logic component of the ledger.
#[derive(Debug)]
pub struct OrderLedgerService<S, A> {
    store: S,
    accrual: A,
    accrual_deadline: Duration,
}

impl<S: LedgerStore, A: AccrualSource> OrderLedgerService<S, A> {
    /// Creates the service.
    ///
    /// `accrual_deadline` bounds the accrual lookup; it should be derived
    /// from (and stay under) the inbound request deadline.
    pub const fn new(store: S, accrual: A, accrual_deadline: Duration) -> Self {
        Self {
            store,
            accrual,
            accrual_deadline,
        }
    }

    /// Submits an order number for the given user.
    ///
    /// Re-submission by the owner is an idempotent success; a number
    /// owned by another user is a conflict. On accrual failure nothing is
    /// persisted and the user may resubmit.
    ///
    /// # Errors
    ///
    /// See [`LedgerError`].
    pub async fn submit_order(
        &self,
        owner: Uuid,
        number: &str,
    ) -> Result<SubmitOutcome, LedgerError> {
        if !luhn::is_valid(number) {
            return Err(LedgerError::InvalidOrderNumber);
        }

        if self.store.order_exists(owner, number).await? {
            debug!(%owner, number, "order already uploaded by this user");
            return Ok(SubmitOutcome::AlreadyUploaded);
        }
        if self.store.order_exists_any(number).await? {
            return Err(LedgerError::Conflict);
        }

        let snapshot = self.fetch_accrual(number).await?;

        // A concurrent submission may have won the race since the
        // pre-check; the unique constraint reports it as Duplicate, which
        // maps to Conflict here.
        self.store
            .insert_order_and_credit(owner, number, snapshot.status, snapshot.accrual)
            .await?;

        info!(%owner, number, status = %snapshot.status, "order recorded");
        Ok(SubmitOutcome::Accepted)
    }

    /// Spends `sum` points against `number`, crediting any freshly
    /// fetched accrual for that order in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` when the balance does not cover the
    /// sum; the balance is left untouched.
    pub async fn request_withdrawal(
        &self,
        owner: Uuid,
        number: &str,
        sum: Decimal,
    ) -> Result<(), LedgerError> {
        if !luhn::is_valid(number) {
            return Err(LedgerError::InvalidOrderNumber);
        }
        if sum <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }

        let snapshot = self.fetch_accrual(number).await?;

        match self
            .store
            .insert_withdrawal_and_debit(owner, number, sum, snapshot.accrual)
            .await?
        {
            WithdrawalOutcome::Applied => {
                info!(%owner, number, %sum, "withdrawal applied");
                Ok(())
            }
            WithdrawalOutcome::InsufficientFunds => Err(LedgerError::InsufficientFunds),
        }
    }

    /// Current and lifetime-withdrawn balance for a user.
    pub async fn balance(&self, owner: Uuid) -> Result<BalanceSummary, LedgerError> {
        Ok(self.store.balance(owner).await?)
    }

    /// The user's orders, newest first. Empty is a valid outcome.
    pub async fn list_orders(&self, owner: Uuid) -> Result<Vec<OrderRecord>, LedgerError> {
        Ok(self.store.list_orders(owner).await?)
    }

    /// The user's withdrawals, newest first. Empty is a valid outcome.
    pub async fn list_withdrawals(
        &self,
        owner: Uuid,
    ) -> Result<Vec<WithdrawalRecord>, LedgerError> {
        Ok(self.store.list_withdrawals(owner).await?)
    }

    /// Runs the accrual fetch under the service deadline. A lookup that
    /// outlives the deadline fails as retryable; nothing was persisted.
    async fn fetch_accrual(&self, number: &str) -> Result<AccrualSnapshot, AccrualError> {
        match tokio::time::timeout(self.accrual_deadline, self.accrual.fetch(number)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(number, "accrual lookup exceeded the deadline");
                Err(AccrualError::Unreachable(
                    "accrual lookup exceeded the deadline".into(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accrual::MockAccrualSource;
    use crate::ledger::store::{MockLedgerStore, StoreError};
    use crate::ledger::types::OrderStatus;
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    const VALID_NUMBER: &str = "79927398713";
    const DEADLINE: Duration = Duration::from_secs(10);

    fn owner() -> Uuid {
        Uuid::new_v4()
    }

    fn processed_snapshot(amount: Decimal) -> AccrualSnapshot {
        AccrualSnapshot {
            status: OrderStatus::Processed,
            accrual: amount,
        }
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_checksum() {
        let service =
            OrderLedgerService::new(MockLedgerStore::new(), MockAccrualSource::new(), DEADLINE);

        let err = service.submit_order(owner(), "79927398710").await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOrderNumber));
    }

    #[tokio::test]
    async fn test_resubmission_by_owner_is_idempotent() {
        let user = owner();
        let mut store = MockLedgerStore::new();
        store
            .expect_order_exists()
            .with(eq(user), eq(VALID_NUMBER))
            .once()
            .returning(|_, _| Ok(true));
        // No accrual call and no insert: the mocks would panic on any
        // unexpected invocation.
        let service = OrderLedgerService::new(store, MockAccrualSource::new(), DEADLINE);

        let outcome = service.submit_order(user, VALID_NUMBER).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::AlreadyUploaded);
    }

    #[tokio::test]
    async fn test_number_owned_by_other_user_is_conflict() {
        let mut store = MockLedgerStore::new();
        store.expect_order_exists().returning(|_, _| Ok(false));
        store
            .expect_order_exists_any()
            .with(eq(VALID_NUMBER))
            .once()
            .returning(|_| Ok(true));
        let service = OrderLedgerService::new(store, MockAccrualSource::new(), DEADLINE);

        let err = service.submit_order(owner(), VALID_NUMBER).await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict));
    }

    #[tokio::test]
    async fn test_successful_submission_credits_accrual() {
        let user = owner();
        let mut store = MockLedgerStore::new();
        store.expect_order_exists().returning(|_, _| Ok(false));
        store.expect_order_exists_any().returning(|_| Ok(false));
        store
            .expect_insert_order_and_credit()
            .with(
                eq(user),
                eq(VALID_NUMBER),
                eq(OrderStatus::Processed),
                eq(dec!(729.98)),
            )
            .once()
            .returning(|_, _, _, _| Ok(()));

        let mut accrual = MockAccrualSource::new();
        accrual
            .expect_fetch()
            .with(eq(VALID_NUMBER))
            .once()
            .returning(|_| Ok(processed_snapshot(dec!(729.98))));

        let service = OrderLedgerService::new(store, accrual, DEADLINE);
        let outcome = service.submit_order(user, VALID_NUMBER).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted);
    }

    #[tokio::test]
    async fn test_pending_accrual_recorded_with_zero() {
        let user = owner();
        let mut store = MockLedgerStore::new();
        store.expect_order_exists().returning(|_, _| Ok(false));
        store.expect_order_exists_any().returning(|_| Ok(false));
        store
            .expect_insert_order_and_credit()
            .with(
                eq(user),
                eq(VALID_NUMBER),
                eq(OrderStatus::New),
                eq(Decimal::ZERO),
            )
            .once()
            .returning(|_, _, _, _| Ok(()));

        let mut accrual = MockAccrualSource::new();
        accrual
            .expect_fetch()
            .returning(|_| Ok(AccrualSnapshot::pending()));

        let service = OrderLedgerService::new(store, accrual, DEADLINE);
        let outcome = service.submit_order(user, VALID_NUMBER).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted);
    }

    #[tokio::test]
    async fn test_rate_limit_fails_without_persisting() {
        let mut store = MockLedgerStore::new();
        store.expect_order_exists().returning(|_, _| Ok(false));
        store.expect_order_exists_any().returning(|_| Ok(false));
        // No insert expectation: persisting anything fails the test.

        let mut accrual = MockAccrualSource::new();
        accrual.expect_fetch().returning(|_| {
            Err(AccrualError::RateLimited {
                retry_after_secs: Some(60),
            })
        });

        let service = OrderLedgerService::new(store, accrual, DEADLINE);
        let err = service.submit_order(owner(), VALID_NUMBER).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Accrual(AccrualError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn test_insert_race_surfaces_as_conflict() {
        let mut store = MockLedgerStore::new();
        store.expect_order_exists().returning(|_, _| Ok(false));
        store.expect_order_exists_any().returning(|_| Ok(false));
        store
            .expect_insert_order_and_credit()
            .returning(|_, _, _, _| Err(StoreError::Duplicate));

        let mut accrual = MockAccrualSource::new();
        accrual
            .expect_fetch()
            .returning(|_| Ok(AccrualSnapshot::pending()));

        let service = OrderLedgerService::new(store, accrual, DEADLINE);
        let err = service.submit_order(owner(), VALID_NUMBER).await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_accrual_fails_at_deadline_without_mutation() {
        struct SlowAccrual;

        #[async_trait::async_trait]
        impl AccrualSource for SlowAccrual {
            async fn fetch(&self, _order_number: &str) -> Result<AccrualSnapshot, AccrualError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(AccrualSnapshot::pending())
            }
        }

        let mut store = MockLedgerStore::new();
        store.expect_order_exists().returning(|_, _| Ok(false));
        store.expect_order_exists_any().returning(|_| Ok(false));
        // No insert expectation: the deadline must stop the submission
        // before any mutation.

        let service = OrderLedgerService::new(store, SlowAccrual, Duration::from_secs(1));
        let err = service.submit_order(owner(), VALID_NUMBER).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Accrual(AccrualError::Unreachable(_))
        ));
    }

    #[tokio::test]
    async fn test_withdrawal_insufficient_funds() {
        let user = owner();
        let mut store = MockLedgerStore::new();
        store
            .expect_insert_withdrawal_and_debit()
            .with(eq(user), eq(VALID_NUMBER), eq(dec!(150)), eq(Decimal::ZERO))
            .once()
            .returning(|_, _, _, _| Ok(WithdrawalOutcome::InsufficientFunds));

        let mut accrual = MockAccrualSource::new();
        accrual
            .expect_fetch()
            .returning(|_| Ok(AccrualSnapshot::pending()));

        let service = OrderLedgerService::new(store, accrual, DEADLINE);
        let err = service
            .request_withdrawal(user, VALID_NUMBER, dec!(150))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds));
    }

    #[tokio::test]
    async fn test_withdrawal_applies_fresh_accrual() {
        let user = owner();
        let mut store = MockLedgerStore::new();
        store
            .expect_insert_withdrawal_and_debit()
            .with(eq(user), eq(VALID_NUMBER), eq(dec!(100)), eq(dec!(25.5)))
            .once()
            .returning(|_, _, _, _| Ok(WithdrawalOutcome::Applied));

        let mut accrual = MockAccrualSource::new();
        accrual
            .expect_fetch()
            .returning(|_| Ok(processed_snapshot(dec!(25.5))));

        let service = OrderLedgerService::new(store, accrual, DEADLINE);
        service
            .request_withdrawal(user, VALID_NUMBER, dec!(100))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_withdrawal_against_claimed_number_is_conflict() {
        let mut store = MockLedgerStore::new();
        store
            .expect_insert_withdrawal_and_debit()
            .returning(|_, _, _, _| Err(StoreError::Duplicate));

        let mut accrual = MockAccrualSource::new();
        accrual
            .expect_fetch()
            .returning(|_| Ok(AccrualSnapshot::pending()));

        let service = OrderLedgerService::new(store, accrual, DEADLINE);
        let err = service
            .request_withdrawal(owner(), VALID_NUMBER, dec!(10))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict));
    }

    #[tokio::test]
    async fn test_withdrawal_rejects_bad_number_and_amount() {
        let service =
            OrderLedgerService::new(MockLedgerStore::new(), MockAccrualSource::new(), DEADLINE);

        let err = service
            .request_withdrawal(owner(), "not-a-number", dec!(10))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOrderNumber));

        let err = service
            .request_withdrawal(owner(), VALID_NUMBER, Decimal::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount));
    }

    #[tokio::test]
    async fn test_reads_pass_through() {
        let user = owner();
        let mut store = MockLedgerStore::new();
        store.expect_balance().with(eq(user)).returning(|_| {
            Ok(BalanceSummary {
                current: dec!(500.5),
                withdrawn: dec!(42),
            })
        });
        store.expect_list_orders().returning(|_| Ok(vec![]));
        store.expect_list_withdrawals().returning(|_| Ok(vec![]));

        let service = OrderLedgerService::new(store, MockAccrualSource::new(), DEADLINE);
        let balance = service.balance(user).await.unwrap();
        assert_eq!(balance.current, dec!(500.5));
        assert_eq!(balance.withdrawn, dec!(42));
        assert!(service.list_orders(user).await.unwrap().is_empty());
        assert!(service.list_withdrawals(user).await.unwrap().is_empty());
    }
}
