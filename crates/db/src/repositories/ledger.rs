//! Ledger repository: transactional persistence for orders, balances,
//! and withdrawals.
//!
//! Implements the core `LedgerStore` contract. Every mutating operation
//! runs inside a single database transaction; dropping the transaction
//! on an early error rolls everything back.
//!
//! Orders and withdrawals share one number namespace: both claim their
//! number in the `order_numbers` table inside their transaction, so a
//! number spent in a withdrawal can never be resubmitted as an order
//! and racing claims are settled by that table's primary key.

use std::str::FromStr;

use async_trait::async_trait;
use bonusmart_core::ledger::{
    BalanceSummary, LedgerStore, OrderRecord, OrderStatus, StoreError, WithdrawalOutcome,
    WithdrawalRecord,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr, TransactionTrait,
    sea_query::Expr,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{balances, order_numbers, orders, withdrawals};

/// Ledger repository backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Orders submitted by `owner` under this number.
fn owned_order_query(owner: Uuid, number: &str) -> Select<orders::Entity> {
    orders::Entity::find()
        .filter(orders::Column::UserId.eq(owner))
        .filter(orders::Column::Number.eq(number))
}

/// Withdrawals spent by `owner` against this number.
fn owned_withdrawal_query(owner: Uuid, number: &str) -> Select<withdrawals::Entity> {
    withdrawals::Entity::find()
        .filter(withdrawals::Column::UserId.eq(owner))
        .filter(withdrawals::Column::OrderNumber.eq(number))
}

/// Claims of this number in the shared namespace, from either side of
/// the ledger.
fn claimed_number_query(number: &str) -> Select<order_numbers::Entity> {
    order_numbers::Entity::find().filter(order_numbers::Column::Number.eq(number))
}

fn store_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Duplicate,
        _ => StoreError::Database(err.to_string()),
    }
}

fn order_record(model: orders::Model) -> Result<OrderRecord, StoreError> {
    let status = OrderStatus::from_str(&model.status).map_err(StoreError::Database)?;
    Ok(OrderRecord {
        number: model.number,
        status,
        accrual: model.accrual,
        uploaded_at: model.uploaded_at.to_utc(),
    })
}

#[async_trait]
impl LedgerStore for LedgerRepository {
    async fn order_exists(&self, owner: Uuid, number: &str) -> Result<bool, StoreError> {
        // A number is the owner's whether they submitted it as an order
        // or spent it in a withdrawal.
        let orders = owned_order_query(owner, number)
            .count(&self.db)
            .await
            .map_err(store_err)?;
        if orders > 0 {
            return Ok(true);
        }

        let withdrawals = owned_withdrawal_query(owner, number)
            .count(&self.db)
            .await
            .map_err(store_err)?;

        Ok(withdrawals > 0)
    }

    async fn order_exists_any(&self, number: &str) -> Result<bool, StoreError> {
        let count = claimed_number_query(number)
            .count(&self.db)
            .await
            .map_err(store_err)?;

        Ok(count > 0)
    }

    async fn insert_order_and_credit(
        &self,
        owner: Uuid,
        number: &str,
        status: OrderStatus,
        accrual: Decimal,
    ) -> Result<(), StoreError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        // Claiming the number is the cross-entity arbiter: a racing
        // claim from either side of the ledger fails on this primary
        // key and surfaces as Duplicate.
        let claim = order_numbers::ActiveModel {
            number: Set(number.to_string()),
        };
        claim.insert(&txn).await.map_err(store_err)?;

        // The accrual column carries a value only once the reward is final.
        let stored_accrual = if status == OrderStatus::Processed {
            Some(accrual)
        } else {
            None
        };

        let order = orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(owner),
            number: Set(number.to_string()),
            status: Set(status.as_str().to_string()),
            accrual: Set(stored_accrual),
            uploaded_at: Set(chrono::Utc::now().into()),
        };
        order.insert(&txn).await.map_err(store_err)?;

        let updated = balances::Entity::update_many()
            .col_expr(
                balances::Column::CurrentBalance,
                Expr::col(balances::Column::CurrentBalance).add(Expr::val(accrual)),
            )
            .filter(balances::Column::UserId.eq(owner))
            .exec(&txn)
            .await
            .map_err(store_err)?;

        if updated.rows_affected == 0 {
            return Err(StoreError::Database(format!(
                "balance row missing for user {owner}"
            )));
        }

        txn.commit().await.map_err(store_err)?;

        Ok(())
    }

    async fn balance(&self, owner: Uuid) -> Result<BalanceSummary, StoreError> {
        let current = balances::Entity::find_by_id(owner)
            .one(&self.db)
            .await
            .map_err(store_err)?
            .map_or(Decimal::ZERO, |row| row.current_balance);

        let withdrawn: Option<Option<Decimal>> = withdrawals::Entity::find()
            .select_only()
            .column_as(withdrawals::Column::Sum.sum(), "total")
            .filter(withdrawals::Column::UserId.eq(owner))
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(store_err)?;

        Ok(BalanceSummary {
            current,
            withdrawn: withdrawn.flatten().unwrap_or(Decimal::ZERO),
        })
    }

    async fn insert_withdrawal_and_debit(
        &self,
        owner: Uuid,
        number: &str,
        sum: Decimal,
        fresh_accrual: Decimal,
    ) -> Result<WithdrawalOutcome, StoreError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        // Row lock serializes concurrent withdrawals for the same user.
        let balance = balances::Entity::find_by_id(owner)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(store_err)?
            .ok_or_else(|| StoreError::Database(format!("balance row missing for user {owner}")))?;

        let available = balance.current_balance + fresh_accrual;
        if available < sum {
            debug!(%owner, %sum, %available, "withdrawal rejected, rolling back");
            txn.rollback().await.map_err(store_err)?;
            return Ok(WithdrawalOutcome::InsufficientFunds);
        }

        let claim = order_numbers::ActiveModel {
            number: Set(number.to_string()),
        };
        claim.insert(&txn).await.map_err(store_err)?;

        let withdrawal = withdrawals::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(owner),
            order_number: Set(number.to_string()),
            sum: Set(sum),
            processed_at: Set(chrono::Utc::now().into()),
        };
        withdrawal.insert(&txn).await.map_err(store_err)?;

        let mut updated: balances::ActiveModel = balance.into();
        updated.current_balance = Set(available - sum);
        updated.update(&txn).await.map_err(store_err)?;

        txn.commit().await.map_err(store_err)?;

        Ok(WithdrawalOutcome::Applied)
    }

    async fn list_orders(&self, owner: Uuid) -> Result<Vec<OrderRecord>, StoreError> {
        let rows = orders::Entity::find()
            .filter(orders::Column::UserId.eq(owner))
            .order_by_desc(orders::Column::UploadedAt)
            .all(&self.db)
            .await
            .map_err(store_err)?;

        rows.into_iter().map(order_record).collect()
    }

    async fn list_withdrawals(&self, owner: Uuid) -> Result<Vec<WithdrawalRecord>, StoreError> {
        let rows = withdrawals::Entity::find()
            .filter(withdrawals::Column::UserId.eq(owner))
            .order_by_desc(withdrawals::Column::ProcessedAt)
            .all(&self.db)
            .await
            .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(|row| WithdrawalRecord {
                order: row.order_number,
                sum: row.sum,
                processed_at: row.processed_at.to_utc(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    const NUMBER: &str = "79927398713";

    #[test]
    fn test_ownership_check_covers_both_ledger_sides() {
        let owner = Uuid::new_v4();

        let order_sql = owned_order_query(owner, NUMBER)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(order_sql.contains("\"orders\""));
        assert!(order_sql.contains(NUMBER));

        let withdrawal_sql = owned_withdrawal_query(owner, NUMBER)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(withdrawal_sql.contains("\"withdrawals\""));
        assert!(withdrawal_sql.contains("\"order_number\""));
        assert!(withdrawal_sql.contains(NUMBER));
    }

    #[test]
    fn test_global_existence_reads_the_shared_namespace() {
        let sql = claimed_number_query(NUMBER)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("\"order_numbers\""));
        assert!(sql.contains(NUMBER));
    }
}
